//! Shared test harness modules for the crowdmap CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod fixtures;
mod summary_unit;
mod sync_steps;
