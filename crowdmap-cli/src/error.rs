//! Error types emitted by the crowdmap CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use crowdmap_core::ParseBoundingBoxError;
use crowdmap_data::overpass::SourceBuildError;
use crowdmap_data::{CentroidPassError, DiscoveryError, SyncError};
use thiserror::Error;

/// Errors emitted by the crowdmap CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// The bounding box option could not be parsed.
    #[error("invalid --{field} {value:?} (set --{field} or {env}): {source}")]
    InvalidBoundingBox {
        field: &'static str,
        env: &'static str,
        value: String,
        #[source]
        source: ParseBoundingBoxError,
    },
    /// A date option was not a `YYYY-MM-DD` calendar date.
    #[error("invalid --{field} {value:?}: expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    /// A list option resolved to no usable entries.
    #[error("--{field} must name at least one value")]
    EmptyList { field: &'static str },
    /// An id list contained something other than an integer.
    #[error("invalid --{field} entry {value:?}")]
    InvalidProjectId { field: &'static str, value: String },
    /// Constructing an HTTP source failed.
    #[error("failed to build HTTP client for {endpoint:?}: {source}")]
    BuildSource {
        endpoint: String,
        #[source]
        source: SourceBuildError,
    },
    /// The sync run failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// The centroid pass failed.
    #[error(transparent)]
    Centroids(#[from] CentroidPassError),
    /// Project discovery failed.
    #[error(transparent)]
    Projects(#[from] DiscoveryError),
    /// Writing the command summary failed.
    #[error("failed to write summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
