//! Command-line interface for crowdmap's flood mapping tooling.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod centroids;
mod error;
mod lists;
mod projects;
mod summary;
mod sync;

pub use error::CliError;

use centroids::CentroidsArgs;
use projects::ProjectsArgs;
use sync::SyncArgs;

const ARG_BBOX: &str = "bbox";
const ARG_EPOCH: &str = "epoch";
const ARG_FILTERS: &str = "filters";
const ARG_COLLECTION: &str = "collection";
const ARG_STATE: &str = "state";
const ARG_STATS: &str = "stats";
const ARG_OVERPASS_URL: &str = "overpass-url";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_RETRIES: &str = "retries";
const ARG_PROJECT_IDS: &str = "project-ids";
const ARG_SEARCH: &str = "search";
const ARG_STATUSES: &str = "statuses";
const ARG_CREATED_SINCE: &str = "created-since";
const ARG_ENVELOPE: &str = "envelope";
const ARG_KEYWORDS: &str = "keywords";
const ARG_TASKING_MANAGER_URL: &str = "tasking-manager-url";
const ARG_OUTPUT: &str = "output";
const ENV_BBOX: &str = "CROWDMAP_CMDS_SYNC_BBOX";
const ENV_ENVELOPE: &str = "CROWDMAP_CMDS_PROJECTS_ENVELOPE";

/// Run the crowdmap CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Sync(args) => sync::run_sync(args, &mut stdout),
        Command::Centroids(args) => centroids::run_centroids(args, &mut stdout),
        Command::Projects(args) => projects::run_projects(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "crowdmap",
    about = "Track crowdsourced OpenStreetMap mapping of flood-affected areas",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch new and changed features and merge them into the collection.
    Sync(SyncArgs),
    /// Reduce building footprints to centroid points.
    Centroids(CentroidsArgs),
    /// Fetch Tasking Manager project boundaries.
    Projects(ProjectsArgs),
}

#[cfg(test)]
mod tests;
