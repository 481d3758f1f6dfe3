//! Centroid command implementation for the crowdmap CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use crowdmap_core::has_building;
use crowdmap_data::centroids::DEFAULT_CENTROIDS_PATH;
use crowdmap_data::sync::DEFAULT_COLLECTION_PATH;
use crowdmap_data::{CentroidPassReport, write_centroids};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::CliError;
use crate::summary::write_centroid_summary;

/// CLI arguments for the `centroids` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Reduce every building in a persisted collection to a single \
                 representative point and write the result as compact GeoJSON \
                 for low-zoom rendering.",
    about = "Compute building centroids"
)]
#[ortho_config(prefix = "CROWDMAP")]
pub(crate) struct CentroidsArgs {
    /// Collection to read.
    #[arg(value_name = "input")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Centroid collection to write.
    #[arg(value_name = "output")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

/// Resolved `centroids` command paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentroidsConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
}

impl From<CentroidsArgs> for CentroidsConfig {
    fn from(args: CentroidsArgs) -> Self {
        Self {
            input: args
                .input
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_COLLECTION_PATH)),
            output: args
                .output
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CENTROIDS_PATH)),
        }
    }
}

pub(crate) fn run_centroids(args: CentroidsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    run_centroids_with(&CentroidsConfig::from(merged), writer).map(|_| ())
}

pub(crate) fn run_centroids_with(
    config: &CentroidsConfig,
    writer: &mut dyn Write,
) -> Result<CentroidPassReport, CliError> {
    let report = write_centroids(&config.input, &config.output, has_building)?;
    write_centroid_summary(writer, &config.output, &report).map_err(CliError::WriteSummary)?;
    Ok(report)
}
