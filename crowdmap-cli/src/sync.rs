//! Sync command implementation for the crowdmap CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use crowdmap_core::{BoundingBox, RetryPolicy};
use crowdmap_data::{ElementSource, SyncConfig, SyncReport};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::lists::{is_calendar_date, split_list};
use crate::summary::write_sync_summary;
use crate::{
    ARG_BBOX, ARG_COLLECTION, ARG_EPOCH, ARG_FILTERS, ARG_OVERPASS_URL, ARG_RETRIES, ARG_STATE,
    ARG_STATS, ARG_TIMEOUT_SECS, CliError, ENV_BBOX,
};

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Query the Overpass API for features changed since the last \
                 successful run and merge them into the persisted collection. \
                 The first run, or a run with --full, fetches everything since \
                 the epoch date instead.",
    about = "Fetch and merge changed features"
)]
#[ortho_config(prefix = "CROWDMAP")]
pub(crate) struct SyncArgs {
    /// Ignore the recorded state and fetch everything since the epoch.
    #[arg(long)]
    #[serde(default)]
    pub(crate) full: bool,
    /// Area to query as `south,west,north,east`.
    #[arg(long = ARG_BBOX, value_name = "s,w,n,e", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    /// Window start for full refreshes (`YYYY-MM-DD`).
    #[arg(long = ARG_EPOCH, value_name = "date")]
    #[serde(default)]
    pub(crate) epoch: Option<String>,
    /// Comma-separated tag keys to query.
    #[arg(long = ARG_FILTERS, value_name = "keys")]
    #[serde(default)]
    pub(crate) filters: Option<String>,
    /// Path of the persisted collection.
    #[arg(long = ARG_COLLECTION, value_name = "path")]
    #[serde(default)]
    pub(crate) collection: Option<Utf8PathBuf>,
    /// Path of the sync state record.
    #[arg(long = ARG_STATE, value_name = "path")]
    #[serde(default)]
    pub(crate) state: Option<Utf8PathBuf>,
    /// Path of the statistics document.
    #[arg(long = ARG_STATS, value_name = "path")]
    #[serde(default)]
    pub(crate) stats: Option<Utf8PathBuf>,
    /// Overpass interpreter endpoint.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// Whole-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Maximum number of attempts per query.
    #[arg(long = ARG_RETRIES, value_name = "count")]
    #[serde(default)]
    pub(crate) retries: Option<u32>,
}

impl SyncArgs {
    pub(crate) fn into_settings(self) -> Result<SyncSettings, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SyncSettings::try_from(merged)
    }
}

/// Resolved `sync` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct SyncSettings {
    pub(crate) config: SyncConfig,
    pub(crate) full_refresh: bool,
}

impl TryFrom<SyncArgs> for SyncSettings {
    type Error = CliError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let mut config = SyncConfig::default();
        if let Some(bbox) = args.bbox {
            config.bbox = parse_bbox(&bbox)?;
        }
        if let Some(epoch) = args.epoch {
            if !is_calendar_date(&epoch) {
                return Err(CliError::InvalidDate {
                    field: ARG_EPOCH,
                    value: epoch,
                });
            }
            config.epoch = epoch;
        }
        if let Some(filters) = args.filters {
            let keys = split_list(&filters);
            if keys.is_empty() {
                return Err(CliError::EmptyList { field: ARG_FILTERS });
            }
            config.filters = keys;
        }
        if let Some(path) = args.collection {
            config.collection_path = path;
        }
        if let Some(path) = args.state {
            config.state_path = path;
        }
        if let Some(path) = args.stats {
            config.stats_path = path;
        }
        if let Some(url) = args.overpass_url {
            config.overpass.endpoint = url;
        }
        if let Some(secs) = args.timeout_secs {
            config.overpass.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = args.retries {
            config.retry = RetryPolicy {
                max_attempts: attempts,
                ..config.retry
            };
        }
        Ok(Self {
            config,
            full_refresh: args.full,
        })
    }
}

fn parse_bbox(value: &str) -> Result<BoundingBox, CliError> {
    value
        .parse()
        .map_err(|source| CliError::InvalidBoundingBox {
            field: ARG_BBOX,
            env: ENV_BBOX,
            value: value.to_owned(),
            source,
        })
}

/// Builds the element source for the current sync invocation.
pub(crate) trait SyncSourceBuilder {
    fn build(&self, config: &SyncConfig) -> Result<Box<dyn ElementSource>, CliError>;
}

pub(crate) struct HttpSyncSourceBuilder;

impl SyncSourceBuilder for HttpSyncSourceBuilder {
    fn build(&self, config: &SyncConfig) -> Result<Box<dyn ElementSource>, CliError> {
        let source = config
            .http_source()
            .map_err(|source| CliError::BuildSource {
                endpoint: config.overpass.endpoint.clone(),
                source,
            })?;
        Ok(Box::new(source))
    }
}

pub(crate) fn run_sync(args: SyncArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let settings = args.into_settings()?;
    run_sync_with(&settings, &HttpSyncSourceBuilder, writer).map(|_| ())
}

pub(crate) fn run_sync_with(
    settings: &SyncSettings,
    builder: &dyn SyncSourceBuilder,
    writer: &mut dyn Write,
) -> Result<SyncReport, CliError> {
    let source = builder.build(&settings.config)?;
    let report = crowdmap_data::sync(&settings.config, source.as_ref(), settings.full_refresh)?;
    write_sync_summary(writer, &settings.config, &report).map_err(CliError::WriteSummary)?;
    Ok(report)
}

#[cfg(test)]
pub(crate) fn settings_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SyncSettings, CliError> {
    let merged = SyncArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SyncSettings::try_from(merged)
}
