//! Project discovery command implementation for the crowdmap CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use crowdmap_data::{DiscoveryConfig, DiscoveryReport, ProjectSource, write_projects};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::lists::{is_calendar_date, split_list};
use crate::summary::write_projects_summary;
use crate::{
    ARG_CREATED_SINCE, ARG_ENVELOPE, ARG_KEYWORDS, ARG_OUTPUT, ARG_PROJECT_IDS, ARG_SEARCH,
    ARG_STATUSES, ARG_TASKING_MANAGER_URL, ARG_TIMEOUT_SECS, CliError, ENV_ENVELOPE,
};

/// CLI arguments for the `projects` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch project boundaries from the HOT Tasking Manager. \
                 Fixed project ids are always considered; search terms add \
                 their hits. Optional filters restrict the result by status, \
                 creation date, area and keywords.",
    about = "Fetch Tasking Manager project boundaries"
)]
#[ortho_config(prefix = "CROWDMAP")]
pub(crate) struct ProjectsArgs {
    /// Comma-separated project ids always considered.
    #[arg(long = ARG_PROJECT_IDS, value_name = "ids")]
    #[serde(default)]
    pub(crate) project_ids: Option<String>,
    /// Comma-separated free-text searches whose hits are also considered.
    #[arg(long = ARG_SEARCH, value_name = "terms")]
    #[serde(default)]
    pub(crate) search: Option<String>,
    /// Comma-separated accepted project statuses.
    #[arg(long = ARG_STATUSES, value_name = "statuses")]
    #[serde(default)]
    pub(crate) statuses: Option<String>,
    /// Only accept projects created on or after this date (`YYYY-MM-DD`).
    #[arg(long = ARG_CREATED_SINCE, value_name = "date")]
    #[serde(default)]
    pub(crate) created_since: Option<String>,
    /// Only accept projects lying inside `south,west,north,east`.
    #[arg(long = ARG_ENVELOPE, value_name = "s,w,n,e", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) envelope: Option<String>,
    /// Comma-separated keywords; one must occur in the name or description.
    #[arg(long = ARG_KEYWORDS, value_name = "words")]
    #[serde(default)]
    pub(crate) keywords: Option<String>,
    /// Tasking Manager API root.
    #[arg(long = ARG_TASKING_MANAGER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) tasking_manager_url: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Boundary collection to write.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl ProjectsArgs {
    pub(crate) fn into_config(self) -> Result<DiscoveryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        discovery_config(merged)
    }
}

pub(crate) fn discovery_config(args: ProjectsArgs) -> Result<DiscoveryConfig, CliError> {
    let mut config = DiscoveryConfig::default();
    if let Some(ids) = args.project_ids {
        config.project_ids = parse_ids(&ids)?;
    }
    if let Some(terms) = args.search {
        config.search_terms = split_list(&terms);
    }
    if let Some(statuses) = args.statuses {
        config.filter.statuses = split_list(&statuses);
    }
    if let Some(date) = args.created_since {
        if !is_calendar_date(&date) {
            return Err(CliError::InvalidDate {
                field: ARG_CREATED_SINCE,
                value: date,
            });
        }
        config.filter.created_since = Some(date);
    }
    if let Some(envelope) = args.envelope {
        let bbox = envelope
            .parse()
            .map_err(|source| CliError::InvalidBoundingBox {
                field: ARG_ENVELOPE,
                env: ENV_ENVELOPE,
                value: envelope.clone(),
                source,
            })?;
        config.filter.envelope = Some(bbox);
    }
    if let Some(keywords) = args.keywords {
        config.filter.keywords = split_list(&keywords);
    }
    if let Some(url) = args.tasking_manager_url {
        config.endpoint = url;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(path) = args.output {
        config.output_path = path;
    }
    if config.project_ids.is_empty() && config.search_terms.is_empty() {
        return Err(CliError::EmptyList {
            field: ARG_PROJECT_IDS,
        });
    }
    Ok(config)
}

fn parse_ids(value: &str) -> Result<Vec<i64>, CliError> {
    split_list(value)
        .into_iter()
        .map(|entry| {
            entry.parse::<i64>().map_err(|_| CliError::InvalidProjectId {
                field: ARG_PROJECT_IDS,
                value: entry.clone(),
            })
        })
        .collect()
}

/// Builds the project source for the current discovery invocation.
pub(crate) trait ProjectSourceBuilder {
    fn build(&self, config: &DiscoveryConfig) -> Result<Box<dyn ProjectSource>, CliError>;
}

pub(crate) struct HttpProjectSourceBuilder;

impl ProjectSourceBuilder for HttpProjectSourceBuilder {
    fn build(&self, config: &DiscoveryConfig) -> Result<Box<dyn ProjectSource>, CliError> {
        let source = config
            .http_source()
            .map_err(|source| CliError::BuildSource {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        Ok(Box::new(source))
    }
}

pub(crate) fn run_projects(args: ProjectsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_projects_with(&config, &HttpProjectSourceBuilder, writer).map(|_| ())
}

pub(crate) fn run_projects_with(
    config: &DiscoveryConfig,
    builder: &dyn ProjectSourceBuilder,
    writer: &mut dyn Write,
) -> Result<DiscoveryReport, CliError> {
    let source = builder.build(config)?;
    let report = write_projects(config, source.as_ref())?;
    write_projects_summary(writer, &config.output_path, &report).map_err(CliError::WriteSummary)?;
    Ok(report)
}
