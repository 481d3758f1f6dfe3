//! Discovery of mapping project boundaries from the Tasking Manager.
//!
//! Candidates are the configured project ids followed by the hits of each
//! search term, deduplicated in first-seen order. Each candidate's detail is
//! fetched once and checked against a [`ProjectFilter`]; accepted projects
//! become features whose geometry is the project's area of interest.
//! Failures for one project or one search term are logged and skipped.

use std::time::Duration;

use camino::Utf8PathBuf;
use chrono::{SecondsFormat, Utc};
use crowdmap_core::{BoundingBox, CollectionMetadata, Feature, FeatureCollection, Properties};
use indexmap::IndexSet;
use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::overpass::SourceBuildError;
use crate::store::{Layout, PersistError, write_collection};

mod source;
mod types;

#[doc(hidden)]
pub mod test_support;

pub use source::{DEFAULT_TASKING_MANAGER_URL, HttpProjectSource, ProjectSource};
pub use types::{ProjectDetail, ProjectInfo, ProjectSummary, SearchResponse};

/// Flood response projects tracked by default.
pub const DEFAULT_PROJECT_IDS: [i64; 3] = [39738, 18375, 18385];
/// Default boundary collection path.
pub const DEFAULT_PROJECTS_PATH: &str = "hot_projects.geojson";
/// Default collection provenance.
pub const DEFAULT_PROJECTS_SOURCE: &str = "HOT Tasking Manager API";
/// Default collection description.
pub const DEFAULT_PROJECTS_DESCRIPTION: &str = "Mozambique flood response project boundaries";

const DEFAULT_PRIORITY: &str = "MEDIUM";
const PROJECT_PAGE_URL: &str = "https://tasks.hotosm.org/projects";

/// Acceptance predicates applied to fetched project detail.
///
/// Every populated predicate must hold; an empty filter accepts everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectFilter {
    /// Accepted statuses, matched exactly.
    pub statuses: Vec<String>,
    /// ISO date or timestamp prefix; `created` must sort at or after it.
    pub created_since: Option<String>,
    /// The area of interest must lie inside this box, edges included.
    pub envelope: Option<BoundingBox>,
    /// At least one must occur, case-insensitively, in the name or short
    /// description.
    pub keywords: Vec<String>,
}

impl ProjectFilter {
    /// Whether `detail` passes every populated predicate.
    #[must_use]
    pub fn accepts(&self, detail: &ProjectDetail) -> bool {
        self.status_matches(detail)
            && self.created_matches(detail)
            && self.envelope_matches(detail)
            && self.keywords_match(detail)
    }

    fn status_matches(&self, detail: &ProjectDetail) -> bool {
        self.statuses.is_empty() || self.statuses.iter().any(|s| *s == detail.status)
    }

    /// Compares the threshold against the same-length prefix of `created`,
    /// as strings.
    fn created_matches(&self, detail: &ProjectDetail) -> bool {
        let Some(threshold) = self.created_since.as_deref() else {
            return true;
        };
        let prefix: String = detail
            .created
            .chars()
            .take(threshold.chars().count())
            .collect();
        prefix.as_str() >= threshold
    }

    fn envelope_matches(&self, detail: &ProjectDetail) -> bool {
        let Some(envelope) = self.envelope else {
            return true;
        };
        detail
            .area_of_interest
            .as_ref()
            .and_then(crowdmap_core::Geometry::bounds)
            .is_some_and(|bounds| envelope.contains_rect(&bounds))
    }

    fn keywords_match(&self, detail: &ProjectDetail) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let name = detail.project_info.name.to_lowercase();
        let description = detail.short_description().to_lowercase();
        self.keywords.iter().any(|keyword| {
            let needle = keyword.to_lowercase();
            name.contains(&needle) || description.contains(&needle)
        })
    }
}

/// Settings for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// API root.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Projects always considered.
    pub project_ids: Vec<i64>,
    /// Free-text searches whose hits are also considered.
    pub search_terms: Vec<String>,
    /// Acceptance predicates.
    pub filter: ProjectFilter,
    /// Boundary collection path.
    pub output_path: Utf8PathBuf,
    /// Provenance written with the collection.
    pub metadata: CollectionMetadata,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TASKING_MANAGER_URL.to_owned(),
            timeout: Duration::from_secs(30),
            project_ids: DEFAULT_PROJECT_IDS.to_vec(),
            search_terms: Vec::new(),
            filter: ProjectFilter::default(),
            output_path: Utf8PathBuf::from(DEFAULT_PROJECTS_PATH),
            metadata: CollectionMetadata::new(
                DEFAULT_PROJECTS_SOURCE,
                DEFAULT_PROJECTS_DESCRIPTION,
            ),
        }
    }
}

impl DiscoveryConfig {
    /// Build the HTTP project source described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceBuildError`] if the endpoint, client or runtime is
    /// invalid.
    pub fn http_source(&self) -> Result<HttpProjectSource, SourceBuildError> {
        HttpProjectSource::with_timeout(self.endpoint.clone(), self.timeout)
    }
}

/// Outcome of [`discover_projects`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryReport {
    /// Accepted project boundaries.
    pub collection: FeatureCollection,
    /// Distinct candidate ids considered.
    pub candidates: usize,
    /// Candidates rejected by the filter.
    pub rejected: usize,
    /// Candidates whose detail could not be fetched.
    pub failed: usize,
}

/// Failure of a discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The boundary collection could not be written.
    #[error("failed to persist project boundaries")]
    Persist(#[from] PersistError),
}

/// Collect accepted project boundaries from `source`.
///
/// # Examples
/// ```
/// use crowdmap_data::projects::test_support::{StubProjectSource, sample_project};
/// use crowdmap_data::projects::{DiscoveryConfig, discover_projects};
///
/// let source = StubProjectSource::new().with_project(sample_project(39738, "Chicumbane", 33.4, -25.1));
/// let config = DiscoveryConfig { project_ids: vec![39738], ..DiscoveryConfig::default() };
/// let report = discover_projects(&config, &source);
/// assert_eq!(report.collection.len(), 1);
/// ```
#[must_use]
pub fn discover_projects<S: ProjectSource + ?Sized>(
    config: &DiscoveryConfig,
    source: &S,
) -> DiscoveryReport {
    let mut candidates: IndexSet<i64> = config.project_ids.iter().copied().collect();
    for term in &config.search_terms {
        match source.search(term) {
            Ok(hits) => {
                info!("search '{term}' returned {} projects", hits.len());
                candidates.extend(hits.into_iter().map(|hit| hit.project_id));
            }
            Err(err) => warn!("search '{term}' failed: {err}"),
        }
    }

    let mut features = Vec::new();
    let mut rejected = 0;
    let mut failed = 0;
    for &id in &candidates {
        info!("fetching project {id}");
        match source.project(id) {
            Ok(detail) if config.filter.accepts(&detail) => {
                info!(
                    "  {}: {} mapped",
                    detail.project_info.name, detail.percent_mapped
                );
                features.push(project_feature(detail));
            }
            Ok(detail) => {
                info!("  {} rejected by filter", detail.project_info.name);
                rejected += 1;
            }
            Err(err) => {
                warn!("error fetching project {id}: {err}");
                failed += 1;
            }
        }
    }

    DiscoveryReport {
        collection: FeatureCollection::new(features, config.metadata.clone()),
        candidates: candidates.len(),
        rejected,
        failed,
    }
}

/// Discover projects and write the boundary collection to
/// [`DiscoveryConfig::output_path`].
///
/// # Errors
///
/// Returns [`DiscoveryError::Persist`] if the collection cannot be written.
pub fn write_projects<S: ProjectSource + ?Sized>(
    config: &DiscoveryConfig,
    source: &S,
) -> Result<DiscoveryReport, DiscoveryError> {
    let mut report = discover_projects(config, source);
    report.collection.metadata = report
        .collection
        .metadata
        .clone()
        .generated_at(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true));
    write_collection(&config.output_path, &report.collection, Layout::Pretty)?;
    info!(
        "saved {} project boundaries to {}",
        report.collection.len(),
        config.output_path
    );
    Ok(report)
}

fn project_feature(detail: ProjectDetail) -> Feature {
    let id = detail.project_id;
    let description = detail.short_description().to_owned();
    let mut properties = Properties::new();
    properties.insert("projectId".to_owned(), Value::from(id));
    properties.insert("name".to_owned(), Value::from(detail.project_info.name));
    properties.insert("status".to_owned(), Value::from(detail.status));
    properties.insert(
        "priority".to_owned(),
        Value::from(
            detail
                .project_priority
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_owned()),
        ),
    );
    properties.insert("created".to_owned(), Value::from(detail.created));
    properties.insert("percentMapped".to_owned(), detail.percent_mapped);
    properties.insert("percentValidated".to_owned(), detail.percent_validated);
    properties.insert(
        "totalContributors".to_owned(),
        Value::from(detail.total_contributors.unwrap_or(0)),
    );
    properties.insert("description".to_owned(), Value::from(description));
    properties.insert(
        "url".to_owned(),
        Value::from(format!("{PROJECT_PAGE_URL}/{id}")),
    );
    Feature::new(properties, detail.area_of_interest)
}

#[cfg(test)]
mod tests;
