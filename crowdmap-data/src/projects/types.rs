//! Tasking Manager response documents.

use crowdmap_core::Geometry;
use serde::Deserialize;
use serde_json::Value;

/// One hit of a project search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Project identifier.
    pub project_id: i64,
    /// Lifecycle status, when reported.
    #[serde(default)]
    pub status: Option<String>,
}

/// Paged search response; only the current page is used.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SearchResponse {
    /// Hits on this page.
    #[serde(default)]
    pub results: Vec<ProjectSummary>,
}

/// Localised project text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// One-paragraph summary.
    #[serde(default)]
    pub short_description: Option<String>,
}

/// Full project detail.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    /// Project identifier.
    pub project_id: i64,
    /// Localised text.
    #[serde(default)]
    pub project_info: ProjectInfo,
    /// Lifecycle status, e.g. `PUBLISHED`.
    #[serde(default)]
    pub status: String,
    /// Priority, e.g. `URGENT`.
    #[serde(default)]
    pub project_priority: Option<String>,
    /// ISO 8601 creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Mapped percentage as reported.
    #[serde(default)]
    pub percent_mapped: Value,
    /// Validated percentage as reported.
    #[serde(default)]
    pub percent_validated: Value,
    /// Contributor count, when reported.
    #[serde(default)]
    pub total_contributors: Option<i64>,
    /// Project boundary.
    #[serde(default)]
    pub area_of_interest: Option<Geometry>,
}

impl ProjectDetail {
    /// Short description, or an empty string.
    #[must_use]
    pub fn short_description(&self) -> &str {
        self.project_info.short_description.as_deref().unwrap_or("")
    }
}
