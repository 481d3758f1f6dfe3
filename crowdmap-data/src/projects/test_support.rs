//! Test utilities for project sources.

use std::cell::RefCell;
use std::collections::HashMap;

use super::source::ProjectSource;
use super::types::{ProjectDetail, ProjectInfo, ProjectSummary};
use crate::overpass::TransportError;
use crowdmap_core::{Geometry, Position};
use serde_json::Value;

/// In-memory [`ProjectSource`] for tests.
///
/// Unknown search terms return no hits; unknown project ids fail with an
/// HTTP 404 transport error.
#[derive(Debug, Default)]
pub struct StubProjectSource {
    hits: HashMap<String, Vec<ProjectSummary>>,
    details: HashMap<i64, Result<ProjectDetail, TransportError>>,
    requested: RefCell<Vec<i64>>,
}

impl StubProjectSource {
    /// An empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `detail`, keyed by its project id.
    #[must_use]
    pub fn with_project(mut self, detail: ProjectDetail) -> Self {
        self.details.insert(detail.project_id, Ok(detail));
        self
    }

    /// Make detail lookups for `id` fail with `error`.
    #[must_use]
    pub fn with_failure(mut self, id: i64, error: TransportError) -> Self {
        self.details.insert(id, Err(error));
        self
    }

    /// Register search hits for `term`.
    #[must_use]
    pub fn with_hits(mut self, term: &str, ids: &[i64]) -> Self {
        let hits = ids
            .iter()
            .map(|&project_id| ProjectSummary {
                project_id,
                status: None,
            })
            .collect();
        self.hits.insert(term.to_owned(), hits);
        self
    }

    /// Project ids requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<i64> {
        self.requested.borrow().clone()
    }
}

impl ProjectSource for StubProjectSource {
    fn search(&self, term: &str) -> Result<Vec<ProjectSummary>, TransportError> {
        Ok(self.hits.get(term).cloned().unwrap_or_default())
    }

    fn project(&self, id: i64) -> Result<ProjectDetail, TransportError> {
        self.requested.borrow_mut().push(id);
        self.details.get(&id).cloned().unwrap_or_else(|| {
            Err(TransportError::Http {
                url: format!("stub://projects/{id}/"),
                status: 404,
                message: "not found".to_owned(),
            })
        })
    }
}

/// A published project whose boundary is the square `[x0, x0+1] × [y0, y0+1]`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "fixture boundaries are offsets from an origin"
)]
pub fn sample_project(id: i64, name: &str, x0: f64, y0: f64) -> ProjectDetail {
    let x1 = x0 + 1.0;
    let y1 = y0 + 1.0;
    ProjectDetail {
        project_id: id,
        project_info: ProjectInfo {
            name: name.to_owned(),
            short_description: Some(format!("{name} flood response mapping")),
        },
        status: "PUBLISHED".to_owned(),
        project_priority: Some("HIGH".to_owned()),
        created: "2026-01-21T10:00:00.000000Z".to_owned(),
        percent_mapped: Value::from(50),
        percent_validated: Value::from(10),
        total_contributors: Some(7),
        area_of_interest: Some(Geometry::MultiPolygon {
            coordinates: vec![vec![vec![
                Position::new(x0, y0),
                Position::new(x1, y0),
                Position::new(x1, y1),
                Position::new(x0, y1),
                Position::new(x0, y0),
            ]]],
        }),
    }
}
