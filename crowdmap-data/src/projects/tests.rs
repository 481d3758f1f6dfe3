//! Unit tests for project discovery.

use super::test_support::{StubProjectSource, sample_project};
use super::*;
use crate::overpass::TransportError;
use rstest::{fixture, rstest};
use serde_json::json;

fn config(ids: &[i64], filter: ProjectFilter) -> DiscoveryConfig {
    DiscoveryConfig {
        project_ids: ids.to_vec(),
        filter,
        ..DiscoveryConfig::default()
    }
}

#[fixture]
fn catalogue() -> StubProjectSource {
    StubProjectSource::new()
        .with_project(sample_project(39738, "Mozambique Floods, Chicumbane", 33.4, -25.1))
        .with_project(sample_project(18375, "Mapping for Mozambique: Buzi 1", 34.0, -20.0))
        .with_project(sample_project(18385, "Mapping for Mozambique: Buzi 7", 34.2, -20.1))
}

#[rstest]
fn emits_boundary_features_with_defaults(catalogue: StubProjectSource) {
    let mut bare = sample_project(7, "Bare project", 33.0, -25.0);
    bare.project_priority = None;
    bare.total_contributors = None;
    bare.project_info.short_description = None;
    let source = catalogue.with_project(bare);

    let report = discover_projects(&config(&[7], ProjectFilter::default()), &source);
    let feature = report.collection.features.first().expect("one feature");
    assert_eq!(
        Value::Object(feature.properties.clone()),
        json!({
            "projectId": 7,
            "name": "Bare project",
            "status": "PUBLISHED",
            "priority": "MEDIUM",
            "created": "2026-01-21T10:00:00.000000Z",
            "percentMapped": 50,
            "percentValidated": 10,
            "totalContributors": 0,
            "description": "",
            "url": "https://tasks.hotosm.org/projects/7"
        })
    );
    assert!(feature.geometry.is_some());
    assert_eq!(report.collection.metadata.source, DEFAULT_PROJECTS_SOURCE);
}

#[rstest]
fn failed_projects_are_skipped(catalogue: StubProjectSource) {
    let source = catalogue.with_failure(
        18375,
        TransportError::Http {
            url: "stub".to_owned(),
            status: 500,
            message: "boom".to_owned(),
        },
    );
    let report = discover_projects(&config(&DEFAULT_PROJECT_IDS, ProjectFilter::default()), &source);
    assert_eq!(report.collection.len(), 2);
    assert_eq!(report.failed, 1);
    assert_eq!(source.requested(), DEFAULT_PROJECT_IDS.to_vec());
}

#[rstest]
fn search_hits_are_deduplicated_after_fixed_ids(catalogue: StubProjectSource) {
    let source = catalogue.with_hits("Mozambique flood", &[18385, 39738, 18375]);
    let discovery = DiscoveryConfig {
        search_terms: vec!["Mozambique flood".to_owned(), "unknown".to_owned()],
        ..config(&[39738], ProjectFilter::default())
    };
    let report = discover_projects(&discovery, &source);
    assert_eq!(report.candidates, 3);
    assert_eq!(source.requested(), vec![39738, 18385, 18375]);
}

#[rstest]
#[case(ProjectFilter::default(), 3)]
#[case(ProjectFilter { statuses: vec!["ARCHIVED".to_owned()], ..ProjectFilter::default() }, 0)]
#[case(ProjectFilter { statuses: vec!["PUBLISHED".to_owned()], ..ProjectFilter::default() }, 3)]
#[case(ProjectFilter { created_since: Some("2026-01-21".to_owned()), ..ProjectFilter::default() }, 3)]
#[case(ProjectFilter { created_since: Some("2026-01-22".to_owned()), ..ProjectFilter::default() }, 0)]
#[case(ProjectFilter { keywords: vec!["CHICUMBANE".to_owned()], ..ProjectFilter::default() }, 1)]
#[case(ProjectFilter { keywords: vec!["flood response".to_owned()], ..ProjectFilter::default() }, 3)]
#[case(
    ProjectFilter { envelope: Some(BoundingBox::new(-25.2, 33.3, -24.0, 34.4)), ..ProjectFilter::default() },
    1
)]
#[case(
    ProjectFilter { envelope: Some(BoundingBox::new(-26.0, 32.0, -19.0, 36.0)), ..ProjectFilter::default() },
    3
)]
fn filters_are_conjunctive_and_empty_accepts(
    catalogue: StubProjectSource,
    #[case] filter: ProjectFilter,
    #[case] accepted: usize,
) {
    let report = discover_projects(&config(&DEFAULT_PROJECT_IDS, filter), &catalogue);
    assert_eq!(report.collection.len(), accepted);
    assert_eq!(report.rejected, 3 - accepted);
}

#[rstest]
fn envelope_bounds_are_inclusive() {
    let detail = sample_project(1, "Edge", 33.0, -25.0);
    let filter = ProjectFilter {
        envelope: Some(BoundingBox::new(-25.0, 33.0, -24.0, 34.0)),
        ..ProjectFilter::default()
    };
    assert!(filter.accepts(&detail));
}

#[rstest]
fn projects_without_boundary_fail_the_envelope_check() {
    let mut detail = sample_project(1, "No boundary", 33.0, -25.0);
    detail.area_of_interest = None;
    let filter = ProjectFilter {
        envelope: Some(BoundingBox::new(-90.0, -180.0, 90.0, 180.0)),
        ..ProjectFilter::default()
    };
    assert!(!filter.accepts(&detail));
}
