//! Facade crate for crowdmap.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the sync, centroid and project discovery adapters.

#![forbid(unsafe_code)]

pub use crowdmap_core::{
    BoundingBox, CollectionMetadata, ContributionAnalysis, ContributionStats, ElementKind,
    Feature, FeatureCollection, Geometry, IdentityKey, MergeOutcome, Position, RetryPolicy,
    SyncState, analyze_contributions, compute_centroids, has_building, merge,
};

#[cfg(feature = "http")]
pub use crowdmap_data::{
    DiscoveryConfig, ElementSource, HttpOverpassSource, ProjectFilter, ProjectSource, SyncConfig,
    SyncError, SyncReport, discover_projects, sync, write_centroids, write_projects,
};
