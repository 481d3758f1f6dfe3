//! Core domain types for crowdmap.
//!
//! Responsibilities:
//! - Model GeoJSON features, their identity keys and collections.
//! - Reduce geometries to representative points.
//! - Merge fetched batches into persisted collections by identity key.
//! - Aggregate contribution statistics and centroid collections.
//!
//! Boundaries:
//! - No I/O. Transport, persistence and configuration live in
//!   `crowdmap-data` and `crowdmap-cli`.

#![forbid(unsafe_code)]

pub mod area;
pub mod centroid;
pub mod feature;
pub mod geometry;
pub mod merge;
pub mod retry;
pub mod state;
pub mod stats;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use area::{BoundingBox, ParseBoundingBoxError};
pub use centroid::{
    BUILDING_PROPERTY, CentroidFeature, CentroidReport, SizeReduction, compute_centroids,
    has_building,
};
pub use feature::{
    CollectionMetadata, ElementKind, Feature, FeatureCollection, ID_PROPERTY, IdentityKey,
    KIND_PROPERTY, Properties,
};
pub use geometry::{Geometry, Position, representative_point};
pub use merge::{MergeOutcome, merge};
pub use retry::{RetryClass, RetryPolicy};
pub use state::SyncState;
pub use stats::{
    ContributionAnalysis, ContributionStats, DateRange, TOP_CONTRIBUTOR_LIMIT,
    UNKNOWN_CONTRIBUTOR, analyze_contributions,
};
