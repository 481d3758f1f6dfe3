//! Adapters and orchestration for crowdmap.
//!
//! Responsibilities:
//! - Model raw Overpass elements and normalise them into keyed features.
//! - Query remote sources over HTTP behind synchronous source traits, with a
//!   bounded retry driver.
//! - Persist collections, sync state and statistics atomically.
//! - Drive incremental sync runs, centroid passes and project discovery.
//!
//! Boundaries:
//! - Domain rules (geometry reduction, merging, statistics) live in
//!   `crowdmap-core`.
//! - No global mutable state; configuration is passed in explicitly.

#![forbid(unsafe_code)]

mod blocking;

pub mod centroids;
pub mod ingest;
pub mod overpass;
pub mod projects;
pub mod store;
pub mod sync;

pub use centroids::{CentroidPassError, CentroidPassReport, write_centroids};
pub use ingest::{NormalizeReport, Rejection, normalize_element, normalize_elements};
pub use overpass::{
    ElementSource, FetchError, HttpOverpassSource, OverpassQuery, RawElement, RawRecord,
    TransportError,
};
pub use projects::{
    DiscoveryConfig, DiscoveryError, DiscoveryReport, ProjectFilter, ProjectSource,
    discover_projects, write_projects,
};
pub use store::{Layout, PersistError, StateStore};
pub use sync::{SyncConfig, SyncError, SyncMode, SyncReport, sync, sync_at};
