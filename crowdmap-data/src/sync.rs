//! Incremental synchronisation of a persisted collection with the remote
//! element source.
//!
//! A run reads the sync state, decides the fetch window, queries the source
//! under the retry policy, normalises and merges the batch, and only then
//! writes the collection, the state record and the statistics document, in
//! that order. A failure before the first write leaves every artefact as it
//! was, so re-running is always safe.

use camino::Utf8PathBuf;
use chrono::{DateTime, SecondsFormat, Utc};
use crowdmap_core::{
    BoundingBox, CollectionMetadata, ContributionAnalysis, FeatureCollection, RetryPolicy,
    SyncState, analyze_contributions, merge,
};
use log::{info, warn};
use thiserror::Error;

use crate::ingest::normalize_elements;
use crate::overpass::{
    ElementSource, FetchError, HttpOverpassSource, HttpOverpassSourceConfig, OverpassQuery,
    SourceBuildError, fetch_with_retry,
};
use crate::store::{Layout, PersistError, StateStore, load_collection, write_collection, write_json};

/// Chicumbane flood response area, `(south, west, north, east)`.
pub const DEFAULT_BBOX: BoundingBox = BoundingBox::new(-25.2, 33.3, -24.7, 33.7);
/// Start of the fetch window for full refreshes.
pub const DEFAULT_EPOCH: &str = "2026-01-21";
/// Tag keys queried by default.
pub const DEFAULT_FILTERS: [&str; 3] = ["building", "highway", "waterway"];
/// Default collection path.
pub const DEFAULT_COLLECTION_PATH: &str = "mozambique_flood_mapping.geojson";
/// Default sync state path.
pub const DEFAULT_STATE_PATH: &str = ".osm_update_state.json";
/// Default statistics path.
pub const DEFAULT_STATS_PATH: &str = "mozambique_mapping_stats.json";
/// Default collection provenance.
pub const DEFAULT_SOURCE: &str = "OpenStreetMap via Overpass API";
/// Default collection description.
pub const DEFAULT_DESCRIPTION: &str =
    "OSM data from Mozambique flood-affected areas with contribution timestamps";

/// Everything a sync run needs, built once at start-up.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Area to query.
    pub bbox: BoundingBox,
    /// Window start (`YYYY-MM-DD`) for full refreshes.
    pub epoch: String,
    /// Tag keys an element must carry.
    pub filters: Vec<String>,
    /// Persisted collection.
    pub collection_path: Utf8PathBuf,
    /// Persisted sync state.
    pub state_path: Utf8PathBuf,
    /// Persisted statistics document.
    pub stats_path: Utf8PathBuf,
    /// Provenance written with every collection; the count and timestamp are
    /// filled in per run.
    pub metadata: CollectionMetadata,
    /// Attempt budget and backoff for remote queries.
    pub retry: RetryPolicy,
    /// Remote endpoint settings.
    pub overpass: HttpOverpassSourceConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bbox: DEFAULT_BBOX,
            epoch: DEFAULT_EPOCH.to_owned(),
            filters: DEFAULT_FILTERS.map(str::to_owned).to_vec(),
            collection_path: Utf8PathBuf::from(DEFAULT_COLLECTION_PATH),
            state_path: Utf8PathBuf::from(DEFAULT_STATE_PATH),
            stats_path: Utf8PathBuf::from(DEFAULT_STATS_PATH),
            metadata: CollectionMetadata::new(DEFAULT_SOURCE, DEFAULT_DESCRIPTION),
            retry: RetryPolicy::default(),
            overpass: HttpOverpassSourceConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Build the HTTP element source described by [`SyncConfig::overpass`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceBuildError`] if the endpoint, client or runtime is
    /// invalid.
    pub fn http_source(&self) -> Result<HttpOverpassSource, SourceBuildError> {
        HttpOverpassSource::with_config(self.overpass.clone())
    }
}

/// Why a run fetched from the epoch instead of the last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullRefreshReason {
    /// The caller asked for it.
    Requested,
    /// No previous successful run is recorded.
    NoState,
    /// State exists but the collection file does not.
    NoCollection,
    /// The collection file exists but could not be read or parsed.
    UnreadableCollection,
}

/// How a run chose its fetch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Fetch since the last recorded update and merge into the collection.
    Incremental,
    /// Fetch since the epoch and replace the collection.
    FullRefresh(FullRefreshReason),
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// Chosen mode.
    pub mode: SyncMode,
    /// Window start date.
    pub since: String,
    /// Elements received from the source.
    pub received: usize,
    /// Elements dropped for lack of geometry.
    pub dropped_no_geometry: usize,
    /// Elements dropped as malformed.
    pub dropped_malformed: usize,
    /// Features that replaced a feature with the same key.
    pub updated: usize,
    /// Features inserted under a new key.
    pub added: usize,
    /// Features in the persisted collection.
    pub feature_count: usize,
    /// Statistics written alongside the collection.
    pub analysis: ContributionAnalysis,
}

/// Failure of a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote query failed; nothing was written.
    #[error("failed to fetch elements since {since}")]
    Fetch {
        /// Window start date.
        since: String,
        /// Retry outcome.
        #[source]
        source: FetchError,
    },
    /// An artefact could not be written.
    #[error("failed to persist sync results")]
    Persist(#[from] PersistError),
}

/// Run one sync against `source`, stamping artefacts with the current time.
///
/// # Errors
///
/// See [`sync_at`].
pub fn sync<S: ElementSource + ?Sized>(
    config: &SyncConfig,
    source: &S,
    full_refresh: bool,
) -> Result<SyncReport, SyncError> {
    sync_at(config, source, full_refresh, Utc::now())
}

/// Run one sync against `source`, stamping artefacts with `now`.
///
/// # Errors
///
/// Returns [`SyncError::Fetch`] when the query fails, in which case no file
/// is touched, and [`SyncError::Persist`] when writing an artefact fails.
pub fn sync_at<S: ElementSource + ?Sized>(
    config: &SyncConfig,
    source: &S,
    full_refresh: bool,
    now: DateTime<Utc>,
) -> Result<SyncReport, SyncError> {
    let state_store = StateStore::new(config.state_path.clone());
    let (mode, since, existing) = decide_window(config, &state_store.load(), full_refresh);
    match mode {
        SyncMode::Incremental => info!("incremental update since {since}"),
        SyncMode::FullRefresh(reason) => info!("full refresh from {since} ({reason:?})"),
    }

    let query = OverpassQuery::new(config.bbox, since.clone(), config.filters.clone());
    info!(
        "querying for data modified since {} in {}",
        query.newer_than(),
        query.bbox
    );
    let elements = fetch_with_retry(&config.retry, |_| source.fetch(&query)).map_err(|err| {
        SyncError::Fetch {
            since: since.clone(),
            source: err,
        }
    })?;
    let received = elements.len();
    info!("received {received} elements");

    let normalized = normalize_elements(elements);
    let timestamp = now.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    let metadata = config.metadata.clone().generated_at(timestamp.clone());
    let outcome = merge(existing, normalized.features, metadata);
    info!(
        "merged: {} updated, {} new features",
        outcome.updated, outcome.added
    );

    let collection = outcome.collection;
    write_collection(&config.collection_path, &collection, Layout::Pretty)?;
    info!("saved collection to {}", config.collection_path);
    state_store.save(&SyncState::new(timestamp, collection.len()))?;
    info!("updated state file {}", state_store.path());
    let analysis = analyze_contributions(&collection);
    write_json(&config.stats_path, &analysis, Layout::Pretty)?;
    info!("saved statistics to {}", config.stats_path);

    Ok(SyncReport {
        mode,
        since,
        received,
        dropped_no_geometry: normalized.dropped_no_geometry,
        dropped_malformed: normalized.dropped_malformed,
        updated: outcome.updated,
        added: outcome.added,
        feature_count: collection.len(),
        analysis,
    })
}

fn decide_window(
    config: &SyncConfig,
    state: &SyncState,
    full_refresh: bool,
) -> (SyncMode, String, Option<FeatureCollection>) {
    let full = |reason| (SyncMode::FullRefresh(reason), config.epoch.clone(), None);
    if full_refresh {
        return full(FullRefreshReason::Requested);
    }
    let Some(since) = state.last_update_date() else {
        return full(FullRefreshReason::NoState);
    };
    match load_collection(&config.collection_path) {
        Ok(Some(collection)) => {
            info!("existing features: {}", collection.len());
            (SyncMode::Incremental, since, Some(collection))
        }
        Ok(None) => full(FullRefreshReason::NoCollection),
        Err(err) => {
            warn!("{err}; falling back to a full refresh");
            full(FullRefreshReason::UnreadableCollection)
        }
    }
}
