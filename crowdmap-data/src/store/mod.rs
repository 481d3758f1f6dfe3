//! Persistence of collections, sync state and statistics documents.
//!
//! Every document is replaced atomically through `crowdmap-fs`; a failed
//! write leaves the previous file untouched.

use camino::{Utf8Path, Utf8PathBuf};
use crowdmap_core::{FeatureCollection, SyncState};
use log::warn;
use serde::Serialize;
use thiserror::Error;

/// Failure to read or write a persisted document.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The file exists but could not be read.
    #[error("failed to read {path}")]
    Read {
        /// Offending path.
        path: Utf8PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file was read but is not the expected document.
    #[error("failed to parse {path}")]
    Parse {
        /// Offending path.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The document could not be encoded.
    #[error("failed to encode document for {path}")]
    Encode {
        /// Target path.
        path: Utf8PathBuf,
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The file could not be written.
    #[error("failed to write {path}")]
    Write {
        /// Target path.
        path: Utf8PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Whitespace layout of a written JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Two-space indentation, for documents people inspect.
    Pretty,
    /// No insignificant whitespace, for documents clients download.
    Compact,
}

/// Serialise `value` and replace the file at `path`, returning the bytes
/// written.
///
/// # Errors
///
/// Returns [`PersistError::Encode`] or [`PersistError::Write`].
pub fn write_json<T: Serialize + ?Sized>(
    path: &Utf8Path,
    value: &T,
    layout: Layout,
) -> Result<u64, PersistError> {
    let bytes = match layout {
        Layout::Pretty => serde_json::to_vec_pretty(value),
        Layout::Compact => serde_json::to_vec(value),
    }
    .map_err(|source| PersistError::Encode {
        path: path.to_owned(),
        source,
    })?;
    crowdmap_fs::write_atomic(path, &bytes).map_err(|source| PersistError::Write {
        path: path.to_owned(),
        source,
    })?;
    Ok(u64::try_from(bytes.len()).unwrap_or(u64::MAX))
}

/// Load a feature collection, or `None` if the file does not exist.
///
/// # Errors
///
/// Returns [`PersistError::Read`] or [`PersistError::Parse`] when the file
/// exists but is unusable.
pub fn load_collection(path: &Utf8Path) -> Result<Option<FeatureCollection>, PersistError> {
    let Some(text) = crowdmap_fs::read_optional(path).map_err(|source| PersistError::Read {
        path: path.to_owned(),
        source,
    })?
    else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| PersistError::Parse {
            path: path.to_owned(),
            source,
        })
}

/// Write a feature collection, returning the bytes written.
///
/// # Errors
///
/// See [`write_json`].
pub fn write_collection(
    path: &Utf8Path,
    collection: &FeatureCollection,
    layout: Layout,
) -> Result<u64, PersistError> {
    write_json(path, collection, layout)
}

/// The sync state record on disk.
///
/// # Examples
/// ```
/// # use camino::Utf8PathBuf;
/// use crowdmap_core::SyncState;
/// use crowdmap_data::store::StateStore;
///
/// # let tmp = tempfile::tempdir().expect("tempdir");
/// # let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
/// let store = StateStore::new(root.join(".osm_update_state.json"));
/// assert_eq!(store.load(), SyncState::default());
/// store.save(&SyncState::new("2026-01-25T14:03:00Z", 3)).expect("save");
/// assert_eq!(store.load().feature_count, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    path: Utf8PathBuf,
}

impl StateStore {
    /// A store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load the record, falling back to [`SyncState::default`] when it is
    /// missing, unreadable or unparsable.
    #[must_use]
    pub fn load(&self) -> SyncState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => SyncState::default(),
            Err(err) => {
                warn!("{err}; treating sync state as absent");
                SyncState::default()
            }
        }
    }

    /// Load the record, surfacing read and parse failures.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Read`] or [`PersistError::Parse`].
    pub fn try_load(&self) -> Result<Option<SyncState>, PersistError> {
        let Some(text) =
            crowdmap_fs::read_optional(&self.path).map_err(|source| PersistError::Read {
                path: self.path.clone(),
                source,
            })?
        else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replace the record.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Encode`] or [`PersistError::Write`].
    pub fn save(&self, state: &SyncState) -> Result<(), PersistError> {
        write_json(&self.path, state, Layout::Pretty).map(|_| ())
    }
}
