//! Cross-run synchronisation state.

use serde::{Deserialize, Serialize};

const DATE_PREFIX_LEN: usize = 10;

/// The only durable record carried between runs.
///
/// Read before deciding the fetch window and written only after a
/// successful merge and persist. A missing or unreadable record is
/// equivalent to [`SyncState::default`], which forces a full refresh.
///
/// # Examples
/// ```
/// use crowdmap_core::SyncState;
///
/// let state = SyncState::new("2026-01-25T14:03:00Z", 120);
/// assert_eq!(state.last_update_date().as_deref(), Some("2026-01-25"));
/// assert_eq!(SyncState::default().last_update_date(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncState {
    /// RFC 3339 UTC timestamp of the last successful run.
    #[serde(default)]
    pub last_update: Option<String>,
    /// Number of features persisted by the last successful run.
    #[serde(default)]
    pub feature_count: usize,
}

impl SyncState {
    /// Record a successful run.
    #[must_use]
    pub fn new(last_update: impl Into<String>, feature_count: usize) -> Self {
        Self {
            last_update: Some(last_update.into()),
            feature_count,
        }
    }

    /// Calendar date of the last update: the first ten characters of
    /// `last_update`, or `None` when no (non-empty) update is recorded.
    #[must_use]
    pub fn last_update_date(&self) -> Option<String> {
        self.last_update
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(|value| value.chars().take(DATE_PREFIX_LEN).collect())
    }
}
