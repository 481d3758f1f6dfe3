//! Test helpers for CLI workspaces and scripted remote sources.

use super::*;
use crate::projects::ProjectSourceBuilder;
use crate::sync::{SyncSettings, SyncSourceBuilder};
use camino::Utf8PathBuf;
use crowdmap_core::RetryPolicy;
use crowdmap_data::overpass::test_support::StubElementSource;
use crowdmap_data::overpass::{OverpassQuery, RawElement, RawKind, RawRecord, TransportError};
use crowdmap_data::projects::test_support::StubProjectSource;
use crowdmap_data::{DiscoveryConfig, ElementSource, ProjectSource, SyncConfig};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

/// Temporary directory holding every artefact a command writes.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Sync settings writing into this workspace, retrying without delay.
    pub(super) fn sync_settings(&self, full_refresh: bool) -> SyncSettings {
        SyncSettings {
            config: SyncConfig {
                collection_path: self.path("mapping.geojson"),
                state_path: self.path("state.json"),
                stats_path: self.path("stats.json"),
                retry: RetryPolicy::immediate(3),
                ..SyncConfig::default()
            },
            full_refresh,
        }
    }

    pub(super) fn read(&self, name: &str) -> Option<String> {
        crowdmap_fs::read_optional(&self.path(name)).expect("read workspace file")
    }
}

/// A tagged node edited by `user` on `day`.
pub(super) fn edited_node(id: i64, user: &str, day: &str) -> RawElement {
    let mut node = RawElement::bare(RawKind::Node, id);
    node.lat = Some(-24.9);
    node.lon = Some(33.5);
    node.user = Some(user.to_owned());
    node.timestamp = Some(format!("{day}T08:00:00Z"));
    node.tags = serde_json::json!({"building": "yes"}).as_object().cloned();
    node
}

pub(super) fn timeout() -> TransportError {
    TransportError::Timeout {
        url: "stub://overpass".to_owned(),
        timeout_secs: 600,
    }
}

/// Element source shared between a builder and the test inspecting it.
pub(super) struct SharedSource(pub(super) Rc<StubElementSource>);

impl ElementSource for SharedSource {
    fn fetch(&self, query: &OverpassQuery) -> Result<Vec<RawRecord>, TransportError> {
        self.0.fetch(query)
    }
}

pub(super) struct StubSyncBuilder {
    pub(super) source: Rc<StubElementSource>,
}

impl StubSyncBuilder {
    pub(super) fn new(source: StubElementSource) -> Self {
        Self {
            source: Rc::new(source),
        }
    }
}

impl SyncSourceBuilder for StubSyncBuilder {
    fn build(&self, _config: &SyncConfig) -> Result<Box<dyn ElementSource>, CliError> {
        Ok(Box::new(SharedSource(Rc::clone(&self.source))))
    }
}

pub(super) struct StubProjectBuilder {
    source: RefCell<Option<StubProjectSource>>,
}

impl StubProjectBuilder {
    pub(super) fn new(source: StubProjectSource) -> Self {
        Self {
            source: RefCell::new(Some(source)),
        }
    }
}

impl ProjectSourceBuilder for StubProjectBuilder {
    fn build(&self, _config: &DiscoveryConfig) -> Result<Box<dyn ProjectSource>, CliError> {
        let source = self
            .source
            .borrow_mut()
            .take()
            .expect("project source built once");
        Ok(Box::new(source))
    }
}
