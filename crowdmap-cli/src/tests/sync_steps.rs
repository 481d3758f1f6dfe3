//! Behaviour-driven step definitions driving the sync command scenarios.

use super::fixtures::{StubSyncBuilder, Workspace, edited_node, timeout};
use super::*;
use crate::sync::run_sync_with;
use crowdmap_data::overpass::test_support::StubElementSource;
use crowdmap_data::overpass::{FetchError, RawElement};
use crowdmap_data::store::load_collection;
use crowdmap_data::{SyncError, SyncReport};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Sync scenario state shared by every step.
struct SyncWorld {
    workspace: Workspace,
    next_id: RefCell<i64>,
    builder: RefCell<Option<StubSyncBuilder>>,
    output: RefCell<String>,
    result: RefCell<Option<Result<SyncReport, CliError>>>,
}

impl SyncWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            next_id: RefCell::new(1),
            builder: RefCell::new(None),
            output: RefCell::new(String::new()),
            result: RefCell::new(None),
        }
    }

    fn edits(&self, user: &str, day: &str) -> RawElement {
        let mut next = self.next_id.borrow_mut();
        let id = *next;
        *next += 1;
        edited_node(id, user, day)
    }

    fn run(&self) -> Result<SyncReport, CliError> {
        let builder = self.builder.borrow();
        let builder = builder.as_ref().expect("source configured");
        let mut out = Vec::new();
        let result = run_sync_with(&self.workspace.sync_settings(false), builder, &mut out);
        *self.output.borrow_mut() = String::from_utf8(out).expect("utf-8 output");
        result
    }
}

#[fixture]
fn world() -> SyncWorld {
    SyncWorld::new()
}

#[given("an empty workspace")]
fn empty_workspace(#[from(world)] world: &SyncWorld) {
    assert!(world.workspace.read("mapping.geojson").is_none());
}

#[given("the source returns edits by {user} on {day}")]
fn source_returns_edits(#[from(world)] world: &SyncWorld, user: String, day: String) {
    let element = world.edits(user.trim_matches('"'), &day);
    *world.builder.borrow_mut() = Some(StubSyncBuilder::new(
        StubElementSource::with_elements(vec![element]),
    ));
}

#[given("the source always times out")]
fn source_times_out(#[from(world)] world: &SyncWorld) {
    *world.builder.borrow_mut() =
        Some(StubSyncBuilder::new(StubElementSource::with_error(timeout())));
}

#[given("the sync command has already run")]
fn already_synced(#[from(world)] world: &SyncWorld) {
    world.run().expect("initial sync succeeds");
}

#[when("I run the sync command")]
fn run_command(#[from(world)] world: &SyncWorld) {
    let result = world.run();
    *world.result.borrow_mut() = Some(result);
}

#[then("the summary reports a full refresh from {since}")]
fn full_refresh_from(#[from(world)] world: &SyncWorld, since: String) {
    let output = world.output.borrow();
    assert!(
        output.contains(&format!("Full refresh from {since} (no previous state)")),
        "unexpected summary:\n{output}"
    );
}

#[then("the summary reports an incremental update")]
fn incremental_update(#[from(world)] world: &SyncWorld) {
    let output = world.output.borrow();
    assert!(
        output.starts_with("Incremental update since "),
        "unexpected summary:\n{output}"
    );
}

#[then("the summary reports {updated} updated and {added} new features")]
fn merge_counts(#[from(world)] world: &SyncWorld, updated: usize, added: usize) {
    let output = world.output.borrow();
    assert!(output.contains(&format!("Merged: {updated} updated, {added} new features")));
}

#[then("the summary lists {user} with {count} edits")]
fn lists_contributor(#[from(world)] world: &SyncWorld, user: String, count: usize) {
    let output = world.output.borrow();
    let user = user.trim_matches('"');
    assert!(output.contains(&format!("  {user}: {count} edits")));
}

#[then("the collection holds {count} features")]
fn collection_holds(#[from(world)] world: &SyncWorld, count: usize) {
    let path = world.workspace.path("mapping.geojson");
    let collection = load_collection(&path)
        .expect("collection readable")
        .expect("collection written");
    assert_eq!(collection.len(), count);
    assert_eq!(collection.metadata.count, count);
}

#[then("the command fails after {attempts} attempts")]
fn fails_after(#[from(world)] world: &SyncWorld, attempts: u32) {
    let result = world.result.borrow();
    match result.as_ref().expect("command ran") {
        Err(CliError::Sync(SyncError::Fetch {
            source: FetchError::RetriesExhausted { attempts: made, .. },
            ..
        })) => assert_eq!(*made, attempts),
        other => panic!("expected exhausted retries, found {other:?}"),
    }
    let builder = world.builder.borrow();
    let source = &builder.as_ref().expect("source configured").source;
    assert_eq!(source.attempts(), attempts);
}

#[then("no artefacts were written")]
fn nothing_written(#[from(world)] world: &SyncWorld) {
    for name in ["mapping.geojson", "state.json", "stats.json"] {
        assert!(world.workspace.read(name).is_none(), "{name} was written");
    }
}

#[scenario(path = "tests/features/sync_command.feature", index = 0)]
fn first_run_fetches_from_epoch(#[from(world)] world: SyncWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sync_command.feature", index = 1)]
fn second_run_merges(#[from(world)] world: SyncWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sync_command.feature", index = 2)]
fn failing_source_leaves_workspace(#[from(world)] world: SyncWorld) {
    let _ = world;
}
