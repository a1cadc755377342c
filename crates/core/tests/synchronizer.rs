use semscope_api::{
    SuggestionRecord, SuggestionsDatabaseEntry, SuggestionsDatabaseSnapshot,
    SuggestionsDatabaseUpdate, SuggestionsDatabaseUpdates,
};
use semscope_core::model::{ProjectPath, QualifiedName};
use semscope_core::{BackoffConfig, InMemoryLanguageServer, Session, SessionConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn qn(s: &str) -> QualifiedName {
    QualifiedName::parse(s).unwrap()
}

fn fast_config(max_attempts: Option<u32>, resync_on_gap: bool) -> SessionConfig {
    SessionConfig {
        backoff: BackoffConfig {
            initial_delay_ms: 1,
            multiplier: 2,
            max_delay_ms: 5,
            max_attempts,
        },
        resync_on_gap,
    }
}

fn record(value: serde_json::Value) -> SuggestionRecord {
    serde_json::from_value(value).unwrap()
}

fn module(name: &str) -> SuggestionRecord {
    record(json!({ "type": "module", "module": name }))
}

fn type_record(module: &str, name: &str) -> SuggestionRecord {
    record(json!({ "type": "type", "module": module, "name": name }))
}

fn method(module: &str, self_type: &str, name: &str) -> SuggestionRecord {
    record(json!({
        "type": "method",
        "module": module,
        "name": name,
        "selfType": self_type,
        "returnType": "Standard.Base.Any",
        "isStatic": false,
    }))
}

fn snapshot(version: u64, entries: Vec<(u32, SuggestionRecord)>) -> SuggestionsDatabaseSnapshot {
    SuggestionsDatabaseSnapshot {
        entries: entries
            .into_iter()
            .map(|(id, suggestion)| SuggestionsDatabaseEntry { id, suggestion })
            .collect(),
        current_version: version,
    }
}

fn batch(version: u64, updates: Vec<SuggestionsDatabaseUpdate>) -> SuggestionsDatabaseUpdates {
    SuggestionsDatabaseUpdates {
        current_version: version,
        updates,
    }
}

fn add(id: u32, suggestion: SuggestionRecord) -> SuggestionsDatabaseUpdate {
    SuggestionsDatabaseUpdate::Add { id, suggestion }
}

fn base_snapshot() -> SuggestionsDatabaseSnapshot {
    snapshot(
        10,
        vec![
            (1, module("local.Project.Main")),
            (2, type_record("local.Project.Main", "Foo")),
            (3, type_record("local.Project.Main", "not valid")),
        ],
    )
}

fn start(
    server: &Arc<InMemoryLanguageServer>,
    config: SessionConfig,
) -> Session {
    Session::start(server.clone(), qn("local.Project"), config).unwrap()
}

async fn wait_for_version(session: &Session, version: u64) {
    tokio::time::timeout(Duration::from_secs(5), session.wait_for_version(version))
        .await
        .expect("version not reached in time");
}

#[tokio::test]
async fn test_initial_load_skips_malformed_records() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, false));

    let status = session.wait_until_loaded().await;
    assert!(status.loaded);
    assert!(!status.degraded);
    assert_eq!(status.current_version, 10);

    let db = session.db().read().await;
    assert_eq!(db.len(), 2);
    assert!(db.get(3).is_none());
    assert_eq!(
        db.find_by_project_path(&ProjectPath::local(Some(qn("Foo")))),
        Some(2)
    );
    // The main module is stored as the project root.
    assert_eq!(db.find_by_project_path(&ProjectPath::local(None)), Some(1));
}

#[tokio::test]
async fn test_batches_apply_in_order() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, false));
    session.wait_until_loaded().await;

    server.push_updates(batch(11, vec![add(4, method("local.Project.Main", "local.Project.Main.Foo", "bar"))]));
    server.push_updates(batch(
        12,
        vec![
            SuggestionsDatabaseUpdate::Remove { id: 2 },
            serde_json::from_value(json!({
                "type": "Modify",
                "id": 4,
                "documentation": { "tag": "Set", "value": "ALIAS baz\nDoes bar." },
            }))
            .unwrap(),
        ],
    ));
    wait_for_version(&session, 12).await;

    let db = session.db().read().await;
    assert!(db.get(2).is_none());
    let bar = db.get(4).unwrap();
    assert_eq!(bar.documentation.aliases, vec!["baz"]);
    assert_eq!(bar.documentation.description, "Does bar.");
    assert_eq!(
        db.find_by_project_path(&ProjectPath::local(Some(qn("Foo.bar")))),
        Some(4)
    );
    assert_eq!(session.current_version(), 12);
}

#[tokio::test]
async fn test_stale_batches_are_discarded_and_duplicates_applied() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, false));
    session.wait_until_loaded().await;

    server.push_updates(batch(9, vec![add(20, module("local.Project.Stale"))]));
    server.push_updates(batch(10, vec![add(21, module("local.Project.Again"))]));
    server.push_updates(batch(11, vec![add(22, module("local.Project.Next"))]));
    wait_for_version(&session, 11).await;

    let db = session.db().read().await;
    assert!(db.get(20).is_none());
    assert!(db.get(21).is_some());
    assert!(db.get(22).is_some());
}

#[tokio::test]
async fn test_version_never_decreases() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, false));
    session.wait_until_loaded().await;

    let mut status = session.status_receiver();
    let mut seen = vec![status.borrow().current_version];
    for version in [11, 5, 12, 12, 3, 13] {
        server.push_updates(batch(version, vec![]));
    }
    while seen.last() != Some(&13) {
        tokio::time::timeout(Duration::from_secs(5), status.changed())
            .await
            .unwrap()
            .unwrap();
        seen.push(status.borrow().current_version);
    }
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
}

#[tokio::test]
async fn test_gap_is_applied_without_resync() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, false));
    session.wait_until_loaded().await;

    server.push_updates(batch(15, vec![add(5, module("local.Project.Later"))]));
    wait_for_version(&session, 15).await;
    assert!(session.db().read().await.get(5).is_some());
    assert_eq!(server.snapshot_requests(), 1);
}

#[tokio::test]
async fn test_gap_triggers_resync_when_configured() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, true));
    session.wait_until_loaded().await;

    server.set_snapshot(snapshot(20, vec![(7, module("local.Project.Fresh"))]));
    server.push_updates(batch(15, vec![add(5, module("local.Project.Later"))]));
    wait_for_version(&session, 20).await;

    let db = session.db().read().await;
    assert_eq!(db.len(), 1);
    assert!(db.get(7).is_some());
    assert!(db.get(5).is_none());
    assert_eq!(server.snapshot_requests(), 2);
}

#[tokio::test]
async fn test_bad_updates_do_not_abort_the_batch() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, false));
    session.wait_until_loaded().await;

    let before = session.db().read().await.get(2).cloned();
    server.push_updates(batch(
        11,
        vec![
            SuggestionsDatabaseUpdate::Remove { id: 99 },
            add(6, type_record("local.Project.Main", "bad name")),
            serde_json::from_value(json!({
                "type": "Modify",
                "id": 2,
                "documentation": { "tag": "Set", "value": "PRIVATE" },
                "scope": { "tag": "Remove" },
            }))
            .unwrap(),
            add(8, type_record("local.Project.Main", "Good")),
        ],
    ));
    wait_for_version(&session, 11).await;

    let db = session.db().read().await;
    assert!(db.get(6).is_none());
    assert!(db.get(8).is_some());
    assert_eq!(db.get(2).cloned(), before);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    server.fail_capability(2);
    server.fail_snapshot(3);
    server.fail_groups(1);
    let session = start(&server, fast_config(None, false));

    let status = session.wait_until_loaded().await;
    assert!(!status.degraded);
    assert_eq!(server.capability_requests(), 3);
    assert_eq!(server.snapshot_requests(), 4);
    assert_eq!(session.db().read().await.len(), 2);
}

#[tokio::test]
async fn test_exhausted_retries_degrade_but_keep_applying() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    server.fail_snapshot(10);
    let session = start(&server, fast_config(Some(2), false));

    let status = session.wait_until_loaded().await;
    assert!(status.degraded);
    assert_eq!(status.current_version, 0);
    assert!(session.db().read().await.is_empty());

    server.push_updates(batch(11, vec![add(1, module("local.Project.Main"))]));
    wait_for_version(&session, 11).await;
    assert_eq!(session.db().read().await.len(), 1);
}

#[tokio::test]
async fn test_path_index_tracks_live_entries() {
    let server = Arc::new(InMemoryLanguageServer::with_snapshot(base_snapshot()));
    let session = start(&server, fast_config(None, false));
    session.wait_until_loaded().await;

    server.push_updates(batch(
        11,
        vec![
            add(30, type_record("local.Project.Data", "Table")),
            add(31, method("local.Project.Data", "local.Project.Data.Table", "rows")),
            add(32, type_record("local.Project.Data", "Column")),
        ],
    ));
    server.push_updates(batch(
        12,
        vec![
            SuggestionsDatabaseUpdate::Remove { id: 32 },
            serde_json::from_value(json!({
                "type": "Modify",
                "id": 31,
                "selfType": { "tag": "Set", "value": "local.Project.Data.Column" },
            }))
            .unwrap(),
        ],
    ));
    wait_for_version(&session, 12).await;

    let db = session.db().read().await;
    for (id, entry) in db.entries() {
        assert_eq!(db.find_by_project_path(&entry.definition_path()), Some(id));
    }
    let removed = ProjectPath::local(Some(qn("Data.Column")));
    let moved = ProjectPath::local(Some(qn("Data.Table.rows")));
    assert_eq!(db.find_by_project_path(&removed), None);
    assert_eq!(db.find_by_project_path(&moved), None);
    assert_eq!(
        db.find_by_project_path(&ProjectPath::local(Some(qn("Data.Column.rows")))),
        Some(31)
    );
}
