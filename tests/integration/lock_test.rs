//! Integration tests for the pre-lock guard and workspace admission.

use lamus_core::error::ErrorKind;
use lamus_core::traits::DocumentReference;
use lamus_database::WorkspaceDao;
use lamus_entity::WorkspaceStatus;

use crate::helpers::TestEnv;

/// `node:1` > `node:2` > `node:3`, plus an unrelated `node:9`.
fn chain(env: &TestEnv) {
    env.metadata_node(
        "node:1",
        None,
        "Corpus.cmdi",
        vec![DocumentReference::metadata("node:2")],
    );
    env.metadata_node(
        "node:2",
        Some("node:1"),
        "Corpus/Sub.cmdi",
        vec![DocumentReference::metadata("node:3")],
    );
    env.metadata_node("node:3", Some("node:2"), "Corpus/Sub/Session.cmdi", vec![]);
    env.metadata_node("node:9", None, "Other.cmdi", vec![]);
}

#[tokio::test]
async fn test_missing_uri_is_rejected() {
    let env = TestEnv::new();
    let err = env.manager().guard().ensure_not_locked(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_isolated_node_is_not_locked() {
    let env = TestEnv::new();
    chain(&env);
    env.workspace_on("node:1").await;

    env.manager()
        .guard()
        .ensure_not_locked(Some("node:9"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_locked_ancestor_blocks_descendant() {
    let env = TestEnv::new();
    chain(&env);
    env.workspace_on("node:1").await;

    let err = env
        .manager()
        .guard()
        .ensure_not_locked(Some("node:3"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PreLocked);
    assert_eq!(err.node_uri.as_deref(), Some("node:3"));
}

#[tokio::test]
async fn test_locked_descendant_blocks_ancestor() {
    let env = TestEnv::new();
    chain(&env);
    env.workspace_on("node:3").await;

    let err = env
        .manager()
        .guard()
        .ensure_not_locked(Some("node:1"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PreLocked));
}

#[tokio::test]
async fn test_finished_workspace_releases_lock() {
    let env = TestEnv::new();
    chain(&env);
    let workspace = env.workspace_on("node:1").await;
    env.dao
        .update_workspace_status(workspace.id, WorkspaceStatus::DataMovedSuccess, "done")
        .await
        .unwrap();

    env.manager()
        .guard()
        .ensure_not_locked(Some("node:2"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_guard_checks_relatives_and_closure_checks_node() {
    let env = TestEnv::new();
    chain(&env);
    env.workspace_on("node:2").await;
    let manager = env.manager();

    manager
        .guard()
        .ensure_not_locked(Some("node:2"))
        .await
        .unwrap();

    let closure = manager.guard().lock_closure("node:2").await.unwrap();
    assert_eq!(closure, vec!["node:2", "node:1", "node:3"]);
    assert!(env.dao.is_any_locked(&closure).await.unwrap());

    let err = manager
        .create_and_import_workspace("bob", "node:2")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PreLocked);
}

#[tokio::test]
async fn test_manager_rejects_overlapping_workspace() {
    let env = TestEnv::new();
    chain(&env);
    let manager = env.manager();

    let first = manager
        .create_and_import_workspace("alice", "node:2")
        .await
        .unwrap();
    first.import.await.unwrap().unwrap();

    for uri in ["node:1", "node:2", "node:3"] {
        let err = manager
            .create_and_import_workspace("bob", uri)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PreLocked, "{uri} should be locked");
    }

    manager
        .create_and_import_workspace("bob", "node:9")
        .await
        .unwrap()
        .import
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_lock_follows_handle_of_top_node() {
    let env = TestEnv::new();
    chain(&env);
    env.archive.set_handle("node:1", "hdl:1839/00-corpus");
    let manager = env.manager();

    let created = manager
        .create_and_import_workspace("alice", "node:1")
        .await
        .unwrap();
    assert_eq!(
        created.workspace.top_node_archive_uri.as_deref(),
        Some("hdl:1839/00-corpus")
    );
    created.import.await.unwrap().unwrap();

    let err = manager
        .guard()
        .ensure_not_locked(Some("node:3"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PreLocked);

    let err = manager
        .create_and_import_workspace("bob", "hdl:1839/00-corpus")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PreLocked);
}

#[tokio::test]
async fn test_manager_validates_request() {
    let env = TestEnv::new();
    chain(&env);
    env.resource_node("node:res", "node:1", "Corpus/audio.wav", 16, "audio/x-wav");
    let manager = env.manager();

    let err = manager
        .create_and_import_workspace("  ", "node:1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = manager
        .create_and_import_workspace("alice", "node:unknown")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = manager
        .create_and_import_workspace("alice", "node:res")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
