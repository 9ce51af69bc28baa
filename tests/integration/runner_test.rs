//! Integration tests for the import runner's status handling.

use lamus_core::error::ErrorKind;
use lamus_core::traits::DocumentReference;
use lamus_entity::WorkspaceStatus;
use lamus_storage::WorkspaceFileHandler;
use lamus_worker::WorkspaceImportRunner;

use crate::helpers::TestEnv;

#[tokio::test]
async fn test_runner_requires_workspace() {
    let env = TestEnv::new();
    let err = WorkspaceImportRunner::new(env.services.clone())
        .top_node("node:1")
        .run()
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
}

#[tokio::test]
async fn test_runner_requires_top_node() {
    let env = TestEnv::new();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);
    let workspace = env.workspace_on("node:1").await;

    let err = WorkspaceImportRunner::new(env.services.clone())
        .workspace(workspace.clone())
        .run()
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert_eq!(env.stored(&workspace).await.status, WorkspaceStatus::Initialising);
}

#[tokio::test]
async fn test_runner_imports_prepared_workspace() {
    let env = TestEnv::new();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);
    let workspace = env.workspace_on("node:1").await;
    env.services
        .files
        .create_directory(&env.paths.workspace_directory(workspace.id))
        .await
        .unwrap();

    let report = WorkspaceImportRunner::new(env.services.clone())
        .workspace(workspace.clone())
        .top_node("node:1")
        .run()
        .await
        .unwrap();

    assert_eq!(report.workspace_id, workspace.id);
    assert_eq!(report.top_node.archive_uri.as_deref(), Some("node:1"));
    assert_eq!(env.stored(&workspace).await.status, WorkspaceStatus::Initialised);
}

#[tokio::test]
async fn test_materialization_failure_marks_workspace() {
    let env = TestEnv::with_read_only_files();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);

    let created = env
        .manager()
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    let err = created.import.await.unwrap().unwrap_err();

    assert_eq!(err.kind, ErrorKind::NodeImport);
    assert_eq!(err.importer, Some("metadata"));
    assert_eq!(err.workspace_id, Some(created.workspace.id));
    assert_eq!(err.app_source().map(|e| e.kind), Some(ErrorKind::Storage));

    let stored = env.stored(&created.workspace).await;
    assert_eq!(stored.status, WorkspaceStatus::ErrorInitialising);
    assert!(stored
        .message
        .starts_with("Error during initialisation of workspace"));
}

#[tokio::test]
async fn test_missing_child_fails_whole_import() {
    let env = TestEnv::new();
    env.metadata_node(
        "node:1",
        None,
        "Corpus.cmdi",
        vec![DocumentReference::metadata("node:missing")],
    );

    let created = env
        .manager()
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    let err = created.import.await.unwrap().unwrap_err();

    assert_eq!(err.kind, ErrorKind::NodeImport);
    assert_eq!(err.node_uri.as_deref(), Some("node:missing"));
    assert_eq!(err.app_source().map(|e| e.kind), Some(ErrorKind::NotFound));
    assert_eq!(
        env.stored(&created.workspace).await.status,
        WorkspaceStatus::ErrorInitialising
    );
}

#[tokio::test]
async fn test_resource_without_url_is_invalid() {
    let env = TestEnv::new();
    env.metadata_node(
        "node:1",
        None,
        "Corpus.cmdi",
        vec![DocumentReference::resource("node:nourl", None)],
    );
    env.archive.add(
        "node:nourl",
        lamus_core::traits::ArchiveNodeKind::Resource,
        Some("node:1"),
        None,
        None,
    );

    let created = env
        .manager()
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    let err = created.import.await.unwrap().unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.node_uri.as_deref(), Some("node:nourl"));
}

#[tokio::test]
async fn test_failed_workspace_keeps_lock() {
    let env = TestEnv::with_read_only_files();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);
    let manager = env.manager();

    let created = manager
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    assert!(created.import.await.unwrap().is_err());

    let err = manager
        .create_and_import_workspace("other", "node:1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PreLocked);
}
