//! Integration tests for importing orphan files.

use lamus_core::traits::{ArchiveNodeKind, DocumentReference, MetadataDocument};
use lamus_database::WorkspaceDao;
use lamus_entity::{WorkspaceNodeStatus, WorkspaceNodeType};
use lamus_service::OrphanNodesImportHandler;
use lamus_storage::PathResolver;

use crate::helpers::TestEnv;

fn orphan_metadata(env: &TestEnv, relative: &str, handle: Option<&str>) {
    let document = MetadataDocument {
        name: "Recovered session".into(),
        schema_location: Some("http://catalog.clarin.eu/profiles/session".into()),
        handle: handle.map(str::to_string),
        referencing: true,
        references: vec![],
    };
    let path = env.corpus_root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();
}

#[tokio::test]
async fn test_orphans_become_uploaded_nodes() {
    let env = TestEnv::new();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);
    let wav = env.corpus_file("Corpus/sessions/new.wav", 32);
    let clip = env.corpus_file("Corpus/sessions/day1/clip.mp4", 32);

    let created = env
        .manager()
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    let report = created.import.await.unwrap().unwrap();
    assert!(report.problems.is_empty());

    let nodes = env.dao.list_nodes(created.workspace.id).await.unwrap();
    assert_eq!(nodes.len(), 4);

    let audio = env
        .dao
        .find_node_by_url(created.workspace.id, &wav)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(audio.status, WorkspaceNodeStatus::Uploaded);
    assert_eq!(audio.node_type, WorkspaceNodeType::ResourceAudio);
    assert_eq!(audio.format.as_deref(), Some("audio/x-wav"));
    assert_eq!(audio.name, "new.wav");
    assert!(audio.archive_uri.is_none());

    let video = env
        .dao
        .find_node_by_url(created.workspace.id, &clip)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(video.node_type, WorkspaceNodeType::ResourceVideo);

    // orphans hang below the container, not below the top node
    assert!(env.dao.list_child_links(report.top_node.id).await.unwrap().is_empty());
    let container = nodes
        .iter()
        .find(|n| n.status == WorkspaceNodeStatus::Virtual)
        .unwrap();
    assert_eq!(container.name, "sessions");
    let children: Vec<_> = env
        .dao
        .list_child_links(container.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.child_node_id)
        .collect();
    assert_eq!(children, vec![video.id, audio.id]);
}

#[tokio::test]
async fn test_unimportable_orphans_are_reported() {
    let env = TestEnv::new();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);
    env.corpus_file("Corpus/sessions/bad.exe", 8);
    env.corpus_file("Corpus/sessions/broken.txt", 8);
    env.corpus_file("Corpus/sessions/good.wav", 8);
    let sessions = env.corpus_root.join("Corpus/sessions");
    env.typechecker.reject(&sessions.join("bad.exe"));
    env.typechecker.break_on(&sessions.join("broken.txt"));

    let created = env
        .manager()
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    let report = created.import.await.unwrap().unwrap();

    let files: Vec<_> = report.problems.iter().map(|p| p.file.clone()).collect();
    assert_eq!(files, vec![sessions.join("bad.exe"), sessions.join("broken.txt")]);
    assert!(report.problems[0].message.contains("not archivable"));
    assert!(report.problems[1].cause.is_some());

    let stored = env.stored(&created.workspace).await;
    assert_eq!(stored.status, lamus_entity::WorkspaceStatus::Initialised);
    let nodes = env.dao.list_nodes(created.workspace.id).await.unwrap();
    assert_eq!(nodes.len(), 3);
}

#[tokio::test]
async fn test_orphan_metadata_is_parsed() {
    let env = TestEnv::new();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);
    orphan_metadata(&env, "Corpus/sessions/recovered.cmdi", Some("hdl:1839/00-recovered"));
    orphan_metadata(&env, "Corpus/sessions/draft.cmdi", Some("not-a-handle"));

    let created = env
        .manager()
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    created.import.await.unwrap().unwrap();

    let recovered_url =
        PathResolver::path_to_url(&env.corpus_root.join("Corpus/sessions/recovered.cmdi"));
    let recovered = env
        .dao
        .find_node_by_url(created.workspace.id, &recovered_url)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recovered.node_type, WorkspaceNodeType::Metadata);
    assert_eq!(recovered.name, "Recovered session");
    assert_eq!(recovered.pid.as_deref(), Some("hdl:1839/00-recovered"));
    assert_eq!(
        recovered.profile_schema_uri.as_deref(),
        Some("http://catalog.clarin.eu/profiles/session")
    );

    let draft_url = PathResolver::path_to_url(&env.corpus_root.join("Corpus/sessions/draft.cmdi"));
    let draft = env
        .dao
        .find_node_by_url(created.workspace.id, &draft_url)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.pid, None);
}

#[tokio::test]
async fn test_second_exploration_skips_known_files() {
    let env = TestEnv::new();
    env.metadata_node("node:1", None, "Corpus.cmdi", vec![]);
    env.corpus_file("Corpus/sessions/a.wav", 8);
    env.corpus_file("Corpus/sessions/b.txt", 8);
    let workspace = env.workspace_on("node:1").await;
    let handler = OrphanNodesImportHandler::new(env.services.clone());

    let problems = handler.explore_orphan_nodes(&workspace).await.unwrap();
    assert!(problems.is_empty());
    assert_eq!(env.dao.list_nodes(workspace.id).await.unwrap().len(), 3);
    assert_eq!(env.typechecker.calls().len(), 2);

    env.corpus_file("Corpus/sessions/c.wav", 8);
    handler.explore_orphan_nodes(&workspace).await.unwrap();
    let nodes = env.dao.list_nodes(workspace.id).await.unwrap();
    assert_eq!(nodes.len(), 4);
    assert_eq!(env.typechecker.calls().len(), 3);

    let containers: Vec<_> = nodes
        .iter()
        .filter(|n| n.status == WorkspaceNodeStatus::Virtual)
        .collect();
    assert_eq!(containers.len(), 1);
    assert_eq!(
        env.dao.list_child_links(containers[0].id).await.unwrap().len(),
        3
    );
}

#[tokio::test]
async fn test_referenced_file_is_not_imported_again_as_orphan() {
    let env = TestEnv::new();
    env.metadata_node(
        "node:1",
        None,
        "Corpus.cmdi",
        vec![DocumentReference::resource("node:4", Some("audio/x-wav".into()))],
    );
    env.corpus_file("Corpus/sessions/late.wav", 16);
    let short_url = format!(
        "file:{}",
        env.corpus_root.join("Corpus/sessions/late.wav").display()
    );
    env.archive.add(
        "node:4",
        ArchiveNodeKind::Resource,
        Some("node:1"),
        Some(&short_url),
        Some("audio/x-wav"),
    );

    let created = env
        .manager()
        .create_and_import_workspace("testuser", "node:1")
        .await
        .unwrap();
    let report = created.import.await.unwrap().unwrap();
    assert!(report.problems.is_empty());

    let nodes = env.dao.list_nodes(created.workspace.id).await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert!(nodes.iter().all(|n| n.status != WorkspaceNodeStatus::Uploaded));
    assert!(nodes.iter().all(|n| n.status != WorkspaceNodeStatus::Virtual));
    let late = nodes
        .iter()
        .find(|n| n.archive_uri.as_deref() == Some("node:4"))
        .unwrap();
    assert_eq!(late.archive_url.as_deref(), Some(short_url.as_str()));
}

#[tokio::test]
async fn test_workspace_without_top_node_uses_corpus_orphans() {
    let env = TestEnv::new();
    env.corpus_file("sessions/loose.wav", 8);
    let mut workspace = env.workspace_on("node:none").await;
    workspace.top_node_archive_uri = None;

    OrphanNodesImportHandler::new(env.services.clone())
        .explore_orphan_nodes(&workspace)
        .await
        .unwrap();

    let nodes = env.dao.list_nodes(workspace.id).await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert!(nodes.iter().any(|n| n.name == "loose.wav"));
}
