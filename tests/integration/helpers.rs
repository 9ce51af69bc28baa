//! Shared test helpers for integration tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;

use lamus_core::config::archive::ArchiveConfig;
use lamus_core::config::worker::WorkerConfig;
use lamus_core::config::workspace::WorkspaceConfig;
use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_core::traits::{
    ArchiveGraphProvider, ArchiveNode, ArchiveNodeKind, DocumentReference, HandleService,
    MetadataApi, MetadataDocument, TypeChecker, TypecheckVerdict,
};
use lamus_database::{MemoryWorkspaceDao, WorkspaceDao};
use lamus_entity::{Workspace, WorkspaceStatus};
use lamus_service::ImportServices;
use lamus_storage::{LocalWorkspaceFiles, PathResolver, WorkspaceFileHandler};
use lamus_worker::{TaskExecutor, WorkspaceManager};

/// Archive graph kept in memory.
#[derive(Debug, Default)]
pub struct FakeArchive {
    nodes: Mutex<HashMap<String, ArchiveNode>>,
    parents: Mutex<HashMap<String, String>>,
    urls: Mutex<HashMap<String, String>>,
}

impl FakeArchive {
    /// Register a node with its parent and content URL.
    pub fn add(
        &self,
        uri: &str,
        kind: ArchiveNodeKind,
        parent: Option<&str>,
        url: Option<&str>,
        format: Option<&str>,
    ) {
        self.nodes.lock().unwrap().insert(
            uri.to_string(),
            ArchiveNode {
                uri: uri.to_string(),
                handle: None,
                name: PathResolver::basename(url.unwrap_or(uri)).to_string(),
                kind,
                format: format.map(str::to_string),
            },
        );
        if let Some(parent) = parent {
            self.parents
                .lock()
                .unwrap()
                .insert(uri.to_string(), parent.to_string());
        }
        if let Some(url) = url {
            self.urls
                .lock()
                .unwrap()
                .insert(uri.to_string(), url.to_string());
        }
    }

    /// Give a registered node a handle.
    pub fn set_handle(&self, uri: &str, handle: &str) {
        if let Some(node) = self.nodes.lock().unwrap().get_mut(uri) {
            node.handle = Some(handle.to_string());
        }
    }
}

#[async_trait]
impl ArchiveGraphProvider for FakeArchive {
    async fn node(&self, uri: &str) -> AppResult<Option<ArchiveNode>> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes
            .get(uri)
            .or_else(|| nodes.values().find(|n| n.handle.as_deref() == Some(uri)))
            .cloned())
    }

    async fn canonical_parent(&self, uri: &str) -> AppResult<Option<String>> {
        Ok(self.parents.lock().unwrap().get(uri).cloned())
    }

    async fn descendants(&self, uri: &str) -> AppResult<Vec<String>> {
        let parents = self.parents.lock().unwrap();
        let mut found = Vec::new();
        let mut frontier = vec![uri.to_string()];
        while let Some(current) = frontier.pop() {
            let mut children: Vec<String> = parents
                .iter()
                .filter(|(_, parent)| **parent == current)
                .map(|(child, _)| child.clone())
                .collect();
            children.sort();
            frontier.extend(children.iter().cloned());
            found.extend(children);
        }
        Ok(found)
    }

    async fn resolve_url(&self, uri: &str) -> AppResult<Option<String>> {
        Ok(self.urls.lock().unwrap().get(uri).cloned())
    }
}

/// Metadata API serving archive documents from memory and workspace
/// documents from disk as JSON.
#[derive(Debug, Default)]
pub struct FakeMetadata {
    documents: Mutex<HashMap<String, MetadataDocument>>,
}

impl FakeMetadata {
    /// Serve `document` at `url`.
    pub fn add(&self, url: &str, document: MetadataDocument) {
        self.documents
            .lock()
            .unwrap()
            .insert(url.to_string(), document);
    }

    /// Read a document written into the workspace.
    pub fn read_local(&self, url: &str) -> MetadataDocument {
        let path = PathResolver::url_to_path(url).expect("local URL");
        serde_json::from_slice(&std::fs::read(path).expect("document on disk"))
            .expect("JSON document")
    }
}

#[async_trait]
impl MetadataApi for FakeMetadata {
    async fn fetch_document(&self, url: &str) -> AppResult<MetadataDocument> {
        let served = self.documents.lock().unwrap().get(url).cloned();
        if let Some(document) = served {
            return Ok(document);
        }
        let path = PathResolver::url_to_path(url)
            .ok_or_else(|| AppError::not_found(format!("No document at {url}")))?;
        let data = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn serialize_document(&self, document: &MetadataDocument) -> AppResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec_pretty(document)?))
    }

    fn is_metadata_file(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "cmdi")
    }
}

/// Type checker recording every call.
#[derive(Debug, Default)]
pub struct FakeTypeChecker {
    calls: Mutex<Vec<PathBuf>>,
    rejected: Mutex<HashSet<PathBuf>>,
    broken: Mutex<HashSet<PathBuf>>,
}

impl FakeTypeChecker {
    /// Paths checked so far.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    /// Report `path` as not archivable.
    pub fn reject(&self, path: &Path) {
        self.rejected.lock().unwrap().insert(path.to_path_buf());
    }

    /// Fail when asked about `path`.
    pub fn break_on(&self, path: &Path) {
        self.broken.lock().unwrap().insert(path.to_path_buf());
    }

    fn guess(path: &Path) -> &'static str {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cmdi") => "text/x-cmdi+xml",
            Some("wav") => "audio/x-wav",
            Some("mp4") => "video/mp4",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl TypeChecker for FakeTypeChecker {
    async fn check(&self, path: &Path, _declared: Option<&str>) -> AppResult<TypecheckVerdict> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        if self.broken.lock().unwrap().contains(path) {
            return Err(AppError::external(format!("Type checker crashed on {}", path.display())));
        }
        let archivable = !self.rejected.lock().unwrap().contains(path);
        Ok(TypecheckVerdict {
            mimetype: Self::guess(path).to_string(),
            archivable,
            message: if archivable { "ok".into() } else { "unsupported format".into() },
        })
    }
}

/// Handle server knowing a fixed set of handles.
#[derive(Debug, Default)]
pub struct FakeHandles {
    registered: Mutex<HashSet<String>>,
    validations: AtomicUsize,
}

impl FakeHandles {
    /// Register a handle.
    pub fn register(&self, handle: &str) {
        self.registered.lock().unwrap().insert(handle.to_string());
    }

    /// Number of validation requests served.
    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HandleService for FakeHandles {
    fn is_handle(&self, value: &str) -> bool {
        value.starts_with("hdl:")
    }

    async fn validate(&self, handle: &str) -> AppResult<bool> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        Ok(self.registered.lock().unwrap().contains(handle))
    }
}

/// File handler whose document writes always fail.
#[derive(Debug)]
pub struct ReadOnlyFiles {
    inner: LocalWorkspaceFiles,
}

#[async_trait]
impl WorkspaceFileHandler for ReadOnlyFiles {
    async fn create_directory(&self, dir: &Path) -> AppResult<()> {
        self.inner.create_directory(dir).await
    }

    async fn write_document(&self, _document: &MetadataDocument, target: &Path) -> AppResult<()> {
        Err(AppError::storage(format!(
            "Read-only file system: {}",
            target.display()
        )))
    }

    async fn list_files(&self, dir: &Path) -> AppResult<Vec<PathBuf>> {
        self.inner.list_files(dir).await
    }
}

/// Test environment: a temporary corpus and workspace area with fakes
/// for every collaborator.
pub struct TestEnv {
    /// Keeps the temporary directory alive
    pub root: TempDir,
    /// Directory of the fake archive
    pub corpus_root: PathBuf,
    pub dao: Arc<MemoryWorkspaceDao>,
    pub archive: Arc<FakeArchive>,
    pub metadata: Arc<FakeMetadata>,
    pub typechecker: Arc<FakeTypeChecker>,
    pub handles: Arc<FakeHandles>,
    pub paths: Arc<PathResolver>,
    pub services: ImportServices,
}

impl TestEnv {
    /// Create an environment with working file handling.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Create an environment where writing documents fails.
    pub fn with_read_only_files() -> Self {
        Self::build(true)
    }

    fn build(read_only: bool) -> Self {
        let root = tempfile::tempdir().expect("temp dir");
        let corpus_root = root.path().join("corpora");
        std::fs::create_dir_all(&corpus_root).expect("corpus root");

        let workspace_config = WorkspaceConfig {
            base_directory: root.path().join("workspaces").to_string_lossy().into_owned(),
            type_recheck_size_limit_bytes: 1_024,
            ..WorkspaceConfig::default()
        };
        let archive_config = ArchiveConfig {
            corpus_root: corpus_root.to_string_lossy().into_owned(),
        };
        let paths = Arc::new(PathResolver::new(workspace_config, &archive_config));

        let dao = Arc::new(MemoryWorkspaceDao::new());
        let archive = Arc::new(FakeArchive::default());
        let metadata = Arc::new(FakeMetadata::default());
        let typechecker = Arc::new(FakeTypeChecker::default());
        let handles = Arc::new(FakeHandles::default());

        let local = LocalWorkspaceFiles::new(metadata.clone());
        let files: Arc<dyn WorkspaceFileHandler> = if read_only {
            Arc::new(ReadOnlyFiles { inner: local })
        } else {
            Arc::new(local)
        };

        let services = ImportServices::new(
            dao.clone(),
            archive.clone(),
            metadata.clone(),
            typechecker.clone(),
            handles.clone(),
            files,
            paths.clone(),
        );

        Self {
            root,
            corpus_root,
            dao,
            archive,
            metadata,
            typechecker,
            handles,
            paths,
            services,
        }
    }

    /// A workspace manager over this environment.
    pub fn manager(&self) -> WorkspaceManager {
        WorkspaceManager::new(
            self.services.clone(),
            TaskExecutor::new(&WorkerConfig { concurrency: 2 }),
        )
    }

    /// Write a file below the corpus root and return its `file:` URL.
    pub fn corpus_file(&self, relative: &str, size: usize) -> String {
        let path = self.corpus_root.join(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("corpus dirs");
        std::fs::write(&path, vec![b'x'; size]).expect("corpus file");
        PathResolver::path_to_url(&path)
    }

    /// Register a metadata node with its document.
    pub fn metadata_node(
        &self,
        uri: &str,
        parent: Option<&str>,
        relative: &str,
        references: Vec<DocumentReference>,
    ) -> String {
        let url = self.corpus_file(relative, 16);
        self.archive.add(
            uri,
            ArchiveNodeKind::Metadata,
            parent,
            Some(&url),
            Some("text/x-cmdi+xml"),
        );
        self.metadata.add(
            &url,
            MetadataDocument {
                name: PathResolver::basename_without_extension(relative).to_string(),
                schema_location: Some("http://catalog.clarin.eu/profiles/session".into()),
                handle: None,
                referencing: true,
                references,
            },
        );
        url
    }

    /// Register a local resource node of `size` bytes.
    pub fn resource_node(
        &self,
        uri: &str,
        parent: &str,
        relative: &str,
        size: usize,
        format: &str,
    ) -> String {
        let url = self.corpus_file(relative, size);
        self.archive.add(
            uri,
            ArchiveNodeKind::Resource,
            Some(parent),
            Some(&url),
            Some(format),
        );
        url
    }

    /// Persist a workspace over `top_uri`, locking it.
    pub async fn workspace_on(&self, top_uri: &str) -> Workspace {
        let mut workspace = Workspace::new("testuser", 1_000_000);
        workspace.status = WorkspaceStatus::Initialising;
        workspace.top_node_archive_uri = Some(top_uri.to_string());
        self.dao
            .create_workspace(&workspace, &[top_uri.to_string()])
            .await
            .expect("create workspace")
    }

    /// Current stored state of a workspace.
    pub async fn stored(&self, workspace: &Workspace) -> Workspace {
        self.dao
            .find_workspace(workspace.id)
            .await
            .expect("find workspace")
            .expect("workspace exists")
    }
}
