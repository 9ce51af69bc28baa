//! Import of files that sit in the orphans directory but no document references.
//!
//! Imported orphans hang below one virtual container node per workspace
//! instead of a metadata parent.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_entity::{
    ImportProblem, Workspace, WorkspaceNode, WorkspaceNodeStatus, WorkspaceNodeType,
};
use lamus_storage::PathResolver;

use crate::archive::ArchiveTreeBridge;
use crate::context::ImportServices;

/// What happened to one orphan file.
#[derive(Debug)]
enum OrphanOutcome {
    Imported,
    AlreadyPresent,
    Rejected(ImportProblem),
}

/// Turns orphan files into uploaded workspace nodes.
#[derive(Debug, Clone)]
pub struct OrphanNodesImportHandler {
    services: ImportServices,
    tree: ArchiveTreeBridge,
}

impl OrphanNodesImportHandler {
    /// Create a handler.
    pub fn new(services: ImportServices) -> Self {
        let tree = services.tree();
        Self { services, tree }
    }

    /// Import every orphan file not yet in `workspace`.
    ///
    /// Files that cannot be imported are reported as problems; only a
    /// failure to enumerate the orphans directory is an error.
    pub async fn explore_orphan_nodes(&self, workspace: &Workspace) -> AppResult<Vec<ImportProblem>> {
        let top_node_path = match &workspace.top_node_archive_uri {
            Some(uri) => self
                .tree
                .closest_top_node_path(uri)
                .await
                .map_err(|e| {
                    AppError::workspace(workspace.id, "Failed to locate the orphans directory", e)
                })?,
            None => None,
        };
        let directory = self.services.paths.orphans_directory(top_node_path.as_deref());

        let files = self
            .services
            .files
            .list_files(&directory)
            .await
            .map_err(|e| {
                AppError::workspace(
                    workspace.id,
                    format!("Failed to list orphans directory {}", directory.display()),
                    e,
                )
            })?;
        debug!(
            workspace_id = %workspace.id,
            directory = %directory.display(),
            files = files.len(),
            "Exploring orphan files"
        );

        let mut known = self.known_urls(workspace).await?;
        let mut problems = Vec::new();
        let mut imported = 0usize;
        let mut skipped = 0usize;
        let mut container = None;
        for file in files {
            match self
                .import_orphan(workspace, &directory, &mut container, &mut known, &file)
                .await
            {
                Ok(OrphanOutcome::Imported) => imported += 1,
                Ok(OrphanOutcome::AlreadyPresent) => skipped += 1,
                Ok(OrphanOutcome::Rejected(problem)) => problems.push(problem),
                Err(e) => problems.push(ImportProblem::from_error(
                    &file,
                    "Failed to import orphan file",
                    &e,
                )),
            }
        }

        info!(
            workspace_id = %workspace.id,
            imported,
            skipped,
            problems = problems.len(),
            "Orphan import finished"
        );
        Ok(problems)
    }

    /// Canonical archive and workspace URLs of the nodes already in `workspace`.
    async fn known_urls(&self, workspace: &Workspace) -> AppResult<HashSet<String>> {
        let nodes = self
            .services
            .dao
            .list_nodes(workspace.id)
            .await
            .map_err(|e| AppError::workspace(workspace.id, "Failed to list workspace nodes", e))?;
        Ok(nodes
            .iter()
            .flat_map(|node| [node.archive_url.as_deref(), node.workspace_url.as_deref()])
            .flatten()
            .map(PathResolver::canonical_url)
            .collect())
    }

    /// Import one file unless a node already points at it.
    async fn import_orphan(
        &self,
        workspace: &Workspace,
        directory: &Path,
        container: &mut Option<WorkspaceNode>,
        known: &mut HashSet<String>,
        file: &Path,
    ) -> AppResult<OrphanOutcome> {
        let url = PathResolver::path_to_url(file);
        if known.contains(&url) {
            debug!(workspace_id = %workspace.id, file = %file.display(), "Orphan already in workspace");
            return Ok(OrphanOutcome::AlreadyPresent);
        }

        let verdict = self.services.typechecker.check(file, None).await?;
        if !verdict.archivable {
            return Ok(OrphanOutcome::Rejected(ImportProblem::new(
                file,
                format!("File type {} is not archivable: {}", verdict.mimetype, verdict.message),
            )));
        }

        let node_type = WorkspaceNodeType::from_mimetype(Some(&verdict.mimetype));
        let file_name = PathResolver::basename(&file.to_string_lossy()).to_string();
        let mut node = WorkspaceNode::new(workspace.id, file_name, node_type, WorkspaceNodeStatus::Uploaded);

        if node_type.is_metadata() || self.services.metadata.is_metadata_file(file) {
            let document = self.services.metadata.fetch_document(&url).await?;
            node.node_type = WorkspaceNodeType::Metadata;
            node.name = document.name;
            node.profile_schema_uri = document.schema_location;
            node.pid = document.handle.filter(|h| self.services.handles.is_handle(h));
        }
        node.format = Some(verdict.mimetype);
        node.workspace_url = Some(url.clone());

        let parent = match container.take() {
            Some(parent) => parent,
            None => self.orphans_container(workspace, directory).await?,
        };
        self.services.dao.add_node(&node).await?;
        let linked = self
            .services
            .linker()
            .link(workspace, Some(&parent), &node, &url)
            .await;
        *container = Some(parent);
        known.insert(url);
        linked?;

        debug!(workspace_id = %workspace.id, node_id = %node.id, file = %file.display(), "Imported orphan file");
        Ok(OrphanOutcome::Imported)
    }

    /// The virtual node orphans are attached under, created on first use.
    async fn orphans_container(
        &self,
        workspace: &Workspace,
        directory: &Path,
    ) -> AppResult<WorkspaceNode> {
        let url = PathResolver::path_to_url(directory);
        if let Some(existing) = self.services.dao.find_node_by_url(workspace.id, &url).await? {
            return Ok(existing);
        }

        let mut node = WorkspaceNode::new(
            workspace.id,
            self.services.paths.config().orphans_directory_name.clone(),
            WorkspaceNodeType::Unknown,
            WorkspaceNodeStatus::Virtual,
        );
        node.workspace_url = Some(url);
        node.protected = true;
        self.services.dao.add_node(&node).await?;
        debug!(workspace_id = %workspace.id, node_id = %node.id, "Created orphans container node");
        Ok(node)
    }
}
