//! Parent to child links between workspace nodes.

use std::sync::Arc;

use tracing::debug;

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_core::traits::{MetadataApi, MetadataDocument};
use lamus_database::WorkspaceDao;
use lamus_entity::{Workspace, WorkspaceNode, WorkspaceNodeLink, WorkspaceNodeStatus};
use lamus_storage::{PathResolver, WorkspaceFileHandler};

/// Records links and keeps parent documents in step with them.
#[derive(Debug, Clone)]
pub struct NodeLinker {
    dao: Arc<dyn WorkspaceDao>,
    metadata: Arc<dyn MetadataApi>,
    files: Arc<dyn WorkspaceFileHandler>,
}

impl NodeLinker {
    /// Create a linker.
    pub fn new(
        dao: Arc<dyn WorkspaceDao>,
        metadata: Arc<dyn MetadataApi>,
        files: Arc<dyn WorkspaceFileHandler>,
    ) -> Self {
        Self {
            dao,
            metadata,
            files,
        }
    }

    /// Attach `child` below `parent`, or make it the workspace's top node.
    ///
    /// The parent document is not touched; during import it already
    /// references the child.
    pub async fn link(
        &self,
        workspace: &Workspace,
        parent: Option<&WorkspaceNode>,
        child: &WorkspaceNode,
        child_uri: &str,
    ) -> AppResult<()> {
        match parent {
            None => {
                let mut updated = workspace.clone();
                updated.top_node_id = Some(child.id);
                if child.archive_uri.is_some() {
                    updated.top_node_archive_uri = child.archive_uri.clone();
                }
                if child.archive_url.is_some() {
                    updated.top_node_archive_url = child.archive_url.clone();
                }
                self.dao.update_workspace_top_node(&updated).await?;
                debug!(workspace_id = %workspace.id, node_id = %child.id, "Set workspace top node");
            }
            Some(parent) => {
                self.dao
                    .add_link(&WorkspaceNodeLink::new(
                        workspace.id,
                        parent.id,
                        child.id,
                        child_uri,
                    ))
                    .await?;
                debug!(
                    workspace_id = %workspace.id,
                    parent_id = %parent.id,
                    child_id = %child.id,
                    "Linked nodes"
                );
            }
        }
        Ok(())
    }

    /// Add a reference to `child` in the parent's document, then record the link.
    ///
    /// Nothing is recorded if the document cannot be loaded or written.
    pub async fn link_with_document_mutation(
        &self,
        parent: &WorkspaceNode,
        child: &WorkspaceNode,
    ) -> AppResult<()> {
        let workspace_id = parent.workspace_id;
        let child_uri = Self::reference_uri(child)
            .ok_or_else(|| {
                AppError::validation(format!("Node {} has no location to reference", child.id))
            })?
            .to_string();

        let (mut document, target) = self.load_parent_document(parent).await?;
        if child.is_metadata() {
            document.add_metadata_reference(child_uri.clone());
        } else {
            document.add_resource_reference(child_uri.clone(), child.format.clone());
        }

        self.files
            .write_document(&document, &target)
            .await
            .map_err(|e| {
                AppError::workspace(workspace_id, "Failed to write parent document", e)
            })?;

        self.dao
            .add_link(&WorkspaceNodeLink::new(
                workspace_id,
                parent.id,
                child.id,
                child_uri,
            ))
            .await
    }

    /// Delete the link between `parent` and `child`. Returns false if there was none.
    ///
    /// A child left without any parent is marked deleted; its row is kept.
    pub async fn unlink(&self, parent: &WorkspaceNode, child: &WorkspaceNode) -> AppResult<bool> {
        let removed = self.dao.delete_link(parent.id, child.id).await?;
        if removed {
            self.retire_if_detached(child).await?;
        }
        Ok(removed)
    }

    /// Remove the reference to `child` from the parent's document, then delete the link.
    pub async fn unlink_with_document_mutation(
        &self,
        parent: &WorkspaceNode,
        child: &WorkspaceNode,
    ) -> AppResult<bool> {
        let workspace_id = parent.workspace_id;
        let recorded_uri = self
            .dao
            .list_child_links(parent.id)
            .await?
            .into_iter()
            .find(|link| link.child_node_id == child.id)
            .map(|link| link.child_uri);

        let (mut document, target) = self.load_parent_document(parent).await?;
        let mut removed = false;
        for uri in recorded_uri.iter().map(String::as_str).chain(Self::reference_uri(child)) {
            removed |= document.remove_reference(uri);
        }
        if !removed {
            debug!(parent_id = %parent.id, child_id = %child.id, "Parent document had no reference to child");
        }

        self.files
            .write_document(&document, &target)
            .await
            .map_err(|e| {
                AppError::workspace(workspace_id, "Failed to write parent document", e)
            })?;

        self.unlink(parent, child).await
    }

    async fn retire_if_detached(&self, child: &WorkspaceNode) -> AppResult<()> {
        if self.dao.list_parent_links(child.id).await?.is_empty() {
            self.dao
                .update_node_status(child.id, WorkspaceNodeStatus::Deleted)
                .await?;
            debug!(workspace_id = %child.workspace_id, node_id = %child.id, "Marked unlinked node deleted");
        }
        Ok(())
    }

    /// The URI a parent document uses for `child`. External nodes keep their archive URL.
    fn reference_uri(child: &WorkspaceNode) -> Option<&str> {
        match child.status {
            WorkspaceNodeStatus::External => {
                child.archive_url.as_deref().or(child.reference_url())
            }
            _ => child.reference_url(),
        }
    }

    async fn load_parent_document(
        &self,
        parent: &WorkspaceNode,
    ) -> AppResult<(MetadataDocument, std::path::PathBuf)> {
        let workspace_id = parent.workspace_id;
        let url = parent.workspace_url.as_deref().ok_or_else(|| {
            AppError::workspace(
                workspace_id,
                format!("Parent node {} has no workspace copy", parent.id),
                AppError::precondition("parent node is not materialized"),
            )
        })?;
        let target = PathResolver::url_to_path(url).ok_or_else(|| {
            AppError::workspace(
                workspace_id,
                format!("Parent node {} is not stored locally", parent.id),
                AppError::validation(format!("not a local URL: {url}")),
            )
        })?;

        let document = self
            .metadata
            .fetch_document(url)
            .await
            .map_err(|e| AppError::workspace(workspace_id, "Failed to load parent document", e))?;
        Ok((document, target))
    }
}
