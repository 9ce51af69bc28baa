//! Pre-lock guard: no two live workspaces may cover overlapping archive subtrees.

use std::sync::Arc;

use tracing::{debug, info};

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_database::WorkspaceDao;

use crate::archive::ArchiveTreeBridge;

/// Checks a node against the archive nodes locked by open workspaces.
#[derive(Debug, Clone)]
pub struct PreLockGuard {
    dao: Arc<dyn WorkspaceDao>,
    tree: ArchiveTreeBridge,
}

impl PreLockGuard {
    /// Create a guard.
    pub fn new(dao: Arc<dyn WorkspaceDao>, tree: ArchiveTreeBridge) -> Self {
        Self { dao, tree }
    }

    /// Fail with `PreLocked` if an ancestor or descendant of the node is locked.
    ///
    /// The node itself is not checked, so the top node of an open workspace
    /// passes here. Workspace creation checks [`Self::lock_closure`] instead,
    /// which includes the node. A missing URI is rejected with `Validation`.
    pub async fn ensure_not_locked(&self, archive_node_uri: Option<&str>) -> AppResult<()> {
        let uri = archive_node_uri
            .ok_or_else(|| AppError::validation("Archive node URI must not be null"))?;

        let closure = self.tree.ancestors_and_descendants(uri).await?;
        if closure.is_empty() {
            debug!(node_uri = %uri, "Node has no ancestors or descendants");
            return Ok(());
        }

        if self.dao.is_any_locked(&closure).await? {
            info!(node_uri = %uri, "Node overlaps a locked archive subtree");
            return Err(AppError::pre_locked(uri));
        }
        Ok(())
    }

    /// Every identifier a new workspace on `uri` must not overlap: the node
    /// itself, its ancestors, and its descendants.
    pub async fn lock_closure(&self, uri: &str) -> AppResult<Vec<String>> {
        let mut uris = vec![self.tree.preferred_uri(uri).await?];
        if uris[0] != uri {
            uris.push(uri.to_string());
        }
        uris.extend(self.tree.ancestors_and_descendants(uri).await?);
        Ok(uris)
    }
}
