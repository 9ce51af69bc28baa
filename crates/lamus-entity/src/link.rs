//! Parent to child link between workspace nodes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lamus_core::types::id::{WorkspaceId, WorkspaceNodeId};

/// A reference from a metadata node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct WorkspaceNodeLink {
    /// The workspace both nodes belong to.
    pub workspace_id: WorkspaceId,
    /// The referencing metadata node.
    pub parent_node_id: WorkspaceNodeId,
    /// The referenced node.
    pub child_node_id: WorkspaceNodeId,
    /// URI used for the reference inside the parent document.
    pub child_uri: String,
}

impl WorkspaceNodeLink {
    /// A link from `parent` to `child` recorded under `child_uri`.
    pub fn new(
        workspace_id: WorkspaceId,
        parent_node_id: WorkspaceNodeId,
        child_node_id: WorkspaceNodeId,
        child_uri: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id,
            parent_node_id,
            child_node_id,
            child_uri: child_uri.into(),
        }
    }
}
