//! Workspace node entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lamus_core::types::id::{WorkspaceId, WorkspaceNodeId};

use super::kind::WorkspaceNodeType;
use super::status::WorkspaceNodeStatus;

/// A metadata document or resource inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WorkspaceNode {
    /// Unique node identifier.
    pub id: WorkspaceNodeId,
    /// The workspace owning the node.
    pub workspace_id: WorkspaceId,
    /// Archive URI of the node (None for nodes that never were archived).
    pub archive_uri: Option<String>,
    /// URL of the node's content in the archive.
    pub archive_url: Option<String>,
    /// URL of the node's copy inside the workspace.
    pub workspace_url: Option<String>,
    /// Display name.
    pub name: String,
    /// Optional title.
    pub title: Option<String>,
    /// Semantic type.
    pub node_type: WorkspaceNodeType,
    /// Mimetype.
    pub format: Option<String>,
    /// Profile schema of metadata documents.
    pub profile_schema_uri: Option<String>,
    /// Lifecycle status.
    pub status: WorkspaceNodeStatus,
    /// Persistent identifier.
    pub pid: Option<String>,
    /// Whether the user may not modify the node.
    pub protected: bool,
}

impl WorkspaceNode {
    /// A new node with no archive or workspace location yet.
    pub fn new(
        workspace_id: WorkspaceId,
        name: impl Into<String>,
        node_type: WorkspaceNodeType,
        status: WorkspaceNodeStatus,
    ) -> Self {
        Self {
            id: WorkspaceNodeId::new(),
            workspace_id,
            archive_uri: None,
            archive_url: None,
            workspace_url: None,
            name: name.into(),
            title: None,
            node_type,
            format: None,
            profile_schema_uri: None,
            status,
            pid: None,
            protected: false,
        }
    }

    /// Whether the node is a metadata document.
    pub fn is_metadata(&self) -> bool {
        self.node_type.is_metadata()
    }

    /// Whether the node has a copy inside the workspace.
    pub fn is_materialized(&self) -> bool {
        self.workspace_url.is_some()
    }

    /// The URL other documents should use to reference this node.
    pub fn reference_url(&self) -> Option<&str> {
        self.workspace_url
            .as_deref()
            .or(self.archive_url.as_deref())
            .or(self.archive_uri.as_deref())
    }
}
