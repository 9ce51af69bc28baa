//! Workspace entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lamus_core::types::id::{WorkspaceId, WorkspaceNodeId};

use super::status::WorkspaceStatus;

/// A user's isolated working copy of an archive subtree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workspace {
    /// Unique workspace identifier.
    pub id: WorkspaceId,
    /// The user who owns the workspace.
    pub user_id: String,
    /// Workspace node imported for the top archive node (set by the import).
    pub top_node_id: Option<WorkspaceNodeId>,
    /// Archive URI of the node the workspace was created on.
    pub top_node_archive_uri: Option<String>,
    /// Archive URL of the top node.
    pub top_node_archive_url: Option<String>,
    /// When the workspace was created.
    pub start_date: DateTime<Utc>,
    /// When the workspace was closed.
    pub end_date: Option<DateTime<Utc>>,
    /// When the current editing session started.
    pub session_start_date: DateTime<Utc>,
    /// When the last editing session ended.
    pub session_end_date: Option<DateTime<Utc>>,
    /// Bytes currently used by the workspace.
    pub used_storage_space: i64,
    /// Storage quota in bytes.
    pub max_storage_space: i64,
    /// Lifecycle status.
    pub status: WorkspaceStatus,
    /// Human-readable status message.
    pub message: String,
    /// Opaque information about the archive the workspace came from.
    pub archive_info: Option<String>,
}

impl Workspace {
    /// A fresh workspace for `user_id`, about to be imported.
    pub fn new(user_id: impl Into<String>, max_storage_space: i64) -> Self {
        let now = Utc::now();
        Self {
            id: WorkspaceId::new(),
            user_id: user_id.into(),
            top_node_id: None,
            top_node_archive_uri: None,
            top_node_archive_url: None,
            start_date: now,
            end_date: None,
            session_start_date: now,
            session_end_date: None,
            used_storage_space: 0,
            max_storage_space,
            status: WorkspaceStatus::Uninitialised,
            message: String::new(),
            archive_info: None,
        }
    }

    /// Bytes left before the quota is reached.
    pub fn remaining_storage_space(&self) -> i64 {
        (self.max_storage_space - self.used_storage_space).max(0)
    }
}
