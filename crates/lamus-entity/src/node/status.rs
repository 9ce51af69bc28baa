//! Workspace node lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a workspace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workspace_node_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceNodeStatus {
    /// Copied from the archive, unchanged.
    ArchiveCopy,
    /// Newly created in the workspace (upload or orphan).
    Uploaded,
    /// Known but not yet materialized in the workspace.
    Virtual,
    /// Lives outside the archive; only referenced by URL.
    External,
    /// Removed from the workspace tree; the row is kept.
    Deleted,
}

impl WorkspaceNodeStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArchiveCopy => "archive_copy",
            Self::Uploaded => "uploaded",
            Self::Virtual => "virtual",
            Self::External => "external",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for WorkspaceNodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
