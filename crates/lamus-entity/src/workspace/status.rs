//! Workspace lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workspace_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceStatus {
    /// Row exists but the import has not been scheduled.
    Uninitialised,
    /// The import task is running.
    Initialising,
    /// The import finished; the user can work.
    Initialised,
    /// The import failed; the workspace must be deleted.
    ErrorInitialising,
    /// Idle for a long time.
    Sleeping,
    /// Submitted back to the archive, waiting to be processed.
    Submitted,
    /// Changes are being moved into the archive.
    UpdatingArchive,
    /// Moving changes into the archive failed.
    ErrorUpdatingArchive,
    /// Changes are in the archive; the workspace is finished.
    DataMovedSuccess,
    /// Discarded by the user.
    Deleted,
}

impl WorkspaceStatus {
    /// Every status in declaration order.
    pub const ALL: [WorkspaceStatus; 10] = [
        Self::Uninitialised,
        Self::Initialising,
        Self::Initialised,
        Self::ErrorInitialising,
        Self::Sleeping,
        Self::Submitted,
        Self::UpdatingArchive,
        Self::ErrorUpdatingArchive,
        Self::DataMovedSuccess,
        Self::Deleted,
    ];

    /// Whether the workspace is finished and no longer covers archive nodes.
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::DataMovedSuccess | Self::Deleted)
    }

    /// Whether the workspace's archive subtree is still locked.
    pub fn holds_lock(&self) -> bool {
        !self.is_terminated()
    }

    /// Whether an import failure left the workspace unusable.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ErrorInitialising | Self::ErrorUpdatingArchive)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialised => "uninitialised",
            Self::Initialising => "initialising",
            Self::Initialised => "initialised",
            Self::ErrorInitialising => "error_initialising",
            Self::Sleeping => "sleeping",
            Self::Submitted => "submitted",
            Self::UpdatingArchive => "updating_archive",
            Self::ErrorUpdatingArchive => "error_updating_archive",
            Self::DataMovedSuccess => "data_moved_success",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
