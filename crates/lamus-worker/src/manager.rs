//! Workspace manager: admits new workspaces and schedules their import.

use tokio::task::JoinHandle;

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_core::traits::ArchiveNodeKind;
use lamus_entity::{Workspace, WorkspaceStatus};
use lamus_service::{ImportServices, PreLockGuard};

use crate::executor::TaskExecutor;
use crate::jobs::{ImportReport, WorkspaceImportRunner};

/// A workspace that was admitted and whose import is running.
#[derive(Debug)]
pub struct CreatedWorkspace {
    /// The workspace as stored, status `initialising`
    pub workspace: Workspace,
    /// Handle of the background import
    pub import: JoinHandle<AppResult<ImportReport>>,
}

/// Entry point for creating workspaces.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    /// Import collaborators
    services: ImportServices,
    /// Overlap check
    guard: PreLockGuard,
    /// Background import executor
    executor: TaskExecutor,
}

impl WorkspaceManager {
    /// Create a manager
    pub fn new(services: ImportServices, executor: TaskExecutor) -> Self {
        let guard = PreLockGuard::new(services.dao.clone(), services.tree());
        Self {
            services,
            guard,
            executor,
        }
    }

    /// The pre-lock guard used by this manager
    pub fn guard(&self) -> &PreLockGuard {
        &self.guard
    }

    /// Create a workspace for `user_id` over the archive node and start importing it.
    ///
    /// Fails with `PreLocked` if the node overlaps an open workspace. The
    /// import itself runs in the background; its failure is reported through
    /// the returned handle and the workspace status.
    pub async fn create_and_import_workspace(
        &self,
        user_id: &str,
        archive_node_uri: &str,
    ) -> AppResult<CreatedWorkspace> {
        if user_id.trim().is_empty() {
            return Err(AppError::validation("User ID must not be empty"));
        }

        let node = self
            .services
            .archive
            .node(archive_node_uri)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Archive node {archive_node_uri} not found"))
                    .with_node(archive_node_uri)
            })?;
        if node.kind != ArchiveNodeKind::Metadata {
            return Err(AppError::validation(format!(
                "Archive node {archive_node_uri} is not a metadata node"
            ))
            .with_node(archive_node_uri));
        }

        self.guard.ensure_not_locked(Some(archive_node_uri)).await?;

        let top_node_uri = node.preferred_uri().to_string();
        let mut workspace = Workspace::new(
            user_id,
            self.services.paths.config().max_storage_space_bytes,
        );
        workspace.status = WorkspaceStatus::Initialising;
        workspace.message = "Workspace initialising".to_string();
        workspace.top_node_archive_uri = Some(top_node_uri.clone());
        workspace.top_node_archive_url = self.services.archive.resolve_url(&node.uri).await?;

        let lock_uris = self.guard.lock_closure(archive_node_uri).await?;
        let workspace = self
            .services
            .dao
            .create_workspace(&workspace, &lock_uris)
            .await?;
        tracing::info!(
            workspace_id = %workspace.id,
            user_id = %user_id,
            node_uri = %top_node_uri,
            "Workspace created"
        );

        let directory = self.services.paths.workspace_directory(workspace.id);
        if let Err(e) = self.services.files.create_directory(&directory).await {
            let message = format!("Error creating workspace directory: {e}");
            self.services
                .dao
                .update_workspace_status(workspace.id, WorkspaceStatus::ErrorInitialising, &message)
                .await?;
            return Err(AppError::workspace(
                workspace.id,
                "Failed to create workspace directory",
                e,
            ));
        }

        let runner = WorkspaceImportRunner::new(self.services.clone())
            .workspace(workspace.clone())
            .top_node(top_node_uri);
        let import = self.executor.submit("workspace-import", runner.run());

        Ok(CreatedWorkspace { workspace, import })
    }
}
