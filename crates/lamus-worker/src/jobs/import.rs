//! Workspace import job: imports the top node tree, then the orphans.

use serde::{Deserialize, Serialize};

use lamus_core::error::AppError;
use lamus_core::result::AppResult;
use lamus_core::types::id::WorkspaceId;
use lamus_entity::{ImportProblem, Workspace, WorkspaceNode, WorkspaceStatus};
use lamus_service::{ImportServices, MetadataNodeImporter, NodeImporter, OrphanNodesImportHandler};

/// Message stored on a workspace whose import succeeded.
pub const INITIALISED_MESSAGE: &str = "Workspace successfully initialised";

/// Outcome of a successful import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// The imported workspace
    pub workspace_id: WorkspaceId,
    /// Node created for the workspace's top archive node
    pub top_node: WorkspaceNode,
    /// Orphan files that could not be imported
    pub problems: Vec<ImportProblem>,
}

/// Runs the import of one workspace.
///
/// Both [`WorkspaceImportRunner::workspace`] and
/// [`WorkspaceImportRunner::top_node`] must be set before
/// [`WorkspaceImportRunner::run`].
#[derive(Debug, Clone)]
pub struct WorkspaceImportRunner {
    /// Import collaborators
    services: ImportServices,
    /// Workspace to import into
    workspace: Option<Workspace>,
    /// Archive URI of the node to import
    top_node_uri: Option<String>,
}

impl WorkspaceImportRunner {
    /// Create a runner with nothing to import yet
    pub fn new(services: ImportServices) -> Self {
        Self {
            services,
            workspace: None,
            top_node_uri: None,
        }
    }

    /// Set the workspace to import into
    pub fn workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Set the archive node to import
    pub fn top_node(mut self, archive_uri: impl Into<String>) -> Self {
        self.top_node_uri = Some(archive_uri.into());
        self
    }

    /// Import the top node tree and the orphans, then record the final status.
    ///
    /// On failure the workspace is marked `error_initialising` and the
    /// original error is returned.
    pub async fn run(self) -> AppResult<ImportReport> {
        let mut workspace = self
            .workspace
            .ok_or_else(|| AppError::precondition("Workspace not set in import runner"))?;
        let top_node_uri = self
            .top_node_uri
            .ok_or_else(|| AppError::precondition("Top node not set in import runner"))?;

        tracing::info!(
            workspace_id = %workspace.id,
            node_uri = %top_node_uri,
            "Starting workspace import"
        );

        workspace.top_node_archive_uri = Some(top_node_uri);
        match Self::import(&self.services, &workspace).await {
            Ok(report) => {
                tracing::info!(
                    workspace_id = %workspace.id,
                    problems = report.problems.len(),
                    "Workspace import finished"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(workspace_id = %workspace.id, error = %e.chain(), "Workspace import failed");
                let message = format!("Error during initialisation of workspace: {e}");
                if let Err(status_err) = self
                    .services
                    .dao
                    .update_workspace_status(workspace.id, WorkspaceStatus::ErrorInitialising, &message)
                    .await
                {
                    tracing::error!(
                        workspace_id = %workspace.id,
                        error = %status_err,
                        "Failed to record import failure"
                    );
                }
                Err(e)
            }
        }
    }

    async fn import(services: &ImportServices, workspace: &Workspace) -> AppResult<ImportReport> {
        services.dao.update_workspace_top_node(workspace).await?;

        let importer = NodeImporter::Metadata(MetadataNodeImporter::new(services.clone()));
        let top_node = importer.import_node(Some(workspace), None, None, None).await?;

        services
            .dao
            .update_workspace_status(workspace.id, WorkspaceStatus::Initialised, INITIALISED_MESSAGE)
            .await?;
        let refreshed = services
            .dao
            .find_workspace(workspace.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workspace {} not found", workspace.id)))?;

        let problems = OrphanNodesImportHandler::new(services.clone())
            .explore_orphan_nodes(&refreshed)
            .await?;
        for problem in &problems {
            tracing::warn!(workspace_id = %workspace.id, problem = %problem, "Orphan file not imported");
        }

        Ok(ImportReport {
            workspace_id: workspace.id,
            top_node,
            problems,
        })
    }
}
