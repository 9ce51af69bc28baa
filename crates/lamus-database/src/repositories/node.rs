//! Workspace node repository implementation.

use sqlx::PgPool;

use lamus_core::error::{AppError, ErrorKind};
use lamus_core::result::AppResult;
use lamus_core::types::id::{WorkspaceId, WorkspaceNodeId};
use lamus_entity::{WorkspaceNode, WorkspaceNodeStatus};

/// Repository for workspace node rows.
#[derive(Debug, Clone)]
pub struct NodeRepository {
    pool: PgPool,
}

impl NodeRepository {
    /// Create a new node repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a node.
    pub async fn create(&self, node: &WorkspaceNode) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO workspace_nodes (id, workspace_id, archive_uri, archive_url, \
             workspace_url, name, title, node_type, format, profile_schema_uri, status, pid, \
             protected) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(node.id)
        .bind(node.workspace_id)
        .bind(&node.archive_uri)
        .bind(&node.archive_url)
        .bind(&node.workspace_url)
        .bind(&node.name)
        .bind(&node.title)
        .bind(node.node_type)
        .bind(&node.format)
        .bind(&node.profile_schema_uri)
        .bind(node.status)
        .bind(&node.pid)
        .bind(node.protected)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("workspace_nodes_pkey") =>
            {
                AppError::conflict(format!("Workspace node {} already exists", node.id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create workspace node", e),
        })?;
        Ok(())
    }

    /// Find a node by ID.
    pub async fn find_by_id(&self, id: WorkspaceNodeId) -> AppResult<Option<WorkspaceNode>> {
        sqlx::query_as::<_, WorkspaceNode>("SELECT * FROM workspace_nodes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find workspace node", e)
            })
    }

    /// Set the workspace URL of a node.
    pub async fn update_workspace_url(&self, id: WorkspaceNodeId, url: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE workspace_nodes SET workspace_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update workspace URL", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Workspace node {id} not found")));
        }
        Ok(())
    }

    /// Set the lifecycle status of a node.
    pub async fn update_status(
        &self,
        id: WorkspaceNodeId,
        status: WorkspaceNodeStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE workspace_nodes SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update node status", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Workspace node {id} not found")));
        }
        Ok(())
    }

    /// List the nodes of a workspace in insertion order.
    pub async fn find_by_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Vec<WorkspaceNode>> {
        sqlx::query_as::<_, WorkspaceNode>(
            "SELECT * FROM workspace_nodes WHERE workspace_id = $1 ORDER BY seq ASC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list workspace nodes", e))
    }

    /// Find the first node whose archive or workspace URL equals `url`.
    pub async fn find_by_url(
        &self,
        workspace_id: WorkspaceId,
        url: &str,
    ) -> AppResult<Option<WorkspaceNode>> {
        sqlx::query_as::<_, WorkspaceNode>(
            "SELECT * FROM workspace_nodes WHERE workspace_id = $1 \
             AND (archive_url = $2 OR workspace_url = $2) ORDER BY seq ASC LIMIT 1",
        )
        .bind(workspace_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find workspace node by URL", e)
        })
    }
}
