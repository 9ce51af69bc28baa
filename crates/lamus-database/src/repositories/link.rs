//! Workspace node link repository implementation.

use sqlx::PgPool;

use lamus_core::error::{AppError, ErrorKind};
use lamus_core::result::AppResult;
use lamus_core::types::id::WorkspaceNodeId;
use lamus_entity::WorkspaceNodeLink;

/// Repository for parent to child links.
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    /// Create a new link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a link.
    pub async fn create(&self, link: &WorkspaceNodeLink) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO workspace_node_links (workspace_id, parent_node_id, child_node_id, \
             child_uri) VALUES ($1, $2, $3, $4)",
        )
        .bind(link.workspace_id)
        .bind(link.parent_node_id)
        .bind(link.child_node_id)
        .bind(&link.child_uri)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("workspace_node_links_pkey") =>
            {
                AppError::conflict(format!(
                    "Node {} is already linked to {}",
                    link.child_node_id, link.parent_node_id
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create node link", e),
        })?;
        Ok(())
    }

    /// Delete the link between two nodes.
    pub async fn delete(
        &self,
        parent_node_id: WorkspaceNodeId,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM workspace_node_links WHERE parent_node_id = $1 AND child_node_id = $2",
        )
        .bind(parent_node_id)
        .bind(child_node_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete node link", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// List the links of a parent in insertion order.
    pub async fn find_children(
        &self,
        parent_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>> {
        sqlx::query_as::<_, WorkspaceNodeLink>(
            "SELECT * FROM workspace_node_links WHERE parent_node_id = $1 ORDER BY seq ASC",
        )
        .bind(parent_node_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list node links", e))
    }

    /// List the links pointing at a child.
    pub async fn find_parents(
        &self,
        child_node_id: WorkspaceNodeId,
    ) -> AppResult<Vec<WorkspaceNodeLink>> {
        sqlx::query_as::<_, WorkspaceNodeLink>(
            "SELECT * FROM workspace_node_links WHERE child_node_id = $1 ORDER BY seq ASC",
        )
        .bind(child_node_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list parent links", e))
    }
}
