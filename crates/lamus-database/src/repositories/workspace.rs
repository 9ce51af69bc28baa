//! Workspace and locked-node repository implementation.

use sqlx::PgPool;
use tracing::debug;

use lamus_core::error::{AppError, ErrorKind};
use lamus_core::result::AppResult;
use lamus_core::types::id::WorkspaceId;
use lamus_entity::{Workspace, WorkspaceStatus};

/// Key of the transaction-scoped advisory lock serializing workspace creation.
const CREATE_WORKSPACE_LOCK_KEY: i64 = 0x4c41_4d55_5301;

/// Repository for workspace rows and the archive nodes they lock.
#[derive(Debug, Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    /// Create a new workspace repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a workspace by ID.
    pub async fn find_by_id(&self, id: WorkspaceId) -> AppResult<Option<Workspace>> {
        sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find workspace", e))
    }

    /// Whether any of `uris` is locked by a workspace that is not finished.
    pub async fn is_any_locked(&self, uris: &[String]) -> AppResult<bool> {
        if uris.is_empty() {
            return Ok(false);
        }
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM locked_nodes l \
                INNER JOIN workspaces w ON w.id = l.workspace_id \
                WHERE l.archive_uri = ANY($1) \
                AND w.status NOT IN ('data_moved_success', 'deleted') \
             )",
        )
        .bind(uris)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check locked nodes", e))
    }

    /// Insert a workspace and lock its top node, unless `lock_uris` overlaps
    /// a live workspace.
    ///
    /// Concurrent creations queue on a transaction-scoped advisory lock, so
    /// the overlap check and the insert cannot interleave.
    pub async fn create_locked(
        &self,
        workspace: &Workspace,
        lock_uris: &[String],
    ) -> AppResult<Workspace> {
        let db_error = |msg: &'static str| {
            move |e: sqlx::Error| AppError::with_source(ErrorKind::Database, msg, e)
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin workspace transaction"))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(CREATE_WORKSPACE_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to acquire workspace creation lock"))?;

        let swept = sqlx::query(
            "DELETE FROM locked_nodes l USING workspaces w \
             WHERE w.id = l.workspace_id \
             AND w.status IN ('data_moved_success', 'deleted')",
        )
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to release finished workspace locks"))?;
        if swept.rows_affected() > 0 {
            debug!(released = swept.rows_affected(), "Released locks of finished workspaces");
        }

        let locked_uri = sqlx::query_scalar::<_, String>(
            "SELECT l.archive_uri FROM locked_nodes l \
             INNER JOIN workspaces w ON w.id = l.workspace_id \
             WHERE l.archive_uri = ANY($1) \
             AND w.status NOT IN ('data_moved_success', 'deleted') \
             LIMIT 1",
        )
        .bind(lock_uris)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to check locked nodes"))?;

        if let Some(uri) = locked_uri {
            // Dropping the transaction rolls it back and releases the advisory lock.
            return Err(AppError::pre_locked(uri));
        }

        let created = sqlx::query_as::<_, Workspace>(
            "INSERT INTO workspaces (id, user_id, top_node_id, top_node_archive_uri, \
             top_node_archive_url, start_date, end_date, session_start_date, session_end_date, \
             used_storage_space, max_storage_space, status, message, archive_info) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
        )
        .bind(workspace.id)
        .bind(&workspace.user_id)
        .bind(workspace.top_node_id)
        .bind(&workspace.top_node_archive_uri)
        .bind(&workspace.top_node_archive_url)
        .bind(workspace.start_date)
        .bind(workspace.end_date)
        .bind(workspace.session_start_date)
        .bind(workspace.session_end_date)
        .bind(workspace.used_storage_space)
        .bind(workspace.max_storage_space)
        .bind(workspace.status)
        .bind(&workspace.message)
        .bind(&workspace.archive_info)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("workspaces_pkey") => {
                AppError::conflict(format!("Workspace {} already exists", workspace.id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create workspace", e),
        })?;

        if let Some(uri) = &workspace.top_node_archive_uri {
            sqlx::query("INSERT INTO locked_nodes (archive_uri, workspace_id) VALUES ($1, $2)")
                .bind(uri)
                .bind(workspace.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db_err)
                        if db_err.constraint() == Some("locked_nodes_pkey") =>
                    {
                        AppError::pre_locked(uri.clone())
                    }
                    _ => AppError::with_source(ErrorKind::Database, "Failed to lock top node", e),
                })?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit workspace transaction"))?;

        Ok(created)
    }

    /// Update the top node columns.
    pub async fn update_top_node(&self, workspace: &Workspace) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE workspaces SET top_node_id = $2, top_node_archive_uri = $3, \
             top_node_archive_url = $4 WHERE id = $1",
        )
        .bind(workspace.id)
        .bind(workspace.top_node_id)
        .bind(&workspace.top_node_archive_uri)
        .bind(&workspace.top_node_archive_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update workspace top node", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Workspace {} not found",
                workspace.id
            )));
        }
        Ok(())
    }

    /// Update the status and message.
    pub async fn update_status(
        &self,
        id: WorkspaceId,
        status: WorkspaceStatus,
        message: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE workspaces SET status = $2, message = $3, \
             end_date = CASE WHEN $4 THEN COALESCE(end_date, NOW()) ELSE end_date END \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(message)
        .bind(status.is_terminated())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update workspace status", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Workspace {id} not found")));
        }
        Ok(())
    }
}
