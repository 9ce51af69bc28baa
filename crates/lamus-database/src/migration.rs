//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use lamus_core::error::{AppError, ErrorKind};

/// Apply every pending migration from the repository's `migrations/` folder.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run workspace migrations: {e}"),
                e,
            )
        })?;

    info!("Workspace schema is up to date");
    Ok(())
}
