//! Embedded schema migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use learnhub_core::error::{AppError, ErrorKind};
use learnhub_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!(available = MIGRATOR.iter().count(), "Running database migrations");
    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Failed to run migrations: {e}"), e)
    })?;
    info!("Database migrations complete");
    Ok(())
}

/// Versions and descriptions of the embedded migrations.
pub fn embedded() -> Vec<(i64, String)> {
    MIGRATOR
        .iter()
        .map(|m| (m.version, m.description.to_string()))
        .collect()
}

/// Versions recorded as successfully applied in the target database.
pub async fn applied_versions(pool: &PgPool) -> AppResult<Vec<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, format!("Failed to read migration history: {e}"), e))
}
