use std::time::Duration;

use rolewarden_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the grant store pool and applies pending migrations.
///
/// Event handlers hold a connection only for single statements, so a short
/// acquire timeout surfaces pool exhaustion as a store failure instead of a
/// stalled event task.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to grant store: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run grant store migrations: {error}")))?;

    info!(max_connections = MAX_CONNECTIONS, "grant store ready");

    Ok(pool)
}
