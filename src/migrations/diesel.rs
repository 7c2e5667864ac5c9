// Diesel migration runner for PostgreSQL
// Note: diesel_migrations requires sync connections, not async

use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use tracing::{debug, info};

use super::MigrationError;
use crate::db::diesel_pool::MIGRATIONS;

/// Run all pending Diesel migrations
/// Returns the number of migrations applied
pub async fn run_migrations(database_url: String) -> Result<usize, MigrationError> {
    info!("[DIESEL] Starting Diesel migration process...");

    // MigrationHarness is sync, so run on the blocking pool
    tokio::task::spawn_blocking(move || -> Result<usize, MigrationError> {
        debug!("[DIESEL] Establishing sync connection for migrations...");
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| MigrationError::Connection(e.to_string()))?;

        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| MigrationError::Migration(e.to_string()))?;
        if pending.is_empty() {
            debug!("[DIESEL] No pending migrations found");
            return Ok(0);
        }
        info!("[DIESEL] Found {} pending migrations", pending.len());

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| MigrationError::Migration(e.to_string()))?;

        for migration in &applied {
            debug!("[DIESEL] Applied migration: {}", migration);
        }
        Ok(applied.len())
    })
    .await
    .map_err(|e| MigrationError::TaskPanicked(e.to_string()))?
}
