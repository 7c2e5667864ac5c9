// Embedded schema migrations, applied at startup
// Embedded in the application binary so deployments need no migration tooling

pub mod diesel;

use thiserror::Error;
use tracing::{error, info};

use crate::app_config::{AppConfig, StoreBackend};

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to establish migration connection: {0}")]
    Connection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Migration task panicked: {0}")]
    TaskPanicked(String),
}

/// Check if migrations should run for this configuration
pub fn should_run_migrations(config: &AppConfig) -> bool {
    config.store_backend == StoreBackend::Postgres && !config.disable_embedded_migrations
}

/// Run pending migrations and report how many were applied
pub async fn run_all_migrations(config: &AppConfig) -> Result<usize, MigrationError> {
    info!(
        "[MIGRATIONS] Starting migration process for environment: {}",
        config.environment
    );

    match diesel::run_migrations(config.database_url.clone()).await {
        Ok(0) => {
            info!("[MIGRATIONS] Schema up to date");
            Ok(0)
        },
        Ok(applied) => {
            info!("[MIGRATIONS] Applied {} migrations", applied);
            Ok(applied)
        },
        Err(e) => {
            error!("[MIGRATIONS] Migration failed: {}", e);
            Err(e)
        },
    }
}
