// Library exports for the payment link backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, StoreBackend};
pub use db::DieselPool;
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use store::{DieselStore, InMemoryStore, PaylinkStore, StoreError};
pub use utils::ServiceError;

/// Build the application state for the configured store backend,
/// running embedded migrations first when they apply.
pub async fn initialize_app_state(
    config: AppConfig,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store: Arc<dyn PaylinkStore> = match config.store_backend {
        StoreBackend::Postgres => {
            if migrations::should_run_migrations(&config) {
                info!("Running embedded migrations...");
                migrations::run_all_migrations(&config).await?;
            }

            info!("Initializing database pool...");
            let pool =
                db::create_diesel_pool(db::DieselDatabaseConfig::from_app_config(&config)).await?;
            Arc::new(DieselStore::new(pool))
        },
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        },
    };

    Ok(AppState::new(config, store))
}

/// Router with tracing and CORS layers applied
pub fn build_app(state: AppState) -> axum::Router {
    handlers::create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
