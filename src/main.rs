use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cheddar_backend_core::{app_config::AppConfig, build_app, db, initialize_app_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cheddar_backend_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let bind_address = config.bind_address.clone();

    info!(
        "Starting payment link backend on {} ({}, {:?} store)",
        bind_address, config.environment, config.store_backend
    );
    if !config.database_url.is_empty() {
        info!("Database URL: {}", db::mask_connection_string(&config.database_url));
    }

    let state = initialize_app_state(config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize application state")?;

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Listening on {}", bind_address);
    axum::serve(listener, build_app(state))
        .await
        .context("Server error")?;

    Ok(())
}
