// Health check and provider registry endpoints (public)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;
use crate::services::handle_registry::{all_providers, ProviderInfo};

/// Health check
/// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (healthy, store_error) = match state.store.health_check().await {
        Ok(()) => (true, None),
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            (false, Some(e.to_string()))
        },
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "cheddar-backend",
        "timestamp": timestamp,
        "components": {
            "store": {
                "backend": format!("{:?}", state.config.store_backend).to_lowercase(),
                "status": if healthy { "healthy" } else { "unhealthy" },
                "error": store_error
            }
        }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Supported payment providers
/// GET /api/v1/providers
#[utoipa::path(
    get,
    path = "/api/v1/providers",
    tag = "Health",
    responses((status = 200, description = "Provider registry", body = [ProviderInfo]))
)]
pub async fn list_providers() -> Json<Vec<ProviderInfo>> {
    Json(all_providers().iter().map(ProviderInfo::from).collect())
}
