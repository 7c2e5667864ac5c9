// HTTP handlers and route builders

pub mod dashboard;
pub mod docs;
pub mod health;
pub mod pay_pages;

use crate::{app::AppState, middleware::auth_middleware};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

// Dashboard routes (authenticated)
pub fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(dashboard::get_profile))
        .route("/me/username", post(dashboard::setup_username))
        .route(
            "/usernames/{username}/availability",
            get(dashboard::check_username),
        )
        .route(
            "/payment-methods",
            get(dashboard::list_payment_methods).post(dashboard::add_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            delete(dashboard::remove_payment_method),
        )
        .route(
            "/payment-methods/{id}/referral",
            put(dashboard::update_referral),
        )
        .route(
            "/ephemeral-links",
            get(dashboard::list_ephemeral_links).post(dashboard::create_ephemeral_link),
        )
        .route("/stats", get(dashboard::get_stats))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

// Public API routes
pub fn public_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/providers", get(health::list_providers))
        .route("/openapi.json", get(docs::serve_openapi_spec))
}

// Pay pages live at the root: /{username} and /{username}/{slug}
pub fn pay_page_routes() -> Router<AppState> {
    Router::new()
        .route("/{username}", get(pay_pages::persistent_page))
        .route("/{username}/{slug}", get(pay_pages::ephemeral_page))
}

/// Complete application router without transport layers
pub fn create_router(state: AppState) -> Router {
    let api = public_api_routes().merge(dashboard_routes(state.clone()));

    Router::new()
        .nest("/api/v1", api)
        .merge(pay_page_routes())
        .with_state(state)
}
