// Authentication middleware for the dashboard API
// Validates bearer tokens, provisions the user row, and injects AuthenticatedUser into extensions

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;

/// Where unauthenticated dashboard clients are sent
pub const LOGIN_URL: &str = "/login";

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": message,
            "status": StatusCode::UNAUTHORIZED.as_u16(),
            "login_url": LOGIN_URL
        })),
    )
        .into_response()
}

/// Middleware function that validates bearer tokens and adds AuthenticatedUser to extensions
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized("Missing or invalid authorization header"),
    };

    let auth_user = match app_state.auth.verify(token) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Bearer token rejected: {}", e);
            return unauthorized("Invalid or expired token");
        },
    };

    // First authenticated request creates the user row
    if let Err(e) = app_state
        .users
        .ensure_user(auth_user.user_id, auth_user.email.clone())
        .await
    {
        return e.into_response();
    }

    request.extensions_mut().insert(auth_user);
    next.run(request).await
}
