// Public pay page handlers
// GET /{username} and GET /{username}/{slug}

mod pages;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use tracing::{error, info};

use crate::{
    app::AppState,
    services::pay_page::PayPage,
    utils::service_error::ServiceError,
};

// =============================================================================
// PAY PAGE HANDLERS
// =============================================================================

/// Persistent page: public, non-PII methods only
/// GET /{username}
pub async fn persistent_page(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    let username = username.to_lowercase();
    let result = state.pay_pages.persistent(&username).await;
    render(result)
}

/// Ephemeral page: linked methods while the link is valid, expired presentation after
/// GET /{username}/{slug}
pub async fn ephemeral_page(
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
) -> Response {
    let username = username.to_lowercase();
    let result = state.pay_pages.ephemeral(&username, &slug, Utc::now()).await;
    render(result)
}

fn render(result: Result<PayPage, ServiceError>) -> Response {
    match result {
        Ok(PayPage::Persistent(page)) => {
            let mut response = Html(pages::persistent_page(&page)).into_response();
            response.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=60"),
            );
            response
        },
        Ok(PayPage::Ephemeral(page)) => {
            private(Html(pages::ephemeral_page(&page)).into_response())
        },
        // The slug existed, so this is a page of its own and not a 404
        Ok(PayPage::Expired(page)) => {
            info!("Serving expired presentation for {}", page.username);
            private((StatusCode::OK, Html(pages::expired_page(&page))).into_response())
        },
        Err(ServiceError::NotFound) => {
            (StatusCode::NOT_FOUND, Html(pages::not_found_page())).into_response()
        },
        Err(e) => {
            error!("Pay page render failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(pages::unavailable_page()),
            )
                .into_response()
        },
    }
}

fn private(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::HeaderName::from_static("x-robots-tag"),
        HeaderValue::from_static("noindex, nofollow"),
    );
    response
}
