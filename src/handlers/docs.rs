// OpenAPI document for the dashboard API

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::app::AppState;
use crate::handlers::{dashboard, health};
use crate::models::{
    AddPaymentMethodRequest, CreateEphemeralLinkRequest, EphemeralLinkResponse, LinkValidity,
    PageViewStats, PaymentMethodResponse, ProfileResponse, SetupUsernameRequest,
    UpdateReferralRequest, UsernameAvailability,
};
use crate::services::handle_registry::{ProviderInfo, ProviderType, ReferralKind};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cheddar Backend API",
        description = "Payment link aggregator: public pay pages and the dashboard API behind them",
        version = "1.0.0"
    ),
    paths(
        health::health_check,
        health::list_providers,
        dashboard::get_profile,
        dashboard::setup_username,
        dashboard::check_username,
        dashboard::list_payment_methods,
        dashboard::add_payment_method,
        dashboard::remove_payment_method,
        dashboard::update_referral,
        dashboard::list_ephemeral_links,
        dashboard::create_ephemeral_link,
        dashboard::get_stats,
        dashboard::get_dashboard,
    ),
    components(schemas(
        AddPaymentMethodRequest,
        CreateEphemeralLinkRequest,
        dashboard::DashboardResponse,
        EphemeralLinkResponse,
        LinkValidity,
        PageViewStats,
        PaymentMethodResponse,
        ProfileResponse,
        ProviderInfo,
        ProviderType,
        ReferralKind,
        SetupUsernameRequest,
        UpdateReferralRequest,
        UsernameAvailability,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Profile", description = "Username setup and profile"),
        (name = "Payment Methods", description = "Payment handle management"),
        (name = "Ephemeral Links", description = "Short-lived private pay links"),
        (name = "Analytics", description = "Page view counts")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document
/// GET /api/v1/openapi.json
pub async fn serve_openapi_spec(State(state): State<AppState>) -> impl IntoResponse {
    if !state.config.enable_openapi {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(ApiDoc::openapi()).into_response()
}
