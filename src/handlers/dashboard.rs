// Dashboard API: profile setup, payment methods, ephemeral links and analytics
// Every route here sits behind auth_middleware

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::{
        AddPaymentMethodRequest, CreateEphemeralLinkRequest, EphemeralLinkResponse,
        PageViewStats, PaymentMethodResponse, ProfileResponse, SetupUsernameRequest,
        UpdateReferralRequest, UsernameAvailability,
    },
    utils::service_error::ServiceError,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub profile: ProfileResponse,
    pub payment_methods: Vec<PaymentMethodResponse>,
    pub ephemeral_links: Vec<EphemeralLinkResponse>,
    pub stats: PageViewStats,
}

// =============================================================================
// PROFILE
// =============================================================================

/// Current user's profile
/// GET /api/v1/me
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>, ServiceError> {
    let user = state.users.get(auth_user.user_id).await?;
    Ok(Json(user.to_profile(&state.config.base_url)))
}

/// Claim a username (one time)
/// POST /api/v1/me/username
#[utoipa::path(
    post,
    path = "/api/v1/me/username",
    tag = "Profile",
    request_body = SetupUsernameRequest,
    responses(
        (status = 200, description = "Username set", body = ProfileResponse),
        (status = 400, description = "Bad request - invalid username"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 409, description = "Conflict - username taken or already set")
    ),
    security(("bearerAuth" = []))
)]
pub async fn setup_username(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<SetupUsernameRequest>,
) -> Result<Json<ProfileResponse>, ServiceError> {
    let user = state
        .users
        .setup_username(auth_user.user_id, request)
        .await?;
    Ok(Json(user.to_profile(&state.config.base_url)))
}

/// Check whether a username can be claimed
/// GET /api/v1/usernames/{username}/availability
#[utoipa::path(
    get,
    path = "/api/v1/usernames/{username}/availability",
    tag = "Profile",
    params(("username" = String, Path, description = "Desired username")),
    responses(
        (status = 200, description = "Availability", body = UsernameAvailability),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn check_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UsernameAvailability>, ServiceError> {
    Ok(Json(state.users.check_availability(&username).await?))
}

// =============================================================================
// PAYMENT METHODS
// =============================================================================

/// List payment methods, PII included, in display order
/// GET /api/v1/payment-methods
#[utoipa::path(
    get,
    path = "/api/v1/payment-methods",
    tag = "Payment Methods",
    responses(
        (status = 200, description = "Payment methods", body = [PaymentMethodResponse]),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_payment_methods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<PaymentMethodResponse>>, ServiceError> {
    let methods = state.payment_methods.list(auth_user.user_id).await?;
    Ok(Json(methods.iter().map(PaymentMethodResponse::from).collect()))
}

/// Add a payment method
/// POST /api/v1/payment-methods
#[utoipa::path(
    post,
    path = "/api/v1/payment-methods",
    tag = "Payment Methods",
    request_body = AddPaymentMethodRequest,
    responses(
        (status = 201, description = "Payment method added", body = PaymentMethodResponse),
        (status = 400, description = "Bad request - validation failed"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 409, description = "Conflict - provider already added")
    ),
    security(("bearerAuth" = []))
)]
pub async fn add_payment_method(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<AddPaymentMethodRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let method = state
        .payment_methods
        .add(auth_user.user_id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentMethodResponse::from(&method)),
    ))
}

/// Remove a payment method
/// DELETE /api/v1/payment-methods/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/payment-methods/{id}",
    tag = "Payment Methods",
    params(("id" = Uuid, Path, description = "Payment method id")),
    responses(
        (status = 204, description = "Payment method removed"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Payment method not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn remove_payment_method(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(method_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .payment_methods
        .remove(auth_user.user_id, method_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set or clear a referral code
/// PUT /api/v1/payment-methods/{id}/referral
#[utoipa::path(
    put,
    path = "/api/v1/payment-methods/{id}/referral",
    tag = "Payment Methods",
    params(("id" = Uuid, Path, description = "Payment method id")),
    request_body = UpdateReferralRequest,
    responses(
        (status = 200, description = "Referral updated", body = PaymentMethodResponse),
        (status = 400, description = "Bad request - referral rules violated"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Payment method not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_referral(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(method_id): Path<Uuid>,
    Json(request): Json<UpdateReferralRequest>,
) -> Result<Json<PaymentMethodResponse>, ServiceError> {
    let method = state
        .payment_methods
        .update_referral(auth_user.user_id, method_id, request)
        .await?;
    Ok(Json(PaymentMethodResponse::from(&method)))
}

// =============================================================================
// EPHEMERAL LINKS
// =============================================================================

/// Recent ephemeral links, newest first
/// GET /api/v1/ephemeral-links
#[utoipa::path(
    get,
    path = "/api/v1/ephemeral-links",
    tag = "Ephemeral Links",
    responses(
        (status = 200, description = "Recent links", body = [EphemeralLinkResponse]),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_ephemeral_links(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<EphemeralLinkResponse>>, ServiceError> {
    let user = state.users.get(auth_user.user_id).await?;
    let links = state
        .links
        .list_recent(user.id, user.username.as_deref())
        .await?;
    Ok(Json(links))
}

/// Create an ephemeral link over some of the caller's payment methods
/// POST /api/v1/ephemeral-links
#[utoipa::path(
    post,
    path = "/api/v1/ephemeral-links",
    tag = "Ephemeral Links",
    request_body = CreateEphemeralLinkRequest,
    responses(
        (status = 201, description = "Link created", body = EphemeralLinkResponse),
        (status = 400, description = "Bad request - no methods selected or username missing"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 409, description = "Conflict - slug collision")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_ephemeral_link(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateEphemeralLinkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.users.get(auth_user.user_id).await?;
    let username = user.username.ok_or_else(|| {
        ServiceError::ValidationError("Set up a username before creating links".to_string())
    })?;

    let link = state.links.create(user.id, request).await?;
    let share_url = state.links.share_url(&username, &link.slug);
    Ok((
        StatusCode::CREATED,
        Json(link.to_response(share_url, Utc::now())),
    ))
}

// =============================================================================
// ANALYTICS
// =============================================================================

/// Page view totals
/// GET /api/v1/stats
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Analytics",
    responses(
        (status = 200, description = "Page view totals", body = PageViewStats),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<PageViewStats>, ServiceError> {
    Ok(Json(
        state.views.stats(auth_user.user_id, Utc::now()).await?,
    ))
}

/// Everything the dashboard home shows in one call
/// GET /api/v1/dashboard
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Analytics",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardResponse>, ServiceError> {
    let user = state.users.get(auth_user.user_id).await?;
    let methods = state.payment_methods.list(user.id).await?;
    let links = state
        .links
        .list_recent(user.id, user.username.as_deref())
        .await?;
    let stats = state.views.stats(user.id, Utc::now()).await?;

    Ok(Json(DashboardResponse {
        profile: user.to_profile(&state.config.base_url),
        payment_methods: methods.iter().map(PaymentMethodResponse::from).collect(),
        ephemeral_links: links,
        stats,
    }))
}
