// Payment method model: one provider handle owned by a user

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::payment_methods;
use crate::services::handle_registry::{ProviderConfig, ProviderType, ReferralKind};
use crate::utils::validation::{HANDLE_MAX_LENGTH, REFERRAL_CODE_MAX_LENGTH};

// =============================================================================
// DATABASE MODELS
// =============================================================================

/// Payment method row.
///
/// `is_pii` is captured from the registry when the row is written and never recomputed.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = payment_methods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub handle: String,
    pub display_order: i32,
    pub is_pii: bool,
    pub referral_code: Option<String>,
    pub referral_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Registry entry for the stored provider string, if it is still known
    pub fn provider_config(&self) -> Option<&'static ProviderConfig> {
        self.provider
            .parse::<ProviderType>()
            .ok()
            .map(|provider| provider.config())
    }

    /// Referral prompt shown to payers, when all three conditions hold:
    /// the provider runs a program, a code is stored, and it is enabled.
    pub fn referral_cta(&self) -> Option<ReferralCta> {
        let program = self.provider_config()?.referral?;
        let code = self.referral_code.as_deref().filter(|c| !c.is_empty())?;
        if !self.referral_enabled {
            return None;
        }
        Some(ReferralCta {
            kind: program.kind,
            code: code.to_string(),
            signup_url: program.signup_url.to_string(),
        })
    }
}

/// New payment method for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_methods)]
pub struct NewPaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub handle: String,
    pub display_order: i32,
    pub is_pii: bool,
    pub referral_code: Option<String>,
    pub referral_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Referral changes applied to an existing row
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = payment_methods)]
#[diesel(treat_none_as_null = true)]
pub struct ReferralChangeset {
    pub referral_code: Option<String>,
    pub referral_enabled: bool,
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "provider": "venmo",
    "handle": "jane-doe"
}))]
pub struct AddPaymentMethodRequest {
    pub provider: ProviderType,

    #[validate(length(
        min = 1,
        max = "HANDLE_MAX_LENGTH",
        message = "Handle length is out of range"
    ))]
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "referral_code": "JANE5",
    "referral_enabled": true
}))]
pub struct UpdateReferralRequest {
    #[validate(length(max = "REFERRAL_CODE_MAX_LENGTH", message = "Referral code is too long"))]
    pub referral_code: Option<String>,

    #[serde(default)]
    pub referral_enabled: bool,
}

/// Referral prompt rendered under a provider button
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReferralCta {
    pub kind: ReferralKind,
    pub code: String,
    pub signup_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentMethodResponse {
    pub id: Uuid,
    pub provider: String,
    pub provider_name: String,
    pub handle: String,
    pub display_handle: String,
    pub display_order: i32,
    pub is_pii: bool,
    pub referral_code: Option<String>,
    pub referral_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&PaymentMethod> for PaymentMethodResponse {
    fn from(method: &PaymentMethod) -> Self {
        let config = method.provider_config();
        Self {
            id: method.id,
            provider: method.provider.clone(),
            provider_name: config
                .map(|c| c.name.to_string())
                .unwrap_or_else(|| method.provider.clone()),
            handle: method.handle.clone(),
            display_handle: config
                .map(|c| c.format_handle(&method.handle))
                .unwrap_or_else(|| method.handle.clone()),
            display_order: method.display_order,
            is_pii: method.is_pii,
            referral_code: method.referral_code.clone(),
            referral_enabled: method.referral_enabled,
            created_at: method.created_at,
        }
    }
}
