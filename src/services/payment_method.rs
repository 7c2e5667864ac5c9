// Payment Method Store: per-user payment handles with ordering and referral metadata

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    AddPaymentMethodRequest, NewPaymentMethod, PaymentMethod, ReferralChangeset,
    UpdateReferralRequest,
};
use crate::services::handle_registry::{ProviderConfig, ReferralKind};
use crate::services::visibility::sort_for_display;
use crate::store::PaylinkStore;
use crate::utils::service_error::ServiceError;
use crate::utils::{normalize_handle, trim_optional_field};

#[derive(Clone)]
pub struct PaymentMethodService {
    store: Arc<dyn PaylinkStore>,
}

impl PaymentMethodService {
    pub fn new(store: Arc<dyn PaylinkStore>) -> Self {
        Self { store }
    }

    /// All of a user's methods in display order, PII included
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<PaymentMethod>, ServiceError> {
        let mut methods = self.store.list_payment_methods(user_id).await?;
        sort_for_display(&mut methods);
        Ok(methods)
    }

    /// Add a method at the end of the list.
    ///
    /// `is_pii` is copied from the registry now and stays fixed on the row.
    #[instrument(skip(self, request), fields(user_id = %user_id, provider = %request.provider))]
    pub async fn add(
        &self,
        user_id: Uuid,
        request: AddPaymentMethodRequest,
    ) -> Result<PaymentMethod, ServiceError> {
        request.validate()?;
        let handle = normalize_handle(&request.handle).map_err(ServiceError::ValidationError)?;
        let config = request.provider.config();

        let existing = self.store.list_payment_methods(user_id).await?;
        if existing
            .iter()
            .any(|m| m.provider == request.provider.as_str())
        {
            return Err(ServiceError::Conflict(format!(
                "A {} payment method already exists",
                config.name
            )));
        }

        let method = self
            .store
            .insert_payment_method(NewPaymentMethod {
                id: Uuid::new_v4(),
                user_id,
                provider: request.provider.as_str().to_string(),
                handle,
                display_order: existing.len() as i32,
                is_pii: config.is_pii,
                referral_code: None,
                referral_enabled: false,
                created_at: Utc::now(),
            })
            .await?;

        info!("Added payment method {}", method.id);
        Ok(method)
    }

    /// Hard delete; the method disappears from any ephemeral link it was on
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, method_id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_payment_method(user_id, method_id).await? {
            return Err(ServiceError::NotFound);
        }
        info!("Removed payment method {}", method_id);
        Ok(())
    }

    /// Set or clear the referral code and its enabled flag
    #[instrument(skip(self, request))]
    pub async fn update_referral(
        &self,
        user_id: Uuid,
        method_id: Uuid,
        request: UpdateReferralRequest,
    ) -> Result<PaymentMethod, ServiceError> {
        request.validate()?;

        let method = self
            .store
            .list_payment_methods(user_id)
            .await?
            .into_iter()
            .find(|m| m.id == method_id)
            .ok_or(ServiceError::NotFound)?;

        let config = method.provider_config().ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown payment provider: {}", method.provider))
        })?;

        let changes = referral_changes(
            config,
            trim_optional_field(request.referral_code.as_ref()),
            request.referral_enabled,
        )
        .map_err(ServiceError::ValidationError)?;

        let updated = self
            .store
            .update_referral(user_id, method_id, changes)
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(
            "Updated referral for payment method {} (enabled: {})",
            method_id, updated.referral_enabled
        );
        Ok(updated)
    }
}

/// Referral invariant: `enabled` implies a non-empty code, and codes are only
/// accepted for providers that run a referral program.
pub fn referral_changes(
    config: &ProviderConfig,
    code: Option<String>,
    enabled: bool,
) -> Result<ReferralChangeset, String> {
    let Some(code) = code else {
        if enabled {
            return Err("Referral cannot be enabled without a referral code".to_string());
        }
        return Ok(ReferralChangeset {
            referral_code: None,
            referral_enabled: false,
        });
    };

    let program = config
        .referral
        .ok_or_else(|| format!("{} does not have a referral program", config.name))?;

    if program.kind == ReferralKind::Link {
        let is_web_url = url::Url::parse(&code)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !is_web_url {
            return Err(format!("{} referrals must be an http(s) invite link", config.name));
        }
    }

    Ok(ReferralChangeset {
        referral_code: Some(code),
        referral_enabled: enabled,
    })
}
