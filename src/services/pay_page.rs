// Pay page composition: validity, visibility and view accounting for one public render

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::{LinkValidity, PageType, PaymentMethod, ReferralCta, User};
use crate::services::ephemeral_link::EphemeralLinkService;
use crate::services::view_accounting::ViewAccounting;
use crate::services::visibility;
use crate::store::PaylinkStore;
use crate::utils::service_error::ServiceError;

/// One provider button on a pay page
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOption {
    pub provider: String,
    pub name: String,
    pub icon: String,
    pub display_handle: String,
    /// `None` for providers without a deep link; show the handle with a copy button
    pub url: Option<String>,
    pub is_pii: bool,
    pub referral: Option<ReferralCta>,
}

#[derive(Debug, Clone)]
pub struct PersistentPage {
    pub username: String,
    pub display_name: String,
    pub options: Vec<PaymentOption>,
}

#[derive(Debug, Clone)]
pub struct EphemeralPage {
    pub username: String,
    pub display_name: String,
    pub amount: Option<String>,
    pub memo: Option<String>,
    pub views_remaining: i32,
    pub expires_at: DateTime<Utc>,
    pub options: Vec<PaymentOption>,
}

#[derive(Debug, Clone)]
pub struct ExpiredPage {
    pub username: String,
    pub display_name: String,
    pub reason: LinkValidity,
}

#[derive(Debug, Clone)]
pub enum PayPage {
    Persistent(PersistentPage),
    Ephemeral(EphemeralPage),
    /// The slug existed but the link is no longer valid
    Expired(ExpiredPage),
}

#[derive(Clone)]
pub struct PayPageService {
    store: Arc<dyn PaylinkStore>,
    links: EphemeralLinkService,
    views: ViewAccounting,
}

impl PayPageService {
    pub fn new(
        store: Arc<dyn PaylinkStore>,
        links: EphemeralLinkService,
        views: ViewAccounting,
    ) -> Self {
        Self {
            store,
            links,
            views,
        }
    }

    async fn owner(&self, username: &str) -> Result<User, ServiceError> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// `/{username}`: non-PII methods only
    #[instrument(skip(self))]
    pub async fn persistent(&self, username: &str) -> Result<PayPage, ServiceError> {
        let user = self.owner(username).await?;
        let methods = self.store.list_payment_methods(user.id).await?;
        let exposed = visibility::resolve(PageType::Persistent, methods);

        self.views.record_page_view(user.id, PageType::Persistent);

        Ok(PayPage::Persistent(PersistentPage {
            username: username.to_string(),
            display_name: user.public_name().to_string(),
            options: payment_options(&exposed, None, None),
        }))
    }

    /// `/{username}/{slug}`: the link's methods, PII included, while the link is valid.
    ///
    /// Each successful render consumes one view.
    #[instrument(skip(self, slug))]
    pub async fn ephemeral(
        &self,
        username: &str,
        slug: &str,
        now: DateTime<Utc>,
    ) -> Result<PayPage, ServiceError> {
        let user = self.owner(username).await?;
        let link = self.links.resolve(user.id, slug).await?;

        let expired = |reason: LinkValidity| {
            PayPage::Expired(ExpiredPage {
                username: username.to_string(),
                display_name: user.public_name().to_string(),
                reason,
            })
        };

        let validity = EphemeralLinkService::check_validity(&link, now);
        if !validity.is_valid() {
            info!("Ephemeral link {} is no longer valid: {:?}", link.id, validity);
            return Ok(expired(validity));
        }

        let methods = self.links.linked_methods(&link).await?;
        let exposed = visibility::resolve(PageType::Ephemeral, methods);

        let outcome = match self.links.record_view(&link, now).await {
            Ok(outcome) => outcome,
            Err(ServiceError::Expired(reason)) => {
                warn!("Ephemeral link {} lost the last view to a concurrent visitor", link.id);
                return Ok(expired(reason));
            },
            Err(e) => return Err(e),
        };

        self.views.record_page_view(user.id, PageType::Ephemeral);

        let link = outcome.link;
        Ok(PayPage::Ephemeral(EphemeralPage {
            username: username.to_string(),
            display_name: user.public_name().to_string(),
            amount: link.amount_display(),
            options: payment_options(&exposed, link.amount_cents, link.memo.as_deref()),
            memo: link.memo,
            views_remaining: outcome.views_remaining,
            expires_at: link.expires_at,
        }))
    }
}

/// Registry-backed buttons for resolved methods. Rows whose provider is no
/// longer registered are skipped.
pub fn payment_options(
    methods: &[PaymentMethod],
    amount_cents: Option<i64>,
    memo: Option<&str>,
) -> Vec<PaymentOption> {
    methods
        .iter()
        .filter_map(|method| {
            let config = method.provider_config()?;
            Some(PaymentOption {
                provider: method.provider.clone(),
                name: config.name.to_string(),
                icon: config.icon.to_string(),
                display_handle: config.format_handle(&method.handle),
                url: config.build_url(&method.handle, amount_cents, memo),
                is_pii: method.is_pii,
                referral: method.referral_cta(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn method(provider: &str, handle: &str, is_pii: bool) -> PaymentMethod {
        PaymentMethod {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            provider: provider.to_string(),
            handle: handle.to_string(),
            display_order: 0,
            is_pii,
            referral_code: None,
            referral_enabled: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_options_carry_urls_and_copy_fallback() {
        let options = payment_options(
            &[
                method("venmo", "jane", false),
                method("zelle", "555-0100", true),
                method("retired", "x", false),
            ],
            Some(1000),
            Some("pizza"),
        );

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].display_handle, "@jane");
        assert_eq!(
            options[0].url.as_deref(),
            Some("venmo://paycharge?txn=pay&recipients=jane&amount=10&note=pizza")
        );
        assert_eq!(options[1].url, None);
        assert_eq!(options[1].display_handle, "555-0100");
    }
}
