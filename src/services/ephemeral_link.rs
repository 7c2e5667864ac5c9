// Ephemeral Link Engine: create, resolve, validate and consume short-lived payment pages

use chrono::{DateTime, Duration, Utc};
use rand::{thread_rng, Rng};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    CreateEphemeralLinkRequest, EphemeralLink, EphemeralLinkResponse, LinkValidity,
    NewEphemeralLink, PaymentMethod,
};
use crate::store::PaylinkStore;
use crate::utils::service_error::ServiceError;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Slug alphabet: lowercase ASCII letters and digits
pub const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
/// Number of links listed on the dashboard
pub const RECENT_LINKS_LIMIT: i64 = 10;

// =============================================================================
// POLICY
// =============================================================================

/// Parameters fixed onto every link at creation
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPolicy {
    pub ttl: Duration,
    pub max_views: i32,
    pub slug_length: usize,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            max_views: 3,
            slug_length: 8,
        }
    }
}

/// Random lowercase-alphanumeric slug. Uniqueness is left to the storage constraint.
pub fn generate_slug(length: usize) -> String {
    let mut rng = thread_rng();
    (0..length)
        .map(|_| SLUG_ALPHABET[rng.gen_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

/// Result of counting one visitor against a link
#[derive(Debug, Clone)]
pub struct ViewOutcome {
    /// Link state after the increment
    pub link: EphemeralLink,
    pub view_count_before: i32,
    /// Views left for later visitors; the current visitor is not included
    pub views_remaining: i32,
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct EphemeralLinkService {
    store: Arc<dyn PaylinkStore>,
    policy: LinkPolicy,
    base_url: String,
}

impl EphemeralLinkService {
    pub fn new(store: Arc<dyn PaylinkStore>, policy: LinkPolicy, base_url: String) -> Self {
        Self {
            store,
            policy,
            base_url,
        }
    }

    /// Create a link at the current time
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateEphemeralLinkRequest,
    ) -> Result<EphemeralLink, ServiceError> {
        self.create_at(user_id, request, Utc::now()).await
    }

    /// Create a link as of `now`: `expires_at = now + ttl`, `view_count = 0`.
    ///
    /// The link and its method associations are written in one transaction.
    /// A slug collision surfaces as a conflict; nothing is overwritten or retried.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_at(
        &self,
        user_id: Uuid,
        mut request: CreateEphemeralLinkRequest,
        now: DateTime<Utc>,
    ) -> Result<EphemeralLink, ServiceError> {
        request.sanitize();
        request.validate()?;

        if request.payment_method_ids.is_empty() {
            return Err(ServiceError::ValidationError(
                "Select at least one payment method".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let method_ids: Vec<Uuid> = request
            .payment_method_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let owned: HashSet<Uuid> = self
            .store
            .list_payment_methods(user_id)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        if let Some(foreign) = method_ids.iter().find(|id| !owned.contains(id)) {
            warn!("Rejected ephemeral link with unowned payment method {}", foreign);
            return Err(ServiceError::ValidationError(format!(
                "Payment method {} does not belong to this account",
                foreign
            )));
        }

        let new_link = NewEphemeralLink {
            id: Uuid::new_v4(),
            user_id,
            slug: generate_slug(self.policy.slug_length),
            amount_cents: request.amount_cents,
            memo: request.memo,
            view_count: 0,
            max_views: self.policy.max_views,
            expires_at: now + self.policy.ttl,
            created_at: now,
        };

        let link = self.store.insert_ephemeral_link(new_link, &method_ids).await?;

        info!(
            "Created ephemeral link {} with {} payment methods, expires at {}",
            link.id,
            method_ids.len(),
            link.expires_at
        );
        Ok(link)
    }

    /// Look a link up by owner and slug. No side effects.
    #[instrument(skip(self))]
    pub async fn resolve(&self, user_id: Uuid, slug: &str) -> Result<EphemeralLink, ServiceError> {
        self.store
            .find_ephemeral_link(user_id, slug)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub fn check_validity(link: &EphemeralLink, now: DateTime<Utc>) -> LinkValidity {
        link.validity_at(now)
    }

    /// Count one visitor against the link.
    ///
    /// Validity is checked against the link as read, then the increment is a single
    /// conditional write. A write that does not apply means another visitor took the
    /// last view (or the link expired in between) and is reported as invalid.
    #[instrument(skip(self, link), fields(link_id = %link.id))]
    pub async fn record_view(
        &self,
        link: &EphemeralLink,
        now: DateTime<Utc>,
    ) -> Result<ViewOutcome, ServiceError> {
        let validity = link.validity_at(now);
        if !validity.is_valid() {
            return Err(ServiceError::Expired(validity));
        }

        match self.store.consume_view(link.id, now).await? {
            Some(updated) => {
                let view_count_before = updated.view_count - 1;
                let views_remaining = updated.views_remaining_after(view_count_before);
                Ok(ViewOutcome {
                    link: updated,
                    view_count_before,
                    views_remaining,
                })
            },
            None => {
                let reason = if now >= link.expires_at {
                    LinkValidity::Expired
                } else {
                    LinkValidity::ViewLimitReached
                };
                warn!("Ephemeral link view rejected at write time: {:?}", reason);
                Err(ServiceError::Expired(reason))
            },
        }
    }

    /// Methods joined to the link
    pub async fn linked_methods(
        &self,
        link: &EphemeralLink,
    ) -> Result<Vec<PaymentMethod>, ServiceError> {
        Ok(self.store.linked_payment_methods(link.id).await?)
    }

    /// Most recent links for the dashboard, newest first
    #[instrument(skip(self))]
    pub async fn list_recent(
        &self,
        user_id: Uuid,
        username: Option<&str>,
    ) -> Result<Vec<EphemeralLinkResponse>, ServiceError> {
        let now = Utc::now();
        let links = self
            .store
            .list_ephemeral_links(user_id, RECENT_LINKS_LIMIT)
            .await?;

        let username = username.unwrap_or_default();
        Ok(links
            .iter()
            .map(|link| link.to_response(self.share_url(username, &link.slug), now))
            .collect())
    }

    /// `{base_url}/{username}/{slug}`
    pub fn share_url(&self, username: &str, slug: &str) -> String {
        format!("{}/{}/{}", self.base_url, username, slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_shape() {
        for length in [6, 8, 16] {
            let slug = generate_slug(length);
            assert_eq!(slug.len(), length);
            assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_slugs_differ() {
        let slugs: HashSet<String> = (0..100).map(|_| generate_slug(8)).collect();
        assert_eq!(slugs.len(), 100);
    }

    #[test]
    fn test_default_policy() {
        let policy = LinkPolicy::default();
        assert_eq!(policy.ttl, Duration::hours(24));
        assert_eq!(policy.max_views, 3);
        assert_eq!(policy.slug_length, 8);
    }
}
