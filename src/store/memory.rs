// In-memory store for tests and database-less local runs
// Enforces the same unique constraints and cascades as the SQL schema

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{constraints, PaylinkStore, StoreError, StoreResult};
use crate::models::{
    EphemeralLink, EphemeralLinkMethod, NewEphemeralLink, NewPageView, NewPaymentMethod, NewUser,
    PaymentMethod, ReferralChangeset, User,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    // Vecs keep insertion order, matching created_at ordering in SQL
    payment_methods: Vec<PaymentMethod>,
    ephemeral_links: Vec<EphemeralLink>,
    link_methods: Vec<EphemeralLinkMethod>,
    page_views: Vec<NewPageView>,
}

pub struct InMemoryStore {
    state: Mutex<MemoryState>,
    fail_page_views: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            fail_page_views: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
    }

    /// Make page view inserts fail (for testing purposes)
    pub fn set_page_view_failure(&self, fail: bool) {
        self.fail_page_views.store(fail, Ordering::SeqCst);
    }

    /// Rewrite a link's expiry (for testing purposes)
    pub fn set_link_expiry(&self, link_id: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let mut state = self.lock()?;
        let link = state
            .ephemeral_links
            .iter_mut()
            .find(|l| l.id == link_id)
            .ok_or_else(|| StoreError::Database(format!("no ephemeral link {}", link_id)))?;
        link.expires_at = expires_at;
        Ok(())
    }

    /// Number of stored link associations (for testing purposes)
    pub fn link_method_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.link_methods.len())
            .unwrap_or_default()
    }

    /// Number of stored ephemeral links (for testing purposes)
    pub fn ephemeral_link_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.ephemeral_links.len())
            .unwrap_or_default()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unique_violation(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

#[async_trait]
impl PaylinkStore for InMemoryStore {
    async fn ensure_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;
        let stored = state.users.entry(user.id).or_insert_with(|| User {
            id: user.id,
            email: user.email,
            username: user.username,
            display_name: user.display_name,
            created_at: user.created_at,
        });
        Ok(stored.clone())
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn set_username(
        &self,
        user_id: Uuid,
        username: &str,
        display_name: &str,
    ) -> StoreResult<Option<User>> {
        let mut state = self.lock()?;
        if state
            .users
            .values()
            .any(|u| u.username.as_deref() == Some(username))
        {
            return Err(unique_violation(constraints::USERNAME_UNIQUE));
        }

        match state.users.get_mut(&user_id) {
            Some(user) if user.username.is_none() => {
                user.username = Some(username.to_string());
                user.display_name = Some(display_name.to_string());
                Ok(Some(user.clone()))
            },
            _ => Ok(None),
        }
    }

    async fn list_payment_methods(&self, user_id: Uuid) -> StoreResult<Vec<PaymentMethod>> {
        Ok(self
            .lock()?
            .payment_methods
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_payment_method(&self, method: NewPaymentMethod) -> StoreResult<PaymentMethod> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&method.user_id) {
            return Err(StoreError::ForeignKeyViolation(
                "payment_methods_user_id_fkey".to_string(),
            ));
        }
        if state
            .payment_methods
            .iter()
            .any(|m| m.user_id == method.user_id && m.provider == method.provider)
        {
            return Err(unique_violation(constraints::PAYMENT_METHOD_PROVIDER_UNIQUE));
        }

        let stored = PaymentMethod {
            id: method.id,
            user_id: method.user_id,
            provider: method.provider,
            handle: method.handle,
            display_order: method.display_order,
            is_pii: method.is_pii,
            referral_code: method.referral_code,
            referral_enabled: method.referral_enabled,
            created_at: method.created_at,
        };
        state.payment_methods.push(stored.clone());
        Ok(stored)
    }

    async fn delete_payment_method(&self, user_id: Uuid, method_id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let before = state.payment_methods.len();
        state
            .payment_methods
            .retain(|m| !(m.id == method_id && m.user_id == user_id));
        let removed = state.payment_methods.len() < before;
        if removed {
            state.link_methods.retain(|lm| lm.payment_method_id != method_id);
        }
        Ok(removed)
    }

    async fn update_referral(
        &self,
        user_id: Uuid,
        method_id: Uuid,
        changes: ReferralChangeset,
    ) -> StoreResult<Option<PaymentMethod>> {
        let mut state = self.lock()?;
        Ok(state
            .payment_methods
            .iter_mut()
            .find(|m| m.id == method_id && m.user_id == user_id)
            .map(|method| {
                method.referral_code = changes.referral_code;
                method.referral_enabled = changes.referral_enabled;
                method.clone()
            }))
    }

    async fn insert_ephemeral_link(
        &self,
        link: NewEphemeralLink,
        method_ids: &[Uuid],
    ) -> StoreResult<EphemeralLink> {
        let mut state = self.lock()?;

        // Validate every row before touching state so a failure leaves nothing behind
        if !state.users.contains_key(&link.user_id) {
            return Err(StoreError::ForeignKeyViolation(
                "ephemeral_links_user_id_fkey".to_string(),
            ));
        }
        if state
            .ephemeral_links
            .iter()
            .any(|l| l.user_id == link.user_id && l.slug == link.slug)
        {
            return Err(unique_violation(constraints::EPHEMERAL_LINK_SLUG_UNIQUE));
        }
        if let Some(missing) = method_ids
            .iter()
            .find(|id| !state.payment_methods.iter().any(|m| m.id == **id))
        {
            return Err(StoreError::ForeignKeyViolation(format!(
                "ephemeral_link_methods_payment_method_id_fkey ({})",
                missing
            )));
        }

        let stored = link.into_link();
        state
            .link_methods
            .extend(method_ids.iter().map(|id| EphemeralLinkMethod {
                ephemeral_link_id: stored.id,
                payment_method_id: *id,
            }));
        state.ephemeral_links.push(stored.clone());
        Ok(stored)
    }

    async fn find_ephemeral_link(
        &self,
        user_id: Uuid,
        slug: &str,
    ) -> StoreResult<Option<EphemeralLink>> {
        Ok(self
            .lock()?
            .ephemeral_links
            .iter()
            .find(|l| l.user_id == user_id && l.slug == slug)
            .cloned())
    }

    async fn list_ephemeral_links(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<EphemeralLink>> {
        let state = self.lock()?;
        let mut links: Vec<EphemeralLink> = state
            .ephemeral_links
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        // Reverse insertion order first so equal timestamps still come out newest first
        links.reverse();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        links.truncate(usize::try_from(limit).unwrap_or_default());
        Ok(links)
    }

    async fn linked_payment_methods(&self, link_id: Uuid) -> StoreResult<Vec<PaymentMethod>> {
        let state = self.lock()?;
        Ok(state
            .payment_methods
            .iter()
            .filter(|m| {
                state
                    .link_methods
                    .iter()
                    .any(|lm| lm.ephemeral_link_id == link_id && lm.payment_method_id == m.id)
            })
            .cloned()
            .collect())
    }

    async fn consume_view(
        &self,
        link_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<EphemeralLink>> {
        // Check and increment under one lock acquisition
        let mut state = self.lock()?;
        Ok(state
            .ephemeral_links
            .iter_mut()
            .find(|l| l.id == link_id)
            .filter(|l| l.view_count < l.max_views && l.expires_at > now)
            .map(|link| {
                link.view_count += 1;
                link.clone()
            }))
    }

    async fn insert_page_view(&self, view: NewPageView) -> StoreResult<()> {
        if self.fail_page_views.load(Ordering::SeqCst) {
            return Err(StoreError::Database("page view insert failed".to_string()));
        }
        self.lock()?.page_views.push(view);
        Ok(())
    }

    async fn count_page_views(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        let count = self
            .lock()?
            .page_views
            .iter()
            .filter(|v| v.user_id == user_id)
            .filter(|v| since.map_or(true, |since| v.viewed_at >= since))
            .count();
        Ok(count as i64)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}
