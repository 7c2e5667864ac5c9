// Storage seam: the query/command interface the services run against
// Postgres (diesel-async) in production, in-memory for tests and local runs

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::DieselStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    EphemeralLink, NewEphemeralLink, NewPageView, NewPaymentMethod, NewUser, PaymentMethod,
    ReferralChangeset, User,
};

/// Constraint names shared by the SQL schema and the in-memory store
pub mod constraints {
    pub const USERNAME_UNIQUE: &str = "users_username_key";
    pub const PAYMENT_METHOD_PROVIDER_UNIQUE: &str = "payment_methods_user_provider_key";
    pub const EPHEMERAL_LINK_SLUG_UNIQUE: &str = "ephemeral_links_user_slug_key";
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<DieselError> for StoreError {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::UniqueViolation {
                    constraint: info.constraint_name().unwrap_or_default().to_string(),
                }
            },
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::ForeignKeyViolation(
                    info.constraint_name()
                        .unwrap_or_else(|| info.message())
                        .to_string(),
                )
            },
            other => StoreError::Database(other.to_string()),
        }
    }
}

#[async_trait]
pub trait PaylinkStore: Send + Sync {
    // Users

    /// Insert the user if absent and return the stored row
    async fn ensure_user(&self, user: NewUser) -> StoreResult<User>;

    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Assign a username to a user that has none yet.
    /// Returns `None` when the user is missing or already has a username.
    async fn set_username(
        &self,
        user_id: Uuid,
        username: &str,
        display_name: &str,
    ) -> StoreResult<Option<User>>;

    // Payment methods

    /// All methods for a user in insertion order
    async fn list_payment_methods(&self, user_id: Uuid) -> StoreResult<Vec<PaymentMethod>>;

    async fn insert_payment_method(&self, method: NewPaymentMethod) -> StoreResult<PaymentMethod>;

    /// Hard delete; link associations go with it. Returns whether a row was removed.
    async fn delete_payment_method(&self, user_id: Uuid, method_id: Uuid) -> StoreResult<bool>;

    async fn update_referral(
        &self,
        user_id: Uuid,
        method_id: Uuid,
        changes: ReferralChangeset,
    ) -> StoreResult<Option<PaymentMethod>>;

    // Ephemeral links

    /// Persist a link together with its method associations, all or nothing
    async fn insert_ephemeral_link(
        &self,
        link: NewEphemeralLink,
        method_ids: &[Uuid],
    ) -> StoreResult<EphemeralLink>;

    async fn find_ephemeral_link(
        &self,
        user_id: Uuid,
        slug: &str,
    ) -> StoreResult<Option<EphemeralLink>>;

    /// Most recent links first
    async fn list_ephemeral_links(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<EphemeralLink>>;

    /// Methods joined to a link, in insertion order
    async fn linked_payment_methods(&self, link_id: Uuid) -> StoreResult<Vec<PaymentMethod>>;

    /// Atomically increment `view_count` when the link is still valid at `now`.
    /// Returns the updated link, or `None` when the conditional write did not apply.
    async fn consume_view(
        &self,
        link_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<EphemeralLink>>;

    // Page views

    async fn insert_page_view(&self, view: NewPageView) -> StoreResult<()>;

    /// Views for a user at or after `since`, or all views when `since` is `None`
    async fn count_page_views(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<i64>;

    async fn health_check(&self) -> StoreResult<()>;
}
