// Ephemeral link model: a time- and view-limited page variant that may expose PII methods
// Validity is derived from (now, expires_at, view_count, max_views) and never stored

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::{ephemeral_link_methods, ephemeral_links};
use crate::services::handle_registry::format_amount;
use crate::utils::validation::MEMO_MAX_LENGTH;

// =============================================================================
// DATABASE MODELS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = ephemeral_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EphemeralLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub amount_cents: Option<i64>,
    pub memo: Option<String>,
    pub view_count: i32,
    pub max_views: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ephemeral_links)]
pub struct NewEphemeralLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub amount_cents: Option<i64>,
    pub memo: Option<String>,
    pub view_count: i32,
    pub max_views: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewEphemeralLink {
    pub fn into_link(self) -> EphemeralLink {
        EphemeralLink {
            id: self.id,
            user_id: self.user_id,
            slug: self.slug,
            amount_cents: self.amount_cents,
            memo: self.memo,
            view_count: self.view_count,
            max_views: self.max_views,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

/// Join row between an ephemeral link and one of the owner's payment methods
#[derive(Debug, Clone, PartialEq, Eq, Hash, Queryable, Insertable)]
#[diesel(table_name = ephemeral_link_methods)]
pub struct EphemeralLinkMethod {
    pub ephemeral_link_id: Uuid,
    pub payment_method_id: Uuid,
}

// =============================================================================
// VALIDITY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkValidity {
    Valid,
    Expired,
    ViewLimitReached,
}

impl LinkValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, LinkValidity::Valid)
    }
}

impl EphemeralLink {
    /// Validity at `now`. Expiry is reported ahead of the view cap when both fail.
    pub fn validity_at(&self, now: DateTime<Utc>) -> LinkValidity {
        if now >= self.expires_at {
            LinkValidity::Expired
        } else if self.view_count >= self.max_views {
            LinkValidity::ViewLimitReached
        } else {
            LinkValidity::Valid
        }
    }

    /// Views left for later visitors once the current one is counted
    pub fn views_remaining_after(&self, view_count_before: i32) -> i32 {
        (self.max_views - view_count_before - 1).max(0)
    }

    pub fn amount_display(&self) -> Option<String> {
        self.amount_cents.map(format_amount)
    }

    pub fn to_response(&self, share_url: String, now: DateTime<Utc>) -> EphemeralLinkResponse {
        EphemeralLinkResponse {
            id: self.id,
            slug: self.slug.clone(),
            share_url,
            amount_cents: self.amount_cents,
            amount: self.amount_display(),
            memo: self.memo.clone(),
            view_count: self.view_count,
            max_views: self.max_views,
            views: format!("{}/{}", self.view_count, self.max_views),
            status: self.validity_at(now),
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "payment_method_ids": ["123e4567-e89b-12d3-a456-426614174000"],
    "amount_cents": 2500,
    "memo": "Concert tickets"
}))]
pub struct CreateEphemeralLinkRequest {
    #[serde(default)]
    pub payment_method_ids: Vec<Uuid>,

    #[validate(range(
        min = 1,
        max = 100_000_000,
        message = "Amount must be a positive number of cents"
    ))]
    pub amount_cents: Option<i64>,

    #[validate(length(max = "MEMO_MAX_LENGTH", message = "Memo is too long"))]
    pub memo: Option<String>,
}

impl CreateEphemeralLinkRequest {
    pub fn sanitize(&mut self) {
        self.memo = crate::utils::trim_optional_field(self.memo.as_ref());
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "123e4567-e89b-12d3-a456-426614174000",
    "slug": "k3x9q2ab",
    "share_url": "https://cheddarl.ink/jane-doe/k3x9q2ab",
    "amount_cents": 2500,
    "amount": "25",
    "memo": "Concert tickets",
    "view_count": 1,
    "max_views": 3,
    "views": "1/3",
    "status": "valid",
    "expires_at": "2025-01-02T12:00:00Z",
    "created_at": "2025-01-01T12:00:00Z"
}))]
pub struct EphemeralLinkResponse {
    pub id: Uuid,
    pub slug: String,
    pub share_url: String,
    pub amount_cents: Option<i64>,
    pub amount: Option<String>,
    pub memo: Option<String>,
    pub view_count: i32,
    pub max_views: i32,
    pub views: String,
    pub status: LinkValidity,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
