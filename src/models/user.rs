// User model: the root aggregate every payment method, link and page view hangs off

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::users;
use crate::utils::validation::USERNAME_REGEX;

/// User model representing a database record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    /// Unset until the one-time setup step
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown on pay pages, falling back to the username
    pub fn public_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or_default()
    }

    pub fn has_username(&self) -> bool {
        self.username.is_some()
    }
}

/// New user for insertion on first authentication
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn from_principal(id: Uuid, email: Option<String>) -> Self {
        Self {
            id,
            email,
            username: None,
            display_name: None,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

/// Request to claim a username during setup
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "username": "jane-doe",
    "display_name": "Jane Doe"
}))]
pub struct SetupUsernameRequest {
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    #[validate(regex(
        path = "USERNAME_REGEX",
        message = "Username can only contain lowercase letters, numbers, hyphens, and underscores"
    ))]
    pub username: String,

    #[validate(length(max = 255, message = "Display name must be less than 255 characters"))]
    pub display_name: Option<String>,
}

impl SetupUsernameRequest {
    pub fn sanitize(&mut self) {
        self.username = self.username.trim().to_string();
        self.display_name = crate::utils::trim_optional_field(self.display_name.as_ref());
    }
}

/// Username availability answer for the setup form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsernameAvailability {
    pub username: String,
    pub available: bool,
    pub reason: Option<String>,
}

/// Profile returned to the dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": "123e4567-e89b-12d3-a456-426614174000",
    "username": "jane-doe",
    "display_name": "Jane Doe",
    "pay_link": "https://cheddarl.ink/jane-doe",
    "needs_setup": false
}))]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pay_link: Option<String>,
    pub needs_setup: bool,
}

impl User {
    pub fn to_profile(&self, base_url: &str) -> ProfileResponse {
        ProfileResponse {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            pay_link: self
                .username
                .as_ref()
                .map(|username| format!("{}/{}", base_url, username)),
            needs_setup: self.username.is_none(),
        }
    }
}
