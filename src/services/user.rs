// User service: first-login provisioning and one-time username setup

use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::{NewUser, SetupUsernameRequest, User, UsernameAvailability};
use crate::store::PaylinkStore;
use crate::utils::service_error::ServiceError;
use crate::utils::validate_username;

/// Paths under the public root that a username would shadow
const RESERVED_USERNAMES: &[&str] = &[
    "api", "app", "admin", "dashboard", "health", "login", "logout", "setup", "signup",
    "static", "www",
];

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn PaylinkStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn PaylinkStore>) -> Self {
        Self { store }
    }

    /// Create the user row on first authentication
    #[instrument(skip(self, email))]
    pub async fn ensure_user(
        &self,
        user_id: Uuid,
        email: Option<String>,
    ) -> Result<User, ServiceError> {
        Ok(self
            .store
            .ensure_user(NewUser::from_principal(user_id, email))
            .await?)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, ServiceError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn check_availability(
        &self,
        username: &str,
    ) -> Result<UsernameAvailability, ServiceError> {
        let username = username.trim();
        let reason = if let Err(reason) = check_username_shape(username) {
            Some(reason)
        } else if self.store.find_user_by_username(username).await?.is_some() {
            Some("This username is already taken".to_string())
        } else {
            None
        };

        Ok(UsernameAvailability {
            username: username.to_string(),
            available: reason.is_none(),
            reason,
        })
    }

    /// Claim a username. Allowed once per user; the display name defaults to it.
    ///
    /// The existence check is advisory. The unique index decides races and its
    /// violation comes back as a conflict.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn setup_username(
        &self,
        user_id: Uuid,
        mut request: SetupUsernameRequest,
    ) -> Result<User, ServiceError> {
        request.sanitize();
        request.validate()?;
        check_username_shape(&request.username).map_err(ServiceError::ValidationError)?;

        let user = self.get(user_id).await?;
        if user.has_username() {
            return Err(ServiceError::Conflict(
                "Username has already been set".to_string(),
            ));
        }

        if self
            .store
            .find_user_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "This username is already taken".to_string(),
            ));
        }

        let display_name = request
            .display_name
            .clone()
            .unwrap_or_else(|| request.username.clone());

        match self
            .store
            .set_username(user_id, &request.username, &display_name)
            .await?
        {
            Some(user) => {
                info!("User {} claimed username {}", user_id, request.username);
                Ok(user)
            },
            None => {
                warn!("Username already set for user {} by a concurrent request", user_id);
                Err(ServiceError::Conflict(
                    "Username has already been set".to_string(),
                ))
            },
        }
    }
}

fn check_username_shape(username: &str) -> Result<(), String> {
    validate_username(username)?;
    if RESERVED_USERNAMES.contains(&username) {
        return Err("This username is reserved".to_string());
    }
    Ok(())
}
