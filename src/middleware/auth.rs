// Bearer token verification against the identity provider's HS256 secret

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::app_config::AppConfig;

#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token subject is not a user id")]
    InvalidSubject,
}

/// Claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable user id
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
}

/// Authenticated user information extracted from the bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub exp: u64,
}

#[derive(Clone)]
pub struct AuthVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthVerifier {
    pub fn new(secret: &str, audience: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0; // No leeway for expiry validation

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.auth_jwt_secret,
            &config.auth_jwt_audience,
            config.auth_jwt_issuer.as_deref(),
        )
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let claims = token_data.claims;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject)?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            exp: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn token(sub: &str, aud: &str, exp: u64) -> String {
        let claims = IdentityClaims {
            sub: sub.to_string(),
            email: Some("jane@example.com".to_string()),
            exp,
            aud: Some(aud.to_string()),
            iss: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let verifier = AuthVerifier::new(SECRET, "authenticated", None);
        let user_id = Uuid::new_v4();
        let user = verifier
            .verify(&token(&user_id.to_string(), "authenticated", now() + 600))
            .unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_rejections() {
        let verifier = AuthVerifier::new(SECRET, "authenticated", None);
        let sub = Uuid::new_v4().to_string();

        assert_eq!(
            verifier.verify(&token(&sub, "authenticated", now() - 600)),
            Err(AuthError::TokenExpired)
        );
        assert!(matches!(
            verifier.verify(&token(&sub, "someone-else", now() + 600)),
            Err(AuthError::InvalidToken(_))
        ));
        assert_eq!(
            verifier.verify(&token("not-a-uuid", "authenticated", now() + 600)),
            Err(AuthError::InvalidSubject)
        );
        assert!(verifier.verify("garbage").is_err());
    }
}
