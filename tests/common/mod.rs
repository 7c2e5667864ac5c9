// Common test utilities and helper structs
// Shared across all test files to avoid duplication
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, Response, StatusCode},
    Router,
};
use cheddar_backend_core::{
    app::AppState,
    app_config::AppConfig,
    handlers::create_router,
    middleware::auth::IdentityClaims,
    models::{AddPaymentMethodRequest, PaymentMethod, SetupUsernameRequest, User},
    services::ProviderType,
    store::InMemoryStore,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub config: AppConfig,
}

impl TestApp {
    /// Send a POST request
    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "POST", uri)
    }

    /// Send a GET request
    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "GET", uri)
    }

    /// Send a PUT request
    pub fn put(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "PUT", uri)
    }

    /// Send a DELETE request
    pub fn delete(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "DELETE", uri)
    }

    /// Bearer token the way the identity provider would mint it
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.token_with_exp(user_id, chrono::Utc::now().timestamp() as u64 + 3600)
    }

    pub fn token_with_exp(&self, user_id: Uuid, exp: u64) -> String {
        let claims = IdentityClaims {
            sub: user_id.to_string(),
            email: Some(format!("{}@example.com", user_id.simple())),
            exp,
            aud: Some(self.config.auth_jwt_audience.clone()),
            iss: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.auth_jwt_secret.as_bytes()),
        )
        .unwrap()
    }

    /// Provision a user and claim `username`
    pub async fn create_user(&self, username: &str) -> User {
        let user_id = Uuid::new_v4();
        self.state
            .users
            .ensure_user(user_id, Some(format!("{}@example.com", username)))
            .await
            .unwrap();
        self.state
            .users
            .setup_username(
                user_id,
                SetupUsernameRequest {
                    username: username.to_string(),
                    display_name: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn add_method(
        &self,
        user_id: Uuid,
        provider: ProviderType,
        handle: &str,
    ) -> PaymentMethod {
        self.state
            .payment_methods
            .add(
                user_id,
                AddPaymentMethodRequest {
                    provider,
                    handle: handle.to_string(),
                },
            )
            .await
            .unwrap()
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: &'static str,
    uri: String,
    token: Option<String>,
    body: Option<Vec<u8>>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &'static str, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            token: None,
            body: None,
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_vec(body).unwrap());
        self
    }

    /// Authenticate as `user_id`
    pub fn as_user(mut self, user_id: Uuid) -> Self {
        self.token = Some(self.app.token_for(user_id));
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match self.body {
            Some(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(bytes))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.app.clone().oneshot(request).await.unwrap();

        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    /// Get status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Get response body as text
    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}

/// Setup test application over a fresh in-memory store
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(AppConfig::for_test())
}

pub fn setup_test_app_with(config: AppConfig) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(config.clone(), store.clone());
    let app = create_router(state.clone());

    TestApp {
        app,
        state,
        store,
        config,
    }
}
