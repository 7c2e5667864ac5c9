// Middleware modules for the payment link backend

pub mod auth;
pub mod auth_middleware;

// Re-export auth types
pub use auth::{AuthError, AuthVerifier, AuthenticatedUser};
pub use auth_middleware::{auth_middleware, LOGIN_URL};
