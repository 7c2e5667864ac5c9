// Utility modules for the payment link backend

pub mod service_error;
pub mod validation;

pub use service_error::ServiceError;
pub use validation::{normalize_handle, trim_optional_field, validate_username};
