// Services module for the payment link backend
// Business logic layer for the application

pub mod ephemeral_link;
pub mod handle_registry;
pub mod pay_page;
pub mod payment_method;
pub mod user;
pub mod view_accounting;
pub mod visibility;

// Re-export commonly used services
pub use ephemeral_link::{generate_slug, EphemeralLinkService, LinkPolicy, ViewOutcome};
pub use handle_registry::{ProviderConfig, ProviderType, ReferralKind};
pub use pay_page::{PayPage, PayPageService, PaymentOption};
pub use payment_method::PaymentMethodService;
pub use user::UserService;
pub use view_accounting::ViewAccounting;
