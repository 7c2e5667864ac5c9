pub mod ephemeral_link;
pub mod page_view;
pub mod payment_method;
pub mod user;

// Re-export common types
pub use ephemeral_link::{
    CreateEphemeralLinkRequest, EphemeralLink, EphemeralLinkMethod, EphemeralLinkResponse,
    LinkValidity, NewEphemeralLink,
};
pub use page_view::{NewPageView, PageType, PageViewStats};
pub use payment_method::{
    AddPaymentMethodRequest, NewPaymentMethod, PaymentMethod, PaymentMethodResponse,
    ReferralChangeset, ReferralCta, UpdateReferralRequest,
};
pub use user::*;
