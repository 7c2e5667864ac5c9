// Visibility Resolver: which payment methods a page type may expose

use crate::models::{PageType, PaymentMethod};

/// Resolve the exposed method set for a page.
///
/// * `Persistent` pages drop every PII method. They are public and cacheable indefinitely.
/// * `Ephemeral` pages expose exactly the methods passed in, which must be the ones
///   joined to the link, PII or not.
///
/// The result is ordered by `display_order`; ties keep their input order.
pub fn resolve(page_type: PageType, methods: Vec<PaymentMethod>) -> Vec<PaymentMethod> {
    let mut exposed: Vec<PaymentMethod> = match page_type {
        PageType::Persistent => methods.into_iter().filter(|m| !m.is_pii).collect(),
        PageType::Ephemeral => methods,
    };
    sort_for_display(&mut exposed);
    exposed
}

/// Stable sort by `display_order`
pub fn sort_for_display(methods: &mut [PaymentMethod]) {
    methods.sort_by_key(|m| m.display_order);
}
