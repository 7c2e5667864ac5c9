// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    middleware::AuthVerifier,
    services::{
        EphemeralLinkService, PayPageService, PaymentMethodService, UserService, ViewAccounting,
    },
    store::PaylinkStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn PaylinkStore>,
    pub auth: Arc<AuthVerifier>,
    pub users: UserService,
    pub payment_methods: PaymentMethodService,
    pub links: EphemeralLinkService,
    pub views: ViewAccounting,
    pub pay_pages: PayPageService,
}

impl AppState {
    /// Wire every service over one store
    pub fn new(config: AppConfig, store: Arc<dyn PaylinkStore>) -> Self {
        let links = EphemeralLinkService::new(
            store.clone(),
            config.link_policy(),
            config.base_url.clone(),
        );
        let views = ViewAccounting::new(store.clone());

        Self {
            auth: Arc::new(AuthVerifier::from_config(&config)),
            users: UserService::new(store.clone()),
            payment_methods: PaymentMethodService::new(store.clone()),
            pay_pages: PayPageService::new(store.clone(), links.clone(), views.clone()),
            links,
            views,
            store,
            config: Arc::new(config),
        }
    }
}
