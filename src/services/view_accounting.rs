// View Accounting: fire-and-forget page view events and dashboard counts
// Independent of EphemeralLink.view_count, which only enforces the per-link cap

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::models::{NewPageView, PageType, PageViewStats};
use crate::store::PaylinkStore;
use crate::utils::service_error::ServiceError;

#[derive(Clone)]
pub struct ViewAccounting {
    store: Arc<dyn PaylinkStore>,
}

impl ViewAccounting {
    pub fn new(store: Arc<dyn PaylinkStore>) -> Self {
        Self { store }
    }

    /// Append one page view event in the background.
    ///
    /// Failures are logged and dropped; callers never wait on this.
    /// The handle is only useful to tests that want to observe the write.
    pub fn record_page_view(&self, user_id: Uuid, page_type: PageType) -> JoinHandle<()> {
        let store = self.store.clone();
        let view = NewPageView::new(user_id, page_type, Utc::now());

        tokio::spawn(async move {
            match store.insert_page_view(view).await {
                Ok(()) => debug!("Recorded {} page view for user {}", page_type, user_id),
                Err(e) => warn!(
                    "Failed to record {} page view for user {}: {}",
                    page_type, user_id, e
                ),
            }
        })
    }

    /// Page views for a user since `since` (inclusive), or all time
    pub async fn count_since(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, ServiceError> {
        Ok(self.store.count_page_views(user_id, since).await?)
    }

    /// Totals shown on the dashboard
    #[instrument(skip(self))]
    pub async fn stats(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<PageViewStats, ServiceError> {
        Ok(PageViewStats {
            total: self.count_since(user_id, None).await?,
            last_7_days: self
                .count_since(user_id, Some(now - Duration::days(7)))
                .await?,
            last_24_hours: self
                .count_since(user_id, Some(now - Duration::hours(24)))
                .await?,
        })
    }
}
