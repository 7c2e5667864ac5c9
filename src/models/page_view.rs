// Page view events: append-only analytics rows, counted but never read back individually

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::page_views;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Persistent,
    Ephemeral,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Persistent => "persistent",
            PageType::Ephemeral => "ephemeral",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persistent" => Ok(PageType::Persistent),
            "ephemeral" => Ok(PageType::Ephemeral),
            other => Err(format!("Unknown page type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = page_views)]
pub struct NewPageView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub page_type: String,
    pub viewed_at: DateTime<Utc>,
}

impl NewPageView {
    pub fn new(user_id: Uuid, page_type: PageType, viewed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            page_type: page_type.as_str().to_string(),
            viewed_at,
        }
    }
}

/// Dashboard analytics summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "total": 120,
    "last_7_days": 18,
    "last_24_hours": 3
}))]
pub struct PageViewStats {
    pub total: i64,
    pub last_7_days: i64,
    pub last_24_hours: i64,
}
