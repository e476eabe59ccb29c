use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::user::ReconciledUser;

/// Filter value meaning "do not filter on this dimension".
pub const FILTER_ALL: &str = "all";

/// Active filters for a view. `None`, blank or `"all"` match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub search_term: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
    pub center: Option<String>,
}

impl FilterSet {
    pub fn with_search(mut self, term: &str) -> Self {
        self.search_term = Some(term.to_string());
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn with_center(mut self, center: &str) -> Self {
        self.center = Some(center.to_string());
        self
    }
}

/// One entry of the page-number strip shown under the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(n) => serializer.serialize_u64(*n as u64),
            PageItem::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Filtered, paginated projection of the reconciled users. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct View {
    pub rows: Vec<ReconciledUser>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
    #[schema(value_type = Vec<Object>)]
    pub pages: Vec<PageItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Loading,
    Ready,
    PartiallyFailed,
}

/// What a single `reload()` achieved.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ReloadOutcome {
    /// Both primary sources answered and a snapshot was built.
    pub ready: bool,
    pub anomalies: usize,
    pub failed_centers: Vec<String>,
    pub ambiguities: usize,
    pub ambiguous_users: Vec<String>,
    pub generation: u64,
    /// A newer reload published first; this result was discarded.
    pub superseded: bool,
}

/// Summary of the last published snapshot, surfaced as a non-blocking warning.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Diagnostics {
    pub generation: u64,
    pub anomalies: usize,
    pub deleted_anomalies: usize,
    pub failed_centers: Vec<String>,
    pub ambiguities: usize,
    pub ambiguous_users: Vec<String>,
    pub deleted_fetch_failed: bool,
    #[schema(value_type = String)]
    pub published_at: DateTime<Utc>,
}

impl Diagnostics {
    pub fn has_warnings(&self) -> bool {
        self.anomalies > 0
            || self.deleted_anomalies > 0
            || self.ambiguities > 0
            || self.deleted_fetch_failed
            || !self.failed_centers.is_empty()
    }
}
