//! Query string parameters beyond the cursor.

use agora_core::ReportStatus;
use serde::Deserialize;

/// `?q=&limit=` for user search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

/// `?status=` filter of the moderation queue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub status: Option<ReportStatus>,
}
