use serde::{Deserialize, Serialize};

use crate::{
    auth::repo_types::UserId,
    waste::{
        category::WasteCategory,
        repo_types::{EntryId, WasteEntry},
        timestamp::format_timestamp,
    },
};

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: WasteCategory,
}

/// Request body for recording an entry. Fields are validated by the handler.
#[derive(Debug, Deserialize)]
pub struct RecordEntryRequest {
    pub user_id: Option<UserId>,
    pub category: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordedResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Option<UserId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: EntryId,
    pub category: WasteCategory,
    pub timestamp: String,
}

impl TryFrom<WasteEntry> for HistoryItem {
    type Error = time::error::Format;

    fn try_from(e: WasteEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: e.id,
            category: e.category,
            timestamp: format_timestamp(e.timestamp)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryItem>,
}
