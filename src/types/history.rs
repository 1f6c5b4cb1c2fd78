use serde::{Deserialize, Serialize};

use super::tab::TabId;

/// Payload handed to the global history collaborator on every finished load
/// of a non-internal location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalHistoryItem {
    pub url: String,
    pub title: String,
    pub tab_id: TabId,
    pub favicon: Option<String>,
}

/// Represents a single persisted history entry for a visited page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    pub tab_id: Option<String>,
    pub favicon: Option<String>,
    pub visit_time: i64,
    pub visit_count: i32,
}
