//! Payloads crossing the core/UI boundary in both directions.

use serde::{Deserialize, Serialize};

use super::history::GlobalHistoryItem;
use super::surface::LoadError;
use super::tab::{TabId, TabRecord, TabsSnapshot};

/// Requests sent by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiIntent {
    CreateTab {
        #[serde(default)]
        url: Option<String>,
    },
    SwitchActiveTab { id: TabId },
    CloseTab { id: TabId },
    ReorderTabs { from: usize, to: usize },
    #[serde(rename_all = "camelCase")]
    LoadUrl { tab_id: TabId, input: String },
    #[serde(rename_all = "camelCase")]
    GoBack { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    GoForward { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    Reload { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    Detach { tab_id: TabId },
    Reattach { tab: TabRecord },
}

/// What happened to a tab close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseOutcome {
    Closed,
    /// The Homepage tab stays; focus moved to a Web tab.
    HomepageKept,
    /// The last tab was the Homepage tab; the application must exit.
    Shutdown,
}

/// Result of one intent, reported as data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<CloseOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntentOutcome {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn from_bool(ok: bool) -> Self {
        Self {
            ok,
            ..Self::default()
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Notifications pushed to subscribers, in mutation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ShellEvent {
    TabsUpdated(TabsSnapshot),
    ReattachTab(TabRecord),
    AddHistoryItem(GlobalHistoryItem),
    #[serde(rename_all = "camelCase")]
    LoadFinished {
        tab_id: TabId,
        url: String,
        error: Option<LoadError>,
    },
    Shutdown,
}

/// A notification stamped with its position in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub seq: u64,
    #[serde(flatten)]
    pub event: ShellEvent,
}
