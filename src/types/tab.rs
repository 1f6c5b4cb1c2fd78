use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved location of the built-in start page. It never has a render surface.
pub const HOMEPAGE_URL: &str = "noxx://homepage";

/// Scheme prefix for shell-internal pages.
pub const INTERNAL_SCHEME: &str = "noxx://";

/// Title shown for the Homepage tab.
pub const HOMEPAGE_TITLE: &str = "NoxX Browser";

/// Default title of a tab whose page has not reported one yet.
pub const DEFAULT_TAB_TITLE: &str = "New Tab";

/// Opaque tab identifier, stable for the tab's lifetime (including detach/reattach).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TabId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a tab is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Homepage,
    Web,
}

/// One logical browsing context, exclusively owned by the tab registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub kind: TabKind,
    pub title: String,
    pub url: String,
    pub favicon: Option<String>,
    pub loading: bool,
}

impl Tab {
    pub fn homepage(id: TabId) -> Self {
        Self {
            id,
            kind: TabKind::Homepage,
            title: HOMEPAGE_TITLE.to_string(),
            url: HOMEPAGE_URL.to_string(),
            favicon: None,
            loading: false,
        }
    }

    pub fn web(id: TabId, url: &str) -> Self {
        Self {
            id,
            kind: TabKind::Web,
            title: DEFAULT_TAB_TITLE.to_string(),
            url: url.to_string(),
            favicon: None,
            loading: true,
        }
    }

    pub fn is_homepage(&self) -> bool {
        self.kind == TabKind::Homepage
    }

    /// A Web tab parked on the homepage sentinel because another tab holds the
    /// Homepage role. It has no surface until it navigates again.
    pub fn is_parked(&self) -> bool {
        self.kind == TabKind::Web && self.url == HOMEPAGE_URL
    }

    pub fn record(&self) -> TabRecord {
        TabRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// The `{id, title, url}` shape exchanged with the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: TabId,
    pub title: String,
    pub url: String,
}

/// Authoritative tab-bar state pushed after every registry mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsSnapshot {
    pub tabs: Vec<TabRecord>,
    pub active_tab_id: Option<TabId>,
}

/// True for locations that must never reach global history.
pub fn is_internal_url(url: &str) -> bool {
    url.is_empty()
        || url.starts_with(INTERNAL_SCHEME)
        || url.starts_with("chrome://")
        || url.starts_with("about:")
}
