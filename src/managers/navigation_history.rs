//! Per-tab shadow history.
//!
//! Each tab carries a back stack (oldest first, last element is the current
//! location) and a forward stack (last element is the next forward target).
//! The engine keeps its own native history per surface; the shadow stacks
//! exist for transitions the engine cannot represent, chiefly to and from the
//! homepage sentinel. [`plan_back`] and [`plan_forward`] decide which of the
//! two sources a back/forward request is served from.

use std::collections::HashMap;

use crate::types::tab::{TabId, HOMEPAGE_URL};

/// Shadow stacks of one tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabHistory {
    pub back: Vec<String>,
    pub forward: Vec<String>,
}

impl TabHistory {
    pub fn starting_at(url: &str) -> Self {
        Self {
            back: vec![url.to_string()],
            forward: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.back.last().map(String::as_str)
    }
}

/// How a back or forward request will be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStep {
    /// Delegate to the surface's own history; shadow stacks stay untouched.
    Native,
    /// Move one entry between the shadow stacks and show `target`.
    Shadow { target: String, to_homepage: bool },
    /// Nothing to go to.
    Nothing,
}

/// Decision rule for going back: native first, then the shadow back stack.
pub fn plan_back(native_can_go_back: bool, history: Option<&TabHistory>) -> HistoryStep {
    if native_can_go_back {
        return HistoryStep::Native;
    }
    match history {
        Some(h) if h.back.len() > 1 => {
            let target = h.back[h.back.len() - 2].clone();
            let to_homepage = target == HOMEPAGE_URL;
            HistoryStep::Shadow { target, to_homepage }
        }
        _ => HistoryStep::Nothing,
    }
}

/// Mirror of [`plan_back`] over the forward stack.
pub fn plan_forward(native_can_go_forward: bool, history: Option<&TabHistory>) -> HistoryStep {
    if native_can_go_forward {
        return HistoryStep::Native;
    }
    match history.and_then(|h| h.forward.last()) {
        Some(target) => HistoryStep::Shadow {
            target: target.clone(),
            to_homepage: target == HOMEPAGE_URL,
        },
        None => HistoryStep::Nothing,
    }
}

/// Trait defining the navigation history store interface.
pub trait NavigationHistoryTrait {
    fn init(&mut self, tab_id: &TabId, url: &str);
    fn record_navigation(&mut self, tab_id: &TabId, url: &str) -> bool;
    fn step_back(&mut self, tab_id: &TabId) -> Option<String>;
    fn step_forward(&mut self, tab_id: &TabId) -> Option<String>;
    fn get(&self, tab_id: &TabId) -> Option<&TabHistory>;
    fn back_stack(&self, tab_id: &TabId) -> &[String];
    fn forward_stack(&self, tab_id: &TabId) -> &[String];
    fn take(&mut self, tab_id: &TabId) -> Option<TabHistory>;
    fn restore(&mut self, tab_id: &TabId, history: TabHistory);
}

/// Shadow history for every tab the shell knows about.
#[derive(Debug, Default)]
pub struct NavigationHistoryStore {
    entries: HashMap<TabId, TabHistory>,
}

impl NavigationHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NavigationHistoryTrait for NavigationHistoryStore {
    /// Starts (or restarts) a tab's history at `url`.
    fn init(&mut self, tab_id: &TabId, url: &str) {
        self.entries
            .insert(tab_id.clone(), TabHistory::starting_at(url));
    }

    /// Appends `url` and clears the forward stack. Returns false, changing
    /// nothing, when `url` is already the current entry.
    fn record_navigation(&mut self, tab_id: &TabId, url: &str) -> bool {
        let history = self.entries.entry(tab_id.clone()).or_default();
        if history.current() == Some(url) {
            return false;
        }
        history.forward.clear();
        history.back.push(url.to_string());
        true
    }

    /// Moves the current entry onto the forward stack and returns the new
    /// current entry. Requires at least two back entries.
    fn step_back(&mut self, tab_id: &TabId) -> Option<String> {
        let history = self.entries.get_mut(tab_id)?;
        if history.back.len() < 2 {
            return None;
        }
        let current = history.back.pop()?;
        history.forward.push(current);
        history.back.last().cloned()
    }

    fn step_forward(&mut self, tab_id: &TabId) -> Option<String> {
        let history = self.entries.get_mut(tab_id)?;
        let next = history.forward.pop()?;
        history.back.push(next.clone());
        Some(next)
    }

    fn get(&self, tab_id: &TabId) -> Option<&TabHistory> {
        self.entries.get(tab_id)
    }

    fn back_stack(&self, tab_id: &TabId) -> &[String] {
        self.entries
            .get(tab_id)
            .map(|h| h.back.as_slice())
            .unwrap_or(&[])
    }

    fn forward_stack(&self, tab_id: &TabId) -> &[String] {
        self.entries
            .get(tab_id)
            .map(|h| h.forward.as_slice())
            .unwrap_or(&[])
    }

    fn take(&mut self, tab_id: &TabId) -> Option<TabHistory> {
        self.entries.remove(tab_id)
    }

    fn restore(&mut self, tab_id: &TabId, history: TabHistory) {
        self.entries.insert(tab_id.clone(), history);
    }
}
