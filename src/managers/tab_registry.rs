use std::collections::HashMap;

use crate::types::errors::ShellError;
use crate::types::tab::{Tab, TabId, TabsSnapshot};

/// Trait defining the tab registry interface.
pub trait TabRegistryTrait {
    fn insert(&mut self, tab: Tab, activate: bool);
    fn remove(&mut self, tab_id: &TabId) -> Result<Tab, ShellError>;
    fn activate(&mut self, tab_id: &TabId) -> Result<(), ShellError>;
    fn reorder(&mut self, from: usize, to: usize) -> Result<(), ShellError>;
    fn get(&self, tab_id: &TabId) -> Option<&Tab>;
    fn get_mut(&mut self, tab_id: &TabId) -> Option<&mut Tab>;
    fn contains(&self, tab_id: &TabId) -> bool;
    fn tabs(&self) -> Vec<&Tab>;
    fn order(&self) -> &[TabId];
    fn active(&self) -> Option<&Tab>;
    fn active_id(&self) -> Option<&TabId>;
    fn homepage_tab(&self) -> Option<&Tab>;
    fn first_web_tab(&self) -> Option<&Tab>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn snapshot(&self) -> TabsSnapshot;
}

/// Authoritative set of open tabs in the main window, their display order and
/// the active-tab pointer.
pub struct TabRegistry {
    tabs: HashMap<TabId, Tab>,
    order: Vec<TabId>,
    active: Option<TabId>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self {
            tabs: HashMap::new(),
            order: Vec::new(),
            active: None,
        }
    }

    fn find_order_index(&self, tab_id: &TabId) -> Option<usize> {
        self.order.iter().position(|id| id == tab_id)
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRegistryTrait for TabRegistry {
    /// Appends a tab at the end of the display order. The first tab ever
    /// inserted becomes active regardless of `activate`.
    fn insert(&mut self, tab: Tab, activate: bool) {
        let id = tab.id.clone();
        if self.tabs.insert(id.clone(), tab).is_none() {
            self.order.push(id.clone());
        }
        if activate || self.active.is_none() {
            self.active = Some(id);
        }
    }

    /// Removes a tab. Clears the active pointer if it named this tab; picking
    /// a fallback is the caller's decision.
    fn remove(&mut self, tab_id: &TabId) -> Result<Tab, ShellError> {
        let order_idx = self
            .find_order_index(tab_id)
            .ok_or_else(|| ShellError::UnknownTab(tab_id.clone()))?;
        let tab = self
            .tabs
            .remove(tab_id)
            .ok_or_else(|| ShellError::UnknownTab(tab_id.clone()))?;
        self.order.remove(order_idx);
        if self.active.as_ref() == Some(tab_id) {
            self.active = None;
        }
        Ok(tab)
    }

    fn activate(&mut self, tab_id: &TabId) -> Result<(), ShellError> {
        if !self.tabs.contains_key(tab_id) {
            return Err(ShellError::UnknownTab(tab_id.clone()));
        }
        self.active = Some(tab_id.clone());
        Ok(())
    }

    /// Moves the tab at `from` to position `to`. Active state is untouched.
    fn reorder(&mut self, from: usize, to: usize) -> Result<(), ShellError> {
        let len = self.order.len();
        if from >= len || to >= len {
            return Err(ShellError::InvalidOperation(format!(
                "reorder {} -> {} out of range for {} tabs",
                from, to, len
            )));
        }
        let id = self.order.remove(from);
        self.order.insert(to, id);
        Ok(())
    }

    fn get(&self, tab_id: &TabId) -> Option<&Tab> {
        self.tabs.get(tab_id)
    }

    fn get_mut(&mut self, tab_id: &TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(tab_id)
    }

    fn contains(&self, tab_id: &TabId) -> bool {
        self.tabs.contains_key(tab_id)
    }

    /// Tabs in display order.
    fn tabs(&self) -> Vec<&Tab> {
        self.order
            .iter()
            .filter_map(|id| self.tabs.get(id))
            .collect()
    }

    fn order(&self) -> &[TabId] {
        &self.order
    }

    fn active(&self) -> Option<&Tab> {
        self.active.as_ref().and_then(|id| self.tabs.get(id))
    }

    fn active_id(&self) -> Option<&TabId> {
        self.active.as_ref()
    }

    fn homepage_tab(&self) -> Option<&Tab> {
        self.tabs().into_iter().find(|t| t.is_homepage())
    }

    fn first_web_tab(&self) -> Option<&Tab> {
        self.tabs().into_iter().find(|t| !t.is_homepage())
    }

    fn len(&self) -> usize {
        self.tabs.len()
    }

    fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    fn snapshot(&self) -> TabsSnapshot {
        TabsSnapshot {
            tabs: self.tabs().into_iter().map(Tab::record).collect(),
            active_tab_id: self.active.clone(),
        }
    }
}
