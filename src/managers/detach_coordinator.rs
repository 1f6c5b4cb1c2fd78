use std::collections::HashMap;

use crate::managers::navigation_history::TabHistory;
use crate::types::errors::ShellError;
use crate::types::surface::{SurfaceId, WindowId};
use crate::types::tab::{Tab, TabId};

/// Where a tab is in the detach/reattach cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachState {
    Attached,
    Detaching,
    Detached,
    Reattaching,
}

/// Bookkeeping for a tab living in its own top-level window.
#[derive(Debug, Clone)]
pub struct DetachedWindowRecord {
    pub tab: Tab,
    pub window: WindowId,
    pub surface: SurfaceId,
    pub url: String,
    pub history: TabHistory,
    pub state: DetachState,
}

impl DetachedWindowRecord {
    pub fn tab_id(&self) -> &TabId {
        &self.tab.id
    }
}

/// Table of detached windows keyed by tab id.
///
/// A tab id lives either here or in the tab registry, never both; the shell
/// moves the `Tab` value itself between the two.
#[derive(Debug, Default)]
pub struct DetachCoordinator {
    records: HashMap<TabId, DetachedWindowRecord>,
    in_flight: HashMap<TabId, DetachState>,
}

impl DetachCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, tab_id: &TabId) -> DetachState {
        if let Some(s) = self.in_flight.get(tab_id) {
            return *s;
        }
        self.records
            .get(tab_id)
            .map(|r| r.state)
            .unwrap_or(DetachState::Attached)
    }

    /// Marks a tab as leaving the main window. Fails if it is already detached
    /// or mid-transition.
    pub fn begin_detach(&mut self, tab_id: &TabId) -> Result<(), ShellError> {
        if self.state(tab_id) != DetachState::Attached {
            return Err(ShellError::InvalidOperation(format!(
                "tab {} is already detached",
                tab_id
            )));
        }
        self.in_flight.insert(tab_id.clone(), DetachState::Detaching);
        Ok(())
    }

    pub fn abort(&mut self, tab_id: &TabId) {
        self.in_flight.remove(tab_id);
    }

    pub fn complete_detach(&mut self, mut record: DetachedWindowRecord) {
        self.in_flight.remove(record.tab_id());
        record.state = DetachState::Detached;
        self.records.insert(record.tab_id().clone(), record);
    }

    /// Takes a detached tab's record out of the table for its way back. Fails
    /// without a record. Finish with `complete_reattach` or hand the record
    /// back with `cancel_reattach`.
    pub fn begin_reattach(&mut self, tab_id: &TabId) -> Result<DetachedWindowRecord, ShellError> {
        let mut record = self.records.remove(tab_id).ok_or_else(|| {
            ShellError::InvalidOperation(format!("tab {} is not detached", tab_id))
        })?;
        record.state = DetachState::Reattaching;
        self.in_flight.insert(tab_id.clone(), DetachState::Reattaching);
        Ok(record)
    }

    pub fn complete_reattach(&mut self, tab_id: &TabId) {
        self.in_flight.remove(tab_id);
    }

    /// Puts a record back as `Detached` after a failed attempt.
    pub fn cancel_reattach(&mut self, mut record: DetachedWindowRecord) {
        self.in_flight.remove(record.tab_id());
        record.state = DetachState::Detached;
        self.records.insert(record.tab_id().clone(), record);
    }

    pub fn remove(&mut self, tab_id: &TabId) -> Option<DetachedWindowRecord> {
        self.in_flight.remove(tab_id);
        self.records.remove(tab_id)
    }

    pub fn get(&self, tab_id: &TabId) -> Option<&DetachedWindowRecord> {
        self.records.get(tab_id)
    }

    pub fn get_mut(&mut self, tab_id: &TabId) -> Option<&mut DetachedWindowRecord> {
        self.records.get_mut(tab_id)
    }

    pub fn contains(&self, tab_id: &TabId) -> bool {
        self.records.contains_key(tab_id)
    }

    pub fn by_window(&self, window: WindowId) -> Option<&DetachedWindowRecord> {
        self.records.values().find(|r| r.window == window)
    }

    pub fn records(&self) -> impl Iterator<Item = &DetachedWindowRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
