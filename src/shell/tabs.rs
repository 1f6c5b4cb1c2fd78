use tracing::{debug, info, warn};

use super::Shell;
use crate::engine::RenderEngine;
use crate::managers::navigation_history::NavigationHistoryTrait;
use crate::managers::tab_registry::TabRegistryTrait;
use crate::services::input_classifier::{classify, ClassifiedInput};
use crate::types::errors::ShellError;
use crate::types::intent::CloseOutcome;
use crate::types::tab::{Tab, TabId, HOMEPAGE_URL};

impl<E: RenderEngine> Shell<E> {
    /// Opens a tab and makes it active.
    ///
    /// Without input (or with blank input) the tab becomes the Homepage tab
    /// when none exists, otherwise a Web tab at the configured new-tab url.
    /// Asking for the homepage location while a Homepage tab exists activates
    /// that tab and returns its id.
    pub fn create_tab(&mut self, input: Option<&str>) -> TabId {
        let classified = input.and_then(|raw| classify(raw, &self.settings.general.search_template));
        let url = match classified {
            Some(c) => c.into_url(),
            None if self.registry.homepage_tab().is_none() => HOMEPAGE_URL.to_string(),
            None => self.settings.general.new_tab_url.clone(),
        };

        if url == HOMEPAGE_URL {
            if let Some(home) = self.registry.homepage_tab().map(|t| t.id.clone()) {
                debug!(tab_id = %home, "homepage already open, activating it");
                self.switch_active_tab(&home);
                return home;
            }
            let id = self.open_homepage_tab();
            info!(tab_id = %id, "homepage tab created");
            self.present_active();
            self.notify_tabs();
            return id;
        }

        let id = TabId::new();
        self.history.init(&id, &url);
        self.registry.insert(Tab::web(id.clone(), &url), true);
        let main = self.surfaces.main_window();
        if let Err(e) = self.surfaces.load_url(&id, main, &url) {
            warn!(tab_id = %id, %url, error = %e, "initial load failed");
            if let Some(tab) = self.registry.get_mut(&id) {
                tab.loading = false;
            }
        }
        info!(tab_id = %id, %url, "web tab created");
        self.present_active();
        self.notify_tabs();
        id
    }

    /// Activates a tab. Returns false, changing nothing, for an unknown id.
    pub fn switch_active_tab(&mut self, tab_id: &TabId) -> bool {
        if self.registry.activate(tab_id).is_err() {
            debug!(%tab_id, "switch to unknown tab ignored");
            return false;
        }
        self.present_active();
        self.notify_tabs();
        true
    }

    /// Closes a tab.
    ///
    /// The Homepage tab is only really closed when it is the last tab, which
    /// shuts the shell down; with other tabs open it stays and focus moves to
    /// the first Web tab. Closing a Web tab releases its surface and history.
    /// If it was active the first remaining tab takes over, and a new
    /// Homepage tab is opened when nothing remains.
    pub fn close_tab(&mut self, tab_id: &TabId) -> Result<CloseOutcome, ShellError> {
        let tab = self
            .registry
            .get(tab_id)
            .cloned()
            .ok_or_else(|| ShellError::UnknownTab(tab_id.clone()))?;

        if tab.is_homepage() {
            if self.registry.len() == 1 {
                info!(%tab_id, "last tab was the homepage, shutting down");
                self.shutdown();
                return Ok(CloseOutcome::Shutdown);
            }
            if let Some(web) = self.registry.first_web_tab().map(|t| t.id.clone()) {
                self.registry.activate(&web)?;
            }
            self.present_active();
            self.notify_tabs();
            return Ok(CloseOutcome::HomepageKept);
        }

        let was_active = self.registry.active_id() == Some(tab_id);
        self.release_surface(tab_id);
        self.history.take(tab_id);
        self.registry.remove(tab_id)?;

        if self.registry.is_empty() {
            self.open_homepage_tab();
        } else if was_active {
            if let Some(first) = self.registry.order().first().cloned() {
                self.registry.activate(&first)?;
            }
        }
        debug!(%tab_id, "tab closed");
        self.present_active();
        self.notify_tabs();
        Ok(CloseOutcome::Closed)
    }

    /// Moves a tab in display order. Active and visible state are untouched.
    pub fn reorder_tabs(&mut self, from: usize, to: usize) -> bool {
        match self.registry.reorder(from, to) {
            Ok(()) => {
                self.notify_tabs();
                true
            }
            Err(e) => {
                debug!(error = %e, "reorder rejected");
                false
            }
        }
    }

    /// Classifies raw input with the configured search template.
    pub(super) fn classify_input(&self, input: &str) -> Result<ClassifiedInput, ShellError> {
        classify(input, &self.settings.general.search_template)
            .ok_or_else(|| ShellError::InvalidOperation("empty address".to_string()))
    }
}
