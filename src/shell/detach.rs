use tracing::{info, warn};

use super::Shell;
use crate::engine::RenderEngine;
use crate::managers::detach_coordinator::{DetachState, DetachedWindowRecord};
use crate::managers::navigation_history::{NavigationHistoryTrait, TabHistory};
use crate::managers::tab_registry::TabRegistryTrait;
use crate::types::errors::ShellError;
use crate::types::intent::ShellEvent;
use crate::types::surface::{WindowId, WindowSpec};
use crate::types::tab::TabId;

impl<E: RenderEngine> Shell<E> {
    /// Moves a Web tab into its own top-level window.
    ///
    /// The new window sits offset from the main window at the same size and
    /// holds a single full-window surface loading the tab's current url. The
    /// tab leaves the registry (a fallback tab is activated if it was active)
    /// and its original surface is destroyed.
    pub fn detach(&mut self, tab_id: &TabId) -> Result<WindowId, ShellError> {
        let tab = match self.registry.get(tab_id) {
            Some(t) => t.clone(),
            None if self.detached.contains(tab_id) => {
                return Err(ShellError::InvalidOperation(format!(
                    "tab {} is already detached",
                    tab_id
                )))
            }
            None => return Err(ShellError::UnknownTab(tab_id.clone())),
        };
        if tab.is_homepage() || tab.is_parked() {
            return Err(ShellError::InvalidOperation(
                "the homepage cannot be detached".to_string(),
            ));
        }

        self.detached.begin_detach(tab_id)?;
        let window = match self.open_detached_window(&tab.title) {
            Ok(w) => w,
            Err(e) => {
                self.detached.abort(tab_id);
                return Err(e);
            }
        };

        let original = self.surfaces.surface_of(tab_id);
        let surface = match self.surfaces.create_surface(tab_id, window) {
            Ok(s) => s,
            Err(e) => {
                if let Err(close_err) = self.surfaces.close_window(window) {
                    warn!(%window, error = %close_err, "could not close half-built window");
                }
                self.detached.abort(tab_id);
                return Err(e.into());
            }
        };
        if let Err(e) = self.surfaces.engine_mut().load_url(surface, &tab.url) {
            warn!(%tab_id, url = %tab.url, error = %e, "detached surface failed to start loading");
        }
        if let Err(e) = self.surfaces.show(window, Some(surface)) {
            warn!(%window, error = %e, "detached surface not shown");
        }

        let was_active = self.registry.active_id() == Some(tab_id);
        let tab = self.registry.remove(tab_id)?;
        let history = self
            .history
            .take(tab_id)
            .unwrap_or_else(|| TabHistory::starting_at(&tab.url));
        if let Some(old) = original {
            if let Err(e) = self.surfaces.destroy_surface_id(old) {
                warn!(%tab_id, surface = %old, error = %e, "original surface teardown failed, continuing");
            }
        }

        if self.registry.is_empty() {
            self.open_homepage_tab();
        } else if was_active {
            if let Some(first) = self.registry.order().first().cloned() {
                self.registry.activate(&first)?;
            }
        }
        self.present_active();

        let url = tab.url.clone();
        self.detached.complete_detach(DetachedWindowRecord {
            tab,
            window,
            surface,
            url,
            history,
            state: DetachState::Detaching,
        });
        info!(%tab_id, %window, "tab detached");
        self.notify_tabs();
        Ok(window)
    }

    fn open_detached_window(&mut self, title: &str) -> Result<WindowId, ShellError> {
        let main = self.surfaces.main_window();
        let source = self.surfaces.engine().window_bounds(main)?;
        let offset = self.settings.window.detach_offset;
        let spec = WindowSpec {
            title: title.to_string(),
            bounds: source.offset(offset, offset),
            min_width: self.settings.window.min_width,
            min_height: self.settings.window.min_height,
        };
        Ok(self.surfaces.engine_mut().create_window(&spec)?)
    }

    /// Brings a detached tab back into the main window as the active tab.
    /// Fails with `InvalidOperation` when the tab is not detached.
    pub fn reattach(&mut self, tab_id: &TabId) -> Result<(), ShellError> {
        let record = self.detached.begin_reattach(tab_id)?;
        let window = record.window;

        let main = self.surfaces.main_window();
        let surface = match self.surfaces.create_surface(tab_id, main) {
            Ok(s) => s,
            Err(e) => {
                self.detached.cancel_reattach(record);
                return Err(e.into());
            }
        };
        if let Err(e) = self.surfaces.engine_mut().load_url(surface, &record.url) {
            warn!(%tab_id, url = %record.url, error = %e, "reattached surface failed to start loading");
        }

        if let Err(e) = self.surfaces.destroy_surface_id(record.surface) {
            warn!(%tab_id, surface = %record.surface, error = %e, "detached surface teardown failed, continuing");
        }
        if let Err(e) = self.surfaces.close_window(window) {
            let err = ShellError::from(e);
            warn!(%window, error = %err, "detached window did not close cleanly, continuing");
        }
        self.detached.complete_reattach(tab_id);

        let mut tab = record.tab;
        tab.url = record.url;
        tab.loading = true;
        let tab_record = tab.record();
        self.history.restore(tab_id, record.history);
        // Navigation inside the detached window only moved the last known url.
        self.history.record_navigation(tab_id, &tab.url);
        self.registry.insert(tab, true);
        self.present_active();

        info!(%tab_id, "tab reattached");
        self.channel.publish(ShellEvent::ReattachTab(tab_record));
        self.notify_tabs();
        Ok(())
    }
}
