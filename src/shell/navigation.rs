use tracing::{debug, info, warn};

use super::Shell;
use crate::engine::RenderEngine;
use crate::managers::navigation_history::{plan_back, plan_forward, HistoryStep, NavigationHistoryTrait};
use crate::managers::tab_registry::TabRegistryTrait;
use crate::types::errors::ShellError;
use crate::types::tab::{TabId, TabKind, HOMEPAGE_TITLE, HOMEPAGE_URL};

/// Direction of a history step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Back,
    Forward,
}

impl<E: RenderEngine> Shell<E> {
    /// Classifies `input`, records it in the tab's shadow history (dropping
    /// any forward entries) and navigates there. Returns the location.
    pub fn load_url(&mut self, tab_id: &TabId, input: &str) -> Result<String, ShellError> {
        if !self.registry.contains(tab_id) {
            return Err(ShellError::UnknownTab(tab_id.clone()));
        }
        let url = self.classify_input(input)?.into_url();
        self.history.record_navigation(tab_id, &url);
        debug!(%tab_id, %url, "navigation recorded");
        let result = self.navigate_to(tab_id, &url);
        self.notify_tabs();
        result.map(|_| url)
    }

    pub fn go_back(&mut self, tab_id: &TabId) -> Result<Option<String>, ShellError> {
        self.step(tab_id, Direction::Back)
    }

    pub fn go_forward(&mut self, tab_id: &TabId) -> Result<Option<String>, ShellError> {
        self.step(tab_id, Direction::Forward)
    }

    /// Native history first; the shadow stacks only when the surface has
    /// nowhere to go (or there is no surface at all).
    fn step(&mut self, tab_id: &TabId, direction: Direction) -> Result<Option<String>, ShellError> {
        if !self.registry.contains(tab_id) {
            return Err(ShellError::UnknownTab(tab_id.clone()));
        }
        let plan = match direction {
            Direction::Back => plan_back(self.surfaces.can_go_back(tab_id), self.history.get(tab_id)),
            Direction::Forward => plan_forward(self.surfaces.can_go_forward(tab_id), self.history.get(tab_id)),
        };
        debug!(%tab_id, ?direction, ?plan, "history step planned");

        match plan {
            HistoryStep::Native => {
                match direction {
                    Direction::Back => self.surfaces.go_back(tab_id)?,
                    Direction::Forward => self.surfaces.go_forward(tab_id)?,
                }
                let url = self.surfaces.current_url(tab_id).or_else(|| {
                    self.registry.get(tab_id).map(|t| t.url.clone())
                });
                Ok(url)
            }
            HistoryStep::Shadow { target, .. } => {
                let moved = match direction {
                    Direction::Back => self.history.step_back(tab_id),
                    Direction::Forward => self.history.step_forward(tab_id),
                };
                if moved.as_deref() != Some(target.as_str()) {
                    return Err(ShellError::InvalidOperation(format!(
                        "shadow history for {} changed underneath",
                        tab_id
                    )));
                }
                let result = self.navigate_to(tab_id, &target);
                self.notify_tabs();
                result.map(|_| Some(target))
            }
            HistoryStep::Nothing => Ok(None),
        }
    }

    /// Reloads the tab's surface. Returns false for a tab without one.
    pub fn reload(&mut self, tab_id: &TabId) -> Result<bool, ShellError> {
        if !self.registry.contains(tab_id) {
            return Err(ShellError::UnknownTab(tab_id.clone()));
        }
        let reloaded = self.surfaces.reload(tab_id)?;
        if reloaded {
            if let Some(tab) = self.registry.get_mut(tab_id) {
                tab.loading = true;
            }
        }
        Ok(reloaded)
    }

    /// Shows `url` in the tab without touching shadow history.
    fn navigate_to(&mut self, tab_id: &TabId, url: &str) -> Result<(), ShellError> {
        if url == HOMEPAGE_URL {
            self.enter_homepage(tab_id);
            return Ok(());
        }

        if let Some(tab) = self.registry.get_mut(tab_id) {
            tab.kind = TabKind::Web;
            tab.url = url.to_string();
            tab.loading = true;
        }
        let main = self.surfaces.main_window();
        let surface = match self.surfaces.load_url(tab_id, main, url) {
            Ok(s) => s,
            Err(e) => {
                if let Some(tab) = self.registry.get_mut(tab_id) {
                    tab.loading = false;
                }
                warn!(%tab_id, %url, error = %e, "load rejected by engine");
                return Err(e.into());
            }
        };
        if self.registry.active_id() == Some(tab_id) {
            self.surfaces.show(main, Some(surface))?;
        }
        Ok(())
    }

    /// Brings a tab to the homepage location. Its surface is destroyed. It
    /// takes the Homepage role if no other tab holds it; otherwise it stays a
    /// surface-less Web tab parked on the sentinel and the existing Homepage
    /// tab is activated.
    fn enter_homepage(&mut self, tab_id: &TabId) {
        self.release_surface(tab_id);
        let other_home = self
            .registry
            .homepage_tab()
            .map(|t| t.id.clone())
            .filter(|id| id != tab_id);

        if let Some(tab) = self.registry.get_mut(tab_id) {
            tab.url = HOMEPAGE_URL.to_string();
            tab.title = HOMEPAGE_TITLE.to_string();
            tab.loading = false;
            if other_home.is_none() {
                tab.kind = TabKind::Homepage;
            }
        }

        let target = other_home.unwrap_or_else(|| tab_id.clone());
        if target != *tab_id {
            info!(%tab_id, homepage = %target, "tab parked, homepage already open");
        }
        if let Err(e) = self.registry.activate(&target) {
            warn!(error = %e, "could not activate homepage tab");
        }
        self.present_active();
    }
}
