use tracing::{debug, info, warn};

use super::Shell;
use crate::engine::RenderEngine;
use crate::managers::detach_coordinator::DetachedWindowRecord;
use crate::managers::tab_registry::TabRegistryTrait;
use crate::types::history::GlobalHistoryItem;
use crate::types::intent::ShellEvent;
use crate::types::permission::{PermissionDecision, PermissionType};
use crate::types::surface::{EngineEvent, LoadError, SurfaceEvent, SurfaceId, WindowId};
use crate::types::tab::{is_internal_url, Tab, TabId};

impl<E: RenderEngine> Shell<E> {
    /// Applies one engine callback. Events from surfaces that were destroyed
    /// in the meantime resolve to no tab and are dropped.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if self.shut_down {
            return;
        }
        match event {
            EngineEvent::WindowClosed { window } => self.on_window_closed(window),
            EngineEvent::WindowResized { window, width, height } => {
                debug!(%window, width, height, "window resized");
                if let Err(e) = self.surfaces.relayout_window(window) {
                    warn!(%window, error = %e, "relayout failed");
                }
            }
            EngineEvent::Surface { surface, event } => self.on_surface_event(surface, event),
        }
    }

    fn on_window_closed(&mut self, window: WindowId) {
        if window == self.surfaces.main_window() {
            info!("main window closed");
            self.shutdown();
            return;
        }
        let Some(tab_id) = self.detached.by_window(window).map(|r| r.tab_id().clone()) else {
            debug!(%window, "close of unknown window ignored");
            return;
        };
        // The tab goes with its window; there is no path back to the main window.
        self.detached.remove(&tab_id);
        self.surfaces.forget_window(window);
        info!(%tab_id, %window, "detached window closed by user, tab dropped");
    }

    fn on_surface_event(&mut self, surface: SurfaceId, event: SurfaceEvent) {
        let Some(tab_id) = self.surfaces.route(surface, event.kind()).cloned() else {
            debug!(%surface, kind = ?event.kind(), "event from destroyed surface dropped");
            return;
        };

        match event {
            SurfaceEvent::TitleChanged { title } => {
                self.apply_to_tab(&tab_id, |t| t.title = title.clone(), |r| r.tab.title = title.clone());
            }
            SurfaceEvent::Navigated { url } | SurfaceEvent::InPageNavigated { url } => {
                self.apply_to_tab(
                    &tab_id,
                    |t| t.url = url.clone(),
                    |r| {
                        r.url = url.clone();
                        r.tab.url = url.clone();
                    },
                );
            }
            SurfaceEvent::FinishedLoading { url, title, error } => {
                self.on_finished_loading(&tab_id, url, title, error);
            }
            SurfaceEvent::PermissionRequested {
                request_id,
                requesting_url,
                permission,
            } => {
                self.route_permission(surface, request_id, &requesting_url, permission);
            }
        }
    }

    /// Runs `on_tab` against a registry tab (then pushes a snapshot) or
    /// `on_record` against a detached record.
    fn apply_to_tab(
        &mut self,
        tab_id: &TabId,
        on_tab: impl FnOnce(&mut Tab),
        on_record: impl FnOnce(&mut DetachedWindowRecord),
    ) {
        if let Some(tab) = self.registry.get_mut(tab_id) {
            on_tab(tab);
            self.notify_tabs();
        } else if let Some(record) = self.detached.get_mut(tab_id) {
            on_record(record);
        }
    }

    fn on_finished_loading(&mut self, tab_id: &TabId, url: String, title: String, error: Option<LoadError>) {
        let failed = error.is_some();
        let favicon = self
            .registry
            .get(tab_id)
            .or_else(|| self.detached.get(tab_id).map(|r| &r.tab))
            .and_then(|t| t.favicon.clone());
        let ok_title = !failed && !title.is_empty();
        self.apply_to_tab(
            tab_id,
            |t| {
                t.loading = false;
                if ok_title {
                    t.title = title.clone();
                }
            },
            |r| {
                r.tab.loading = false;
                if ok_title {
                    r.tab.title = title.clone();
                }
            },
        );

        if let Some(err) = &error {
            warn!(%tab_id, %url, code = %err.code, "load failed");
        }
        self.channel.publish(ShellEvent::LoadFinished {
            tab_id: tab_id.clone(),
            url: url.clone(),
            error,
        });

        if !failed && !is_internal_url(&url) {
            let title = if title.is_empty() { url.clone() } else { title };
            self.channel.publish(ShellEvent::AddHistoryItem(GlobalHistoryItem {
                url,
                title,
                tab_id: tab_id.clone(),
                favicon,
            }));
        }
    }

    /// Answers a capability request from `surface` with the installed
    /// decider. Requests from surfaces that no longer exist are denied.
    pub fn route_permission(
        &mut self,
        surface: SurfaceId,
        request_id: u64,
        requesting_url: &str,
        permission: PermissionType,
    ) -> PermissionDecision {
        let decision = if self.surfaces.window_of(surface).is_some() {
            self.decider.decide(requesting_url, permission)
        } else {
            PermissionDecision::Deny
        };
        debug!(%surface, request_id, %requesting_url, %permission, ?decision, "permission answered");
        self.surfaces
            .engine_mut()
            .answer_permission(request_id, decision.is_granted());
        decision
    }
}
