//! The shell coordinator.
//!
//! [`Shell`] is the single writer of all tab, history, surface and
//! detached-window state. It is built once at startup, driven by UI intents
//! and engine events on the control thread, and torn down by
//! [`Shell::shutdown`]. Every operation runs to completion before the next
//! one starts; notifications leave through the sync channel in mutation
//! order.
//!
//! Operations are split by concern:
//! - `tabs`: create, switch, close, reorder
//! - `navigation`: load, back, forward, reload
//! - `detach`: detach and reattach
//! - `events`: engine callbacks and permission routing

mod detach;
mod events;
mod navigation;
mod tabs;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::engine::{HeadlessEngine, RenderEngine};
use crate::managers::detach_coordinator::DetachCoordinator;
use crate::managers::navigation_history::{NavigationHistoryStore, NavigationHistoryTrait};
use crate::managers::permission_manager::{DenyAll, PermissionDecider};
use crate::managers::surface_manager::SurfaceManager;
use crate::managers::tab_registry::{TabRegistry, TabRegistryTrait};
use crate::services::sync_channel::SyncChannel;
use crate::types::errors::ShellError;
use crate::types::intent::{Envelope, IntentOutcome, ShellEvent, UiIntent};
use crate::types::settings::{LayoutSettings, ShellSettings};
use crate::types::surface::SurfaceConfig;
use crate::types::tab::{Tab, TabId, HOMEPAGE_URL};

pub struct Shell<E: RenderEngine> {
    registry: TabRegistry,
    history: NavigationHistoryStore,
    surfaces: SurfaceManager<E>,
    detached: DetachCoordinator,
    channel: SyncChannel,
    decider: Box<dyn PermissionDecider>,
    settings: ShellSettings,
    shut_down: bool,
}

impl<E: RenderEngine> Shell<E> {
    /// A shell with no tabs. Surfaces never expose a script bridge to page
    /// content; devtools follow `settings.general.devtools`.
    pub fn new(engine: E, settings: ShellSettings) -> Self {
        let config = SurfaceConfig {
            expose_bridge: false,
            devtools: settings.general.devtools,
        };
        Self {
            registry: TabRegistry::new(),
            history: NavigationHistoryStore::new(),
            surfaces: SurfaceManager::new(engine, config, settings.layout),
            detached: DetachCoordinator::new(),
            channel: SyncChannel::new(),
            decider: Box::new(DenyAll),
            settings,
            shut_down: false,
        }
    }

    /// Installs the decision function consulted for capability requests.
    pub fn set_permission_decider(&mut self, decider: Box<dyn PermissionDecider>) {
        self.decider = decider;
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<Envelope> {
        self.channel.subscribe()
    }

    // ─── Read access ───

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    pub fn history(&self) -> &NavigationHistoryStore {
        &self.history
    }

    pub fn surfaces(&self) -> &SurfaceManager<E> {
        &self.surfaces
    }

    pub fn detached(&self) -> &DetachCoordinator {
        &self.detached
    }

    pub fn engine(&self) -> &E {
        self.surfaces.engine()
    }

    pub fn engine_mut(&mut self) -> &mut E {
        self.surfaces.engine_mut()
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // ─── Inbound intents ───

    /// Applies one UI intent and reports the result as data.
    pub fn dispatch(&mut self, intent: UiIntent) -> IntentOutcome {
        if self.shut_down {
            return IntentOutcome::failed(ShellError::InvalidOperation("shell is shut down".into()));
        }
        match intent {
            UiIntent::CreateTab { url } => {
                let id = self.create_tab(url.as_deref());
                IntentOutcome {
                    tab_id: Some(id),
                    ..IntentOutcome::ok()
                }
            }
            UiIntent::SwitchActiveTab { id } => IntentOutcome::from_bool(self.switch_active_tab(&id)),
            UiIntent::CloseTab { id } => match self.close_tab(&id) {
                Ok(close) => IntentOutcome {
                    close: Some(close),
                    ..IntentOutcome::ok()
                },
                Err(e) => IntentOutcome::failed(e),
            },
            UiIntent::ReorderTabs { from, to } => IntentOutcome::from_bool(self.reorder_tabs(from, to)),
            UiIntent::LoadUrl { tab_id, input } => match self.load_url(&tab_id, &input) {
                Ok(url) => IntentOutcome {
                    tab_id: Some(tab_id),
                    url: Some(url),
                    ..IntentOutcome::ok()
                },
                Err(e) => IntentOutcome::failed(e),
            },
            UiIntent::GoBack { tab_id } => Self::step_outcome(self.go_back(&tab_id)),
            UiIntent::GoForward { tab_id } => Self::step_outcome(self.go_forward(&tab_id)),
            UiIntent::Reload { tab_id } => match self.reload(&tab_id) {
                Ok(reloaded) => IntentOutcome::from_bool(reloaded),
                Err(e) => IntentOutcome::failed(e),
            },
            UiIntent::Detach { tab_id } => match self.detach(&tab_id) {
                Ok(_) => IntentOutcome {
                    tab_id: Some(tab_id),
                    ..IntentOutcome::ok()
                },
                Err(e) => IntentOutcome::failed(e),
            },
            UiIntent::Reattach { tab } => match self.reattach(&tab.id) {
                Ok(()) => IntentOutcome {
                    tab_id: Some(tab.id),
                    ..IntentOutcome::ok()
                },
                Err(e) => IntentOutcome::failed(e),
            },
        }
    }

    fn step_outcome(result: Result<Option<String>, ShellError>) -> IntentOutcome {
        match result {
            Ok(Some(url)) => IntentOutcome {
                url: Some(url),
                ..IntentOutcome::ok()
            },
            Ok(None) => IntentOutcome::from_bool(false),
            Err(e) => IntentOutcome::failed(e),
        }
    }

    // ─── Layout and lifecycle ───

    /// Re-reads layout settings and repositions every main-window surface.
    pub fn set_layout(&mut self, layout: LayoutSettings) {
        self.settings.layout = layout;
        self.surfaces.set_layout(layout);
        let main = self.surfaces.main_window();
        if let Err(e) = self.surfaces.relayout_window(main) {
            warn!(error = %e, "relayout after settings change failed");
        }
    }

    /// Takes new settings. Layout changes reposition surfaces right away;
    /// the rest applies from the next operation that reads it. Devtools only
    /// affect surfaces created afterwards.
    pub fn apply_settings(&mut self, settings: ShellSettings) {
        let layout = settings.layout;
        self.surfaces.set_config(SurfaceConfig {
            expose_bridge: false,
            devtools: settings.general.devtools,
        });
        self.settings = settings;
        self.set_layout(layout);
    }

    /// Destroys every surface, closes detached windows and emits the shutdown
    /// notification. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let windows: Vec<_> = self.detached.records().map(|r| r.window).collect();
        for window in windows {
            if let Err(e) = self.surfaces.close_window(window) {
                warn!(%window, error = %e, "detached window did not close cleanly");
            }
        }
        let ids: Vec<TabId> = self.detached.records().map(|r| r.tab_id().clone()).collect();
        for id in ids {
            self.detached.remove(&id);
        }
        for surface in self.surfaces.all_surfaces() {
            if let Err(e) = self.surfaces.destroy_surface_id(surface) {
                warn!(%surface, error = %e, "surface teardown failed during shutdown");
            }
        }
        self.shut_down = true;
        self.channel.publish(ShellEvent::Shutdown);
        info!("shell shut down");
    }

    // ─── Shared helpers ───

    fn notify_tabs(&mut self) {
        self.channel
            .publish(ShellEvent::TabsUpdated(self.registry.snapshot()));
    }

    /// Destroys the tab's surface; a teardown failure is logged and the
    /// caller's bookkeeping goes ahead.
    fn release_surface(&mut self, tab_id: &TabId) {
        if let Err(e) = self.surfaces.destroy_surface(tab_id) {
            let err = ShellError::from(e);
            warn!(%tab_id, error = %err, "surface teardown failed, continuing");
        }
    }

    /// Adds a fresh Homepage tab, active.
    fn open_homepage_tab(&mut self) -> TabId {
        let id = TabId::new();
        self.history.init(&id, HOMEPAGE_URL);
        self.registry.insert(Tab::homepage(id.clone()), true);
        id
    }

    /// Makes the main window show what the active tab needs: its surface for a
    /// Web tab (recreated if it was dropped), nothing for the Homepage tab or a
    /// parked tab.
    fn present_active(&mut self) {
        let main = self.surfaces.main_window();
        let surface = match self.registry.active().cloned() {
            Some(tab) if !tab.is_homepage() && !tab.is_parked() => {
                match self.surfaces.surface_of(&tab.id) {
                    Some(s) => Some(s),
                    None => match self.surfaces.load_url(&tab.id, main, &tab.url) {
                        Ok(s) => Some(s),
                        Err(e) => {
                            warn!(tab_id = %tab.id, error = %e, "could not recreate surface");
                            None
                        }
                    },
                }
            }
            _ => None,
        };
        if let Err(e) = self.surfaces.show(main, surface) {
            warn!(error = %e, "could not update visible surface");
        }
    }
}

impl Shell<HeadlessEngine> {
    /// Delivers every queued engine event, including ones raised while
    /// handling earlier events.
    pub fn settle(&mut self) {
        loop {
            let events = self.surfaces.engine_mut().drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle_engine_event(event);
            }
        }
    }
}
