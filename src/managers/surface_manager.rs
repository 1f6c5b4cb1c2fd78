use std::collections::HashMap;

use tracing::{debug, warn};

use crate::engine::RenderEngine;
use crate::types::errors::SurfaceError;
use crate::types::settings::LayoutSettings;
use crate::types::surface::{Bounds, SurfaceConfig, SurfaceEventKind, SurfaceId, WindowId};
use crate::types::tab::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    tab_id: TabId,
    window: WindowId,
}

/// Owns the render engine and every surface created through it.
///
/// Surfaces hold only a tab id back-reference. Engine events are routed
/// through a dispatch table keyed by event kind; a surface's entries are
/// registered when it is created and removed when it is destroyed, so late
/// events from a destroyed surface resolve to nothing.
pub struct SurfaceManager<E: RenderEngine> {
    engine: E,
    config: SurfaceConfig,
    layout: LayoutSettings,
    by_tab: HashMap<TabId, SurfaceId>,
    bindings: HashMap<SurfaceId, Binding>,
    dispatch: HashMap<SurfaceEventKind, HashMap<SurfaceId, TabId>>,
    visible: HashMap<WindowId, Option<SurfaceId>>,
}

impl<E: RenderEngine> SurfaceManager<E> {
    pub fn new(engine: E, config: SurfaceConfig, layout: LayoutSettings) -> Self {
        Self {
            engine,
            config,
            layout,
            by_tab: HashMap::new(),
            bindings: HashMap::new(),
            dispatch: HashMap::new(),
            visible: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn main_window(&self) -> WindowId {
        self.engine.main_window()
    }

    pub fn layout(&self) -> LayoutSettings {
        self.layout
    }

    pub fn set_layout(&mut self, layout: LayoutSettings) {
        self.layout = layout;
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Applies to surfaces created from now on.
    pub fn set_config(&mut self, config: SurfaceConfig) {
        self.config = config;
    }

    /// Where a surface goes in `window`: the content area below the chrome in
    /// the main window, the whole window anywhere else.
    pub fn bounds_for(&self, window: WindowId) -> Result<Bounds, SurfaceError> {
        let outer = self.engine.window_bounds(window)?;
        if window == self.engine.main_window() {
            Ok(self.layout.content_bounds(outer.width, outer.height))
        } else {
            Ok(outer.fill())
        }
    }

    // ─── Lifecycle ───

    /// Creates a hidden surface for `tab_id` in `window` and registers its
    /// dispatch entries. The tab's previous surface, if any, stays registered
    /// until it is destroyed by id.
    pub fn create_surface(&mut self, tab_id: &TabId, window: WindowId) -> Result<SurfaceId, SurfaceError> {
        let bounds = self.bounds_for(window)?;
        let surface = self.engine.create_surface(window, bounds, &self.config)?;
        self.bindings.insert(
            surface,
            Binding {
                tab_id: tab_id.clone(),
                window,
            },
        );
        for kind in SurfaceEventKind::ALL {
            self.dispatch
                .entry(kind)
                .or_default()
                .insert(surface, tab_id.clone());
        }
        self.by_tab.insert(tab_id.clone(), surface);
        debug!(%tab_id, %surface, %window, "surface created");
        Ok(surface)
    }

    /// Tears down the tab's surface. No-op returning `Ok(false)` when the tab
    /// has none.
    pub fn destroy_surface(&mut self, tab_id: &TabId) -> Result<bool, SurfaceError> {
        match self.by_tab.get(tab_id).copied() {
            Some(surface) => self.destroy_surface_id(surface).map(|_| true),
            None => Ok(false),
        }
    }

    /// Deregisters `surface` and asks the engine to release it. Bookkeeping is
    /// released even when the engine reports a teardown failure.
    pub fn destroy_surface_id(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        let Some(binding) = self.deregister(surface) else {
            return Ok(());
        };
        if let Err(e) = self.engine.set_visible(surface, false) {
            debug!(%surface, error = %e, "hide before destroy failed");
        }
        debug!(tab_id = %binding.tab_id, %surface, "destroying surface");
        self.engine.destroy_surface(surface)
    }

    fn deregister(&mut self, surface: SurfaceId) -> Option<Binding> {
        let binding = self.bindings.remove(&surface)?;
        for table in self.dispatch.values_mut() {
            table.remove(&surface);
        }
        if self.by_tab.get(&binding.tab_id) == Some(&surface) {
            self.by_tab.remove(&binding.tab_id);
        }
        if let Some(slot) = self.visible.get_mut(&binding.window) {
            if *slot == Some(surface) {
                *slot = None;
            }
        }
        Some(binding)
    }

    /// Drops bookkeeping for every surface in a window the engine already
    /// closed. Returns the tabs that lost their surface.
    pub fn forget_window(&mut self, window: WindowId) -> Vec<TabId> {
        let gone: Vec<SurfaceId> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.window == window)
            .map(|(s, _)| *s)
            .collect();
        self.visible.remove(&window);
        gone.into_iter()
            .filter_map(|s| self.deregister(s))
            .map(|b| b.tab_id)
            .collect()
    }

    /// Closes a window through the engine and forgets its surfaces.
    pub fn close_window(&mut self, window: WindowId) -> Result<(), SurfaceError> {
        self.forget_window(window);
        self.engine.close_window(window)
    }

    // ─── Lookup ───

    pub fn surface_of(&self, tab_id: &TabId) -> Option<SurfaceId> {
        self.by_tab.get(tab_id).copied()
    }

    pub fn has_surface(&self, tab_id: &TabId) -> bool {
        self.by_tab.contains_key(tab_id)
    }

    pub fn window_of(&self, surface: SurfaceId) -> Option<WindowId> {
        self.bindings.get(&surface).map(|b| b.window)
    }

    /// Resolves a surface event to its tab through the dispatch table.
    pub fn route(&self, surface: SurfaceId, kind: SurfaceEventKind) -> Option<&TabId> {
        self.dispatch.get(&kind).and_then(|t| t.get(&surface))
    }

    pub fn live_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn visible_surface(&self, window: WindowId) -> Option<SurfaceId> {
        self.visible.get(&window).copied().flatten()
    }

    // ─── Visibility and geometry ───

    /// Makes `surface` the only visible surface of `window`, or hides the
    /// current one when `surface` is `None`. The previous surface is hidden
    /// before the new one is shown.
    pub fn show(&mut self, window: WindowId, surface: Option<SurfaceId>) -> Result<(), SurfaceError> {
        let previous = self.visible_surface(window);
        if previous == surface {
            return Ok(());
        }
        if let Some(prev) = previous {
            if let Err(e) = self.engine.set_visible(prev, false) {
                warn!(surface = %prev, error = %e, "failed to hide surface");
            }
        }
        self.visible.insert(window, None);
        if let Some(next) = surface {
            self.engine.set_visible(next, true)?;
            self.visible.insert(window, Some(next));
        }
        Ok(())
    }

    /// Repositions the tab's surface. No-op for a tab without one.
    pub fn resize(&mut self, tab_id: &TabId, bounds: Bounds) -> Result<(), SurfaceError> {
        match self.surface_of(tab_id) {
            Some(surface) => self.engine.set_bounds(surface, bounds),
            None => Ok(()),
        }
    }

    /// Recomputes the bounds of every tab surface hosted in `window`.
    pub fn relayout_window(&mut self, window: WindowId) -> Result<(), SurfaceError> {
        let bounds = self.bounds_for(window)?;
        let tabs: Vec<TabId> = self
            .by_tab
            .iter()
            .filter(|(_, s)| self.window_of(**s) == Some(window))
            .map(|(t, _)| t.clone())
            .collect();
        for tab_id in tabs {
            self.resize(&tab_id, bounds)?;
        }
        Ok(())
    }

    // ─── Navigation primitives ───

    /// Loads `url` into the tab's surface, creating one in `window` first if
    /// the tab has none.
    pub fn load_url(&mut self, tab_id: &TabId, window: WindowId, url: &str) -> Result<SurfaceId, SurfaceError> {
        let surface = match self.surface_of(tab_id) {
            Some(s) => s,
            None => self.create_surface(tab_id, window)?,
        };
        self.engine.load_url(surface, url)?;
        Ok(surface)
    }

    pub fn reload(&mut self, tab_id: &TabId) -> Result<bool, SurfaceError> {
        match self.surface_of(tab_id) {
            Some(s) => self.engine.reload(s).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn can_go_back(&self, tab_id: &TabId) -> bool {
        self.surface_of(tab_id)
            .map(|s| self.engine.can_go_back(s))
            .unwrap_or(false)
    }

    pub fn can_go_forward(&self, tab_id: &TabId) -> bool {
        self.surface_of(tab_id)
            .map(|s| self.engine.can_go_forward(s))
            .unwrap_or(false)
    }

    pub fn go_back(&mut self, tab_id: &TabId) -> Result<(), SurfaceError> {
        let surface = self
            .surface_of(tab_id)
            .ok_or_else(|| SurfaceError::Navigation(format!("tab {} has no surface", tab_id)))?;
        self.engine.go_back(surface)
    }

    pub fn go_forward(&mut self, tab_id: &TabId) -> Result<(), SurfaceError> {
        let surface = self
            .surface_of(tab_id)
            .ok_or_else(|| SurfaceError::Navigation(format!("tab {} has no surface", tab_id)))?;
        self.engine.go_forward(surface)
    }

    pub fn current_url(&self, tab_id: &TabId) -> Option<String> {
        self.surface_of(tab_id)
            .and_then(|s| self.engine.current_url(s))
    }

    /// Every registered surface, for shutdown.
    pub fn all_surfaces(&self) -> Vec<SurfaceId> {
        self.bindings.keys().copied().collect()
    }
}
