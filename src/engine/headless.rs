//! In-memory render engine.
//!
//! Models everything the shell observes from a real engine: windows with
//! bounds, surfaces with visibility and their own native history, and an
//! event queue standing in for asynchronous callback delivery. Events only
//! reach the shell when the owner drains the queue, so tests can interleave
//! shell operations with late engine callbacks.

use std::collections::{BTreeMap, VecDeque};

use url::Url;

use super::RenderEngine;
use crate::types::errors::SurfaceError;
use crate::types::permission::PermissionType;
use crate::types::surface::{
    Bounds, EngineEvent, LoadError, SurfaceConfig, SurfaceEvent, SurfaceId, WindowId, WindowSpec,
};

const LOADABLE_SCHEMES: [&str; 5] = ["http", "https", "file", "about", "data"];

/// One top-level window.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    pub title: String,
    pub bounds: Bounds,
    pub open: bool,
}

/// One viewport and its native history.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub window: WindowId,
    pub bounds: Bounds,
    pub visible: bool,
    pub config: SurfaceConfig,
    pub history: Vec<String>,
    pub cursor: Option<usize>,
    pub reloads: u32,
}

impl HeadlessSurface {
    fn current(&self) -> Option<&String> {
        self.cursor.and_then(|i| self.history.get(i))
    }
}

pub struct HeadlessEngine {
    next_id: u64,
    next_request: u64,
    main: WindowId,
    windows: BTreeMap<WindowId, HeadlessWindow>,
    surfaces: BTreeMap<SurfaceId, HeadlessSurface>,
    events: VecDeque<EngineEvent>,
    permission_answers: Vec<(u64, bool)>,
    fail_teardown: bool,
    fail_window_creation: bool,
}

impl HeadlessEngine {
    /// Engine with a main window of the given inner size at (100, 100).
    pub fn new(width: u32, height: u32) -> Self {
        let main = WindowId(1);
        let mut windows = BTreeMap::new();
        windows.insert(
            main,
            HeadlessWindow {
                title: "NoxX Browser".to_string(),
                bounds: Bounds::new(100, 100, width, height),
                open: true,
            },
        );
        Self {
            next_id: 2,
            next_request: 1,
            main,
            windows,
            surfaces: BTreeMap::new(),
            events: VecDeque::new(),
            permission_answers: Vec::new(),
            fail_teardown: false,
            fail_window_creation: false,
        }
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn surface_mut(&mut self, surface: SurfaceId) -> Result<&mut HeadlessSurface, SurfaceError> {
        self.surfaces
            .get_mut(&surface)
            .ok_or(SurfaceError::UnknownSurface(surface))
    }

    fn push(&mut self, surface: SurfaceId, event: SurfaceEvent) {
        self.events.push_back(EngineEvent::Surface { surface, event });
    }

    fn page_title(url: &str) -> String {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| url.to_string())
    }

    /// Queues the callbacks a real engine fires after committing `url`.
    fn push_committed(&mut self, surface: SurfaceId, url: &str) {
        let title = Self::page_title(url);
        self.push(surface, SurfaceEvent::Navigated { url: url.to_string() });
        self.push(surface, SurfaceEvent::TitleChanged { title: title.clone() });
        self.push(
            surface,
            SurfaceEvent::FinishedLoading {
                url: url.to_string(),
                title,
                error: None,
            },
        );
    }

    // ─── Inspection ───

    /// Takes every queued event in delivery order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn surface(&self, surface: SurfaceId) -> Option<&HeadlessSurface> {
        self.surfaces.get(&surface)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn visible_surfaces(&self, window: WindowId) -> Vec<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.window == window && s.visible)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn window(&self, window: WindowId) -> Option<&HeadlessWindow> {
        self.windows.get(&window)
    }

    pub fn open_windows(&self) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|(_, w)| w.open)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn permission_answers(&self) -> &[(u64, bool)] {
        &self.permission_answers
    }

    // ─── Fault injection ───

    pub fn set_teardown_failure(&mut self, fail: bool) {
        self.fail_teardown = fail;
    }

    pub fn set_window_creation_failure(&mut self, fail: bool) {
        self.fail_window_creation = fail;
    }

    // ─── Simulated page and user activity ───

    /// A link click or script navigation inside the page.
    pub fn navigate_from_page(&mut self, surface: SurfaceId, url: &str) -> Result<(), SurfaceError> {
        self.load_url(surface, url)
    }

    /// A same-document navigation (hash change, `history.pushState`).
    pub fn navigate_in_page(&mut self, surface: SurfaceId, url: &str) -> Result<(), SurfaceError> {
        let s = self.surface_mut(surface)?;
        let next = s.cursor.map(|c| c + 1).unwrap_or(0);
        s.history.truncate(next);
        s.history.push(url.to_string());
        s.cursor = Some(next);
        self.push(surface, SurfaceEvent::InPageNavigated { url: url.to_string() });
        Ok(())
    }

    /// The page asks for a capability; returns the request id to answer.
    pub fn request_permission(
        &mut self,
        surface: SurfaceId,
        permission: PermissionType,
    ) -> Result<u64, SurfaceError> {
        let requesting_url = self
            .surfaces
            .get(&surface)
            .and_then(|s| s.current().cloned())
            .ok_or(SurfaceError::UnknownSurface(surface))?;
        let request_id = self.next_request;
        self.next_request += 1;
        self.push(
            surface,
            SurfaceEvent::PermissionRequested {
                request_id,
                requesting_url,
                permission,
            },
        );
        Ok(request_id)
    }

    /// The user closes a window through window-manager chrome.
    pub fn close_by_user(&mut self, window: WindowId) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.open = false;
        }
        self.surfaces.retain(|_, s| s.window != window);
        self.events.push_back(EngineEvent::WindowClosed { window });
    }

    /// The user drags a window edge.
    pub fn resize_by_user(&mut self, window: WindowId, width: u32, height: u32) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.bounds.width = width;
            w.bounds.height = height;
        }
        self.events.push_back(EngineEvent::WindowResized { window, width, height });
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

impl RenderEngine for HeadlessEngine {
    fn main_window(&self) -> WindowId {
        self.main
    }

    fn window_bounds(&self, window: WindowId) -> Result<Bounds, SurfaceError> {
        self.windows
            .get(&window)
            .filter(|w| w.open)
            .map(|w| w.bounds)
            .ok_or(SurfaceError::UnknownWindow(window))
    }

    fn create_window(&mut self, spec: &WindowSpec) -> Result<WindowId, SurfaceError> {
        if self.fail_window_creation {
            return Err(SurfaceError::WindowCreation("display unavailable".to_string()));
        }
        let id = WindowId(self.alloc());
        self.windows.insert(
            id,
            HeadlessWindow {
                title: spec.title.clone(),
                bounds: spec.bounds,
                open: true,
            },
        );
        Ok(id)
    }

    fn close_window(&mut self, window: WindowId) -> Result<(), SurfaceError> {
        if self.fail_teardown {
            return Err(SurfaceError::Teardown(format!("{} refused to close", window)));
        }
        let w = self
            .windows
            .get_mut(&window)
            .ok_or(SurfaceError::UnknownWindow(window))?;
        w.open = false;
        self.surfaces.retain(|_, s| s.window != window);
        Ok(())
    }

    fn create_surface(
        &mut self,
        window: WindowId,
        bounds: Bounds,
        config: &SurfaceConfig,
    ) -> Result<SurfaceId, SurfaceError> {
        if !self.windows.get(&window).map(|w| w.open).unwrap_or(false) {
            return Err(SurfaceError::UnknownWindow(window));
        }
        let id = SurfaceId(self.alloc());
        self.surfaces.insert(
            id,
            HeadlessSurface {
                window,
                bounds,
                visible: false,
                config: config.clone(),
                history: Vec::new(),
                cursor: None,
                reloads: 0,
            },
        );
        Ok(id)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        if !self.surfaces.contains_key(&surface) {
            return Err(SurfaceError::UnknownSurface(surface));
        }
        if self.fail_teardown {
            return Err(SurfaceError::Teardown(format!("{} is still referenced", surface)));
        }
        self.surfaces.remove(&surface);
        Ok(())
    }

    fn set_bounds(&mut self, surface: SurfaceId, bounds: Bounds) -> Result<(), SurfaceError> {
        self.surface_mut(surface)?.bounds = bounds;
        Ok(())
    }

    fn set_visible(&mut self, surface: SurfaceId, visible: bool) -> Result<(), SurfaceError> {
        self.surface_mut(surface)?.visible = visible;
        Ok(())
    }

    fn load_url(&mut self, surface: SurfaceId, url: &str) -> Result<(), SurfaceError> {
        let loadable = Url::parse(url)
            .map(|u| LOADABLE_SCHEMES.contains(&u.scheme()))
            .unwrap_or(false);
        let s = self.surface_mut(surface)?;
        if !loadable {
            self.push(
                surface,
                SurfaceEvent::FinishedLoading {
                    url: url.to_string(),
                    title: String::new(),
                    error: Some(LoadError {
                        code: "ERR_UNKNOWN_URL_SCHEME".to_string(),
                        description: format!("cannot load {}", url),
                    }),
                },
            );
            return Ok(());
        }
        let next = s.cursor.map(|c| c + 1).unwrap_or(0);
        s.history.truncate(next);
        s.history.push(url.to_string());
        s.cursor = Some(next);
        self.push_committed(surface, url);
        Ok(())
    }

    fn reload(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        let s = self.surface_mut(surface)?;
        s.reloads += 1;
        if let Some(url) = s.current().cloned() {
            let title = Self::page_title(&url);
            self.push(
                surface,
                SurfaceEvent::FinishedLoading {
                    url,
                    title,
                    error: None,
                },
            );
        }
        Ok(())
    }

    fn current_url(&self, surface: SurfaceId) -> Option<String> {
        self.surfaces.get(&surface).and_then(|s| s.current().cloned())
    }

    fn can_go_back(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .get(&surface)
            .and_then(|s| s.cursor)
            .map(|c| c > 0)
            .unwrap_or(false)
    }

    fn can_go_forward(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .get(&surface)
            .map(|s| match s.cursor {
                Some(c) => c + 1 < s.history.len(),
                None => false,
            })
            .unwrap_or(false)
    }

    fn go_back(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        if !self.can_go_back(surface) {
            return Err(SurfaceError::Navigation(format!("{} has no back entry", surface)));
        }
        let s = self.surface_mut(surface)?;
        let cursor = s.cursor.map(|c| c - 1);
        s.cursor = cursor;
        let url = s.current().cloned().unwrap_or_default();
        self.push_committed(surface, &url);
        Ok(())
    }

    fn go_forward(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        if !self.can_go_forward(surface) {
            return Err(SurfaceError::Navigation(format!("{} has no forward entry", surface)));
        }
        let s = self.surface_mut(surface)?;
        let cursor = s.cursor.map(|c| c + 1);
        s.cursor = cursor;
        let url = s.current().cloned().unwrap_or_default();
        self.push_committed(surface, &url);
        Ok(())
    }

    fn answer_permission(&mut self, request_id: u64, granted: bool) {
        self.permission_answers.push((request_id, granted));
    }
}
