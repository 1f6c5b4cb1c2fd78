//! [`RenderEngine`] on top of `wry` child webviews in `tao` windows.
//!
//! Windows and webviews can only be built on the event loop, but the shell
//! asks for them from inside its own operations. Creation is therefore lazy:
//! the engine hands out ids at once, records what was asked for, and
//! [`WryEngine::realize`] builds the native objects the next time the event
//! loop gets control. Loads and bounds requested in between are applied when
//! the webview comes into existence.

use std::collections::HashMap;

use tao::dpi::{LogicalPosition, LogicalSize};
use tao::event_loop::{EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Window, WindowBuilder};
use tracing::{debug, warn};
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

use super::UserEvent;
use crate::engine::RenderEngine;
use crate::types::errors::SurfaceError;
use crate::types::surface::{
    Bounds, EngineEvent, LoadError, SurfaceConfig, SurfaceEvent, SurfaceId, WindowId, WindowSpec,
};

/// Back/forward list reconstructed from committed loads; wry does not
/// expose the engine's own.
#[derive(Debug, Default)]
struct NativeHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
    pending: Option<usize>,
}

impl NativeHistory {
    fn committed(&mut self, url: &str) {
        if let Some(target) = self.pending.take() {
            if target < self.entries.len() {
                self.entries[target] = url.to_string();
                self.cursor = Some(target);
                return;
            }
        }
        if self.current() == Some(url) {
            return;
        }
        let next = self.cursor.map(|c| c + 1).unwrap_or(0);
        self.entries.truncate(next);
        self.entries.push(url.to_string());
        self.cursor = Some(next);
    }

    fn current(&self) -> Option<&str> {
        self.cursor.and_then(|c| self.entries.get(c)).map(String::as_str)
    }

    fn can_go_back(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    fn can_go_forward(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }
}

struct WindowSlot {
    spec: WindowSpec,
    native: Option<Window>,
}

struct SurfaceSlot {
    window: WindowId,
    bounds: Bounds,
    visible: bool,
    config: SurfaceConfig,
    pending_url: Option<String>,
    view: Option<WebView>,
    history: NativeHistory,
}

pub struct WryEngine {
    proxy: EventLoopProxy<UserEvent>,
    main: WindowId,
    next_id: u64,
    windows: HashMap<WindowId, WindowSlot>,
    surfaces: HashMap<SurfaceId, SurfaceSlot>,
}

fn rect(bounds: Bounds) -> Rect {
    Rect {
        position: LogicalPosition::new(bounds.x, bounds.y).into(),
        size: LogicalSize::new(bounds.width, bounds.height).into(),
    }
}

fn load_error(code: &str, err: impl ToString) -> LoadError {
    LoadError {
        code: code.to_string(),
        description: err.to_string(),
    }
}

impl WryEngine {
    /// Takes ownership of the already built main window.
    pub fn new(proxy: EventLoopProxy<UserEvent>, main_window: Window, title: &str) -> Self {
        let main = WindowId(1);
        let scale = main_window.scale_factor();
        let size = main_window.inner_size().to_logical::<u32>(scale);
        let spec = WindowSpec {
            title: title.to_string(),
            bounds: Bounds::new(0, 0, size.width, size.height),
            min_width: 0,
            min_height: 0,
        };
        let mut windows = HashMap::new();
        windows.insert(
            main,
            WindowSlot {
                spec,
                native: Some(main_window),
            },
        );
        Self {
            proxy,
            main,
            next_id: 2,
            windows,
            surfaces: HashMap::new(),
        }
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn native_window(&self, window: WindowId) -> Option<&Window> {
        self.windows.get(&window).and_then(|w| w.native.as_ref())
    }

    fn window_for_native(&self, native: tao::window::WindowId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, slot)| slot.native.as_ref().map(|w| w.id()) == Some(native))
            .map(|(id, _)| *id)
    }

    fn slot_mut(&mut self, surface: SurfaceId) -> Result<&mut SurfaceSlot, SurfaceError> {
        self.surfaces
            .get_mut(&surface)
            .ok_or(SurfaceError::UnknownSurface(surface))
    }

    fn send(&self, event: EngineEvent) {
        if self.proxy.send_event(UserEvent::Engine(event)).is_err() {
            debug!("event loop gone, engine event dropped");
        }
    }

    /// Builds every window and webview requested since the last call.
    pub fn realize(&mut self, target: &EventLoopWindowTarget<UserEvent>) {
        let mut failed_windows = Vec::new();
        for (id, slot) in self.windows.iter_mut().filter(|(_, s)| s.native.is_none()) {
            let b = slot.spec.bounds;
            let built = WindowBuilder::new()
                .with_title(slot.spec.title.as_str())
                .with_position(LogicalPosition::new(b.x, b.y))
                .with_inner_size(LogicalSize::new(b.width, b.height))
                .with_min_inner_size(LogicalSize::new(slot.spec.min_width, slot.spec.min_height))
                .build(target);
            match built {
                Ok(w) => slot.native = Some(w),
                Err(e) => {
                    warn!(window = %id, error = %e, "window could not be built");
                    failed_windows.push(*id);
                }
            }
        }
        for id in failed_windows {
            self.windows.remove(&id);
            self.surfaces.retain(|_, s| s.window != id);
            self.send(EngineEvent::WindowClosed { window: id });
        }

        let pending: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, s)| s.view.is_none())
            .map(|(id, _)| *id)
            .collect();
        for id in pending {
            if let Err(e) = self.build_view(id) {
                warn!(surface = %id, error = %e, "webview could not be built");
                let url = self
                    .surfaces
                    .remove(&id)
                    .and_then(|s| s.pending_url)
                    .unwrap_or_default();
                self.send(EngineEvent::Surface {
                    surface: id,
                    event: SurfaceEvent::FinishedLoading {
                        url,
                        title: String::new(),
                        error: Some(load_error("ERR_SURFACE_CREATION", e)),
                    },
                });
            }
        }
    }

    fn build_view(&mut self, id: SurfaceId) -> Result<(), SurfaceError> {
        let Some(slot) = self.surfaces.get(&id) else {
            return Ok(());
        };
        let window = self
            .windows
            .get(&slot.window)
            .and_then(|w| w.native.as_ref())
            .ok_or(SurfaceError::UnknownWindow(slot.window))?;

        let nav = self.proxy.clone();
        let load = self.proxy.clone();
        let title = self.proxy.clone();
        let popup = self.proxy.clone();
        let mut builder = WebViewBuilder::new()
            .with_bounds(rect(slot.bounds))
            .with_visible(slot.visible)
            .with_devtools(slot.config.devtools)
            .with_navigation_handler(move |url| {
                let _ = nav.send_event(UserEvent::Engine(EngineEvent::Surface {
                    surface: id,
                    event: SurfaceEvent::Navigated { url },
                }));
                true
            })
            .with_on_page_load_handler(move |event, url| {
                if let PageLoadEvent::Finished = event {
                    let _ = load.send_event(UserEvent::Engine(EngineEvent::Surface {
                        surface: id,
                        event: SurfaceEvent::FinishedLoading {
                            url,
                            title: String::new(),
                            error: None,
                        },
                    }));
                }
            })
            .with_document_title_changed_handler(move |t| {
                let _ = title.send_event(UserEvent::Engine(EngineEvent::Surface {
                    surface: id,
                    event: SurfaceEvent::TitleChanged { title: t },
                }));
            })
            .with_new_window_req_handler(move |url, _features| {
                let _ = popup.send_event(UserEvent::OpenTab(url));
                wry::NewWindowResponse::Deny
            });
        if let Some(url) = slot.pending_url.as_deref() {
            builder = builder.with_url(url);
        }
        let view = builder
            .build_as_child(window)
            .map_err(|e| SurfaceError::SurfaceCreation(e.to_string()))?;
        if let Some(slot) = self.surfaces.get_mut(&id) {
            slot.pending_url = None;
            slot.view = Some(view);
        }
        Ok(())
    }

    /// Keeps native history in step with committed loads. Call with every
    /// engine event before handing it to the shell.
    pub fn observe(&mut self, event: &EngineEvent) {
        if let EngineEvent::Surface {
            surface,
            event: SurfaceEvent::FinishedLoading { url, error: None, .. },
        } = event
        {
            if let Some(slot) = self.surfaces.get_mut(surface) {
                slot.history.committed(url);
            }
        }
    }

    /// The user asked to close a native window. Secondary windows go away
    /// with their webviews; the main window is left to the shell's shutdown.
    pub fn close_requested(&mut self, native: tao::window::WindowId) -> Option<EngineEvent> {
        let window = self.window_for_native(native)?;
        if window != self.main {
            self.surfaces.retain(|_, s| s.window != window);
            self.windows.remove(&window);
        }
        Some(EngineEvent::WindowClosed { window })
    }

    pub fn resized(&mut self, native: tao::window::WindowId) -> Option<EngineEvent> {
        let window = self.window_for_native(native)?;
        let bounds = self.window_bounds(window).ok()?;
        Some(EngineEvent::WindowResized {
            window,
            width: bounds.width,
            height: bounds.height,
        })
    }
}

impl RenderEngine for WryEngine {
    fn main_window(&self) -> WindowId {
        self.main
    }

    fn window_bounds(&self, window: WindowId) -> Result<Bounds, SurfaceError> {
        let slot = self
            .windows
            .get(&window)
            .ok_or(SurfaceError::UnknownWindow(window))?;
        let Some(native) = slot.native.as_ref() else {
            return Ok(slot.spec.bounds);
        };
        let scale = native.scale_factor();
        let size = native.inner_size().to_logical::<u32>(scale);
        let pos = native
            .outer_position()
            .map(|p| p.to_logical::<i32>(scale))
            .unwrap_or_else(|_| LogicalPosition::new(slot.spec.bounds.x, slot.spec.bounds.y));
        Ok(Bounds::new(pos.x, pos.y, size.width, size.height))
    }

    fn create_window(&mut self, spec: &WindowSpec) -> Result<WindowId, SurfaceError> {
        let id = WindowId(self.alloc());
        self.windows.insert(
            id,
            WindowSlot {
                spec: spec.clone(),
                native: None,
            },
        );
        debug!(window = %id, "window requested");
        Ok(id)
    }

    fn close_window(&mut self, window: WindowId) -> Result<(), SurfaceError> {
        if window == self.main {
            return Err(SurfaceError::Teardown("the main window closes with the app".into()));
        }
        self.surfaces.retain(|_, s| s.window != window);
        self.windows
            .remove(&window)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownWindow(window))
    }

    fn create_surface(
        &mut self,
        window: WindowId,
        bounds: Bounds,
        config: &SurfaceConfig,
    ) -> Result<SurfaceId, SurfaceError> {
        if !self.windows.contains_key(&window) {
            return Err(SurfaceError::UnknownWindow(window));
        }
        let id = SurfaceId(self.alloc());
        self.surfaces.insert(
            id,
            SurfaceSlot {
                window,
                bounds,
                visible: false,
                config: config.clone(),
                pending_url: None,
                view: None,
                history: NativeHistory::default(),
            },
        );
        Ok(id)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        self.surfaces
            .remove(&surface)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownSurface(surface))
    }

    fn set_bounds(&mut self, surface: SurfaceId, bounds: Bounds) -> Result<(), SurfaceError> {
        let slot = self.slot_mut(surface)?;
        slot.bounds = bounds;
        if let Some(view) = slot.view.as_ref() {
            view.set_bounds(rect(bounds))
                .map_err(|e| SurfaceError::Navigation(e.to_string()))?;
        }
        Ok(())
    }

    fn set_visible(&mut self, surface: SurfaceId, visible: bool) -> Result<(), SurfaceError> {
        let slot = self.slot_mut(surface)?;
        slot.visible = visible;
        if let Some(view) = slot.view.as_ref() {
            view.set_visible(visible)
                .map_err(|e| SurfaceError::Navigation(e.to_string()))?;
        }
        Ok(())
    }

    fn load_url(&mut self, surface: SurfaceId, url: &str) -> Result<(), SurfaceError> {
        let slot = self.slot_mut(surface)?;
        slot.history.pending = None;
        match slot.view.as_ref() {
            Some(view) => view.load_url(url).map_err(|e| SurfaceError::LoadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            None => {
                slot.pending_url = Some(url.to_string());
                Ok(())
            }
        }
    }

    fn reload(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        let slot = self.slot_mut(surface)?;
        if let Some(view) = slot.view.as_ref() {
            view.evaluate_script("location.reload()")
                .map_err(|e| SurfaceError::Navigation(e.to_string()))?;
        }
        Ok(())
    }

    fn current_url(&self, surface: SurfaceId) -> Option<String> {
        let slot = self.surfaces.get(&surface)?;
        slot.history
            .current()
            .map(str::to_string)
            .or_else(|| slot.pending_url.clone())
    }

    fn can_go_back(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .get(&surface)
            .map(|s| s.history.can_go_back())
            .unwrap_or(false)
    }

    fn can_go_forward(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .get(&surface)
            .map(|s| s.history.can_go_forward())
            .unwrap_or(false)
    }

    fn go_back(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        let slot = self.slot_mut(surface)?;
        let target = match slot.history.cursor {
            Some(c) if c > 0 => c - 1,
            _ => return Err(SurfaceError::Navigation("no native back entry".into())),
        };
        slot.history.pending = Some(target);
        if let Some(view) = slot.view.as_ref() {
            view.evaluate_script("history.back()")
                .map_err(|e| SurfaceError::Navigation(e.to_string()))?;
        }
        Ok(())
    }

    fn go_forward(&mut self, surface: SurfaceId) -> Result<(), SurfaceError> {
        let slot = self.slot_mut(surface)?;
        let target = match slot.history.cursor {
            Some(c) if c + 1 < slot.history.entries.len() => c + 1,
            _ => return Err(SurfaceError::Navigation("no native forward entry".into())),
        };
        slot.history.pending = Some(target);
        if let Some(view) = slot.view.as_ref() {
            view.evaluate_script("history.forward()")
                .map_err(|e| SurfaceError::Navigation(e.to_string()))?;
        }
        Ok(())
    }
}
