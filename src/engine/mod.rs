//! Seam between the shell and an embedded web engine.
//!
//! The shell never talks to a concrete engine. Everything it needs from one
//! (windows, surfaces, loads, native history, permission answers) goes
//! through [`RenderEngine`]. Engine-originated callbacks come back as
//! [`EngineEvent`](crate::types::surface::EngineEvent)s and are fed into
//! `Shell::handle_engine_event` on the control thread.

pub mod headless;

pub use headless::HeadlessEngine;

use crate::types::errors::SurfaceError;
use crate::types::surface::{Bounds, SurfaceConfig, SurfaceId, WindowId, WindowSpec};

/// Operations the shell needs from an embedded rendering engine.
///
/// Calls that start a load return as soon as the engine accepted the request;
/// the outcome arrives later as a `FinishedLoading` surface event.
pub trait RenderEngine {
    /// The window hosting the tab strip.
    fn main_window(&self) -> WindowId;
    fn window_bounds(&self, window: WindowId) -> Result<Bounds, SurfaceError>;
    fn create_window(&mut self, spec: &WindowSpec) -> Result<WindowId, SurfaceError>;
    fn close_window(&mut self, window: WindowId) -> Result<(), SurfaceError>;

    fn create_surface(
        &mut self,
        window: WindowId,
        bounds: Bounds,
        config: &SurfaceConfig,
    ) -> Result<SurfaceId, SurfaceError>;
    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), SurfaceError>;
    fn set_bounds(&mut self, surface: SurfaceId, bounds: Bounds) -> Result<(), SurfaceError>;
    fn set_visible(&mut self, surface: SurfaceId, visible: bool) -> Result<(), SurfaceError>;

    fn load_url(&mut self, surface: SurfaceId, url: &str) -> Result<(), SurfaceError>;
    fn reload(&mut self, surface: SurfaceId) -> Result<(), SurfaceError>;
    fn current_url(&self, surface: SurfaceId) -> Option<String>;

    fn can_go_back(&self, surface: SurfaceId) -> bool;
    fn can_go_forward(&self, surface: SurfaceId) -> bool;
    fn go_back(&mut self, surface: SurfaceId) -> Result<(), SurfaceError>;
    fn go_forward(&mut self, surface: SurfaceId) -> Result<(), SurfaceError>;

    /// Delivers the answer to a `PermissionRequested` event.
    fn answer_permission(&mut self, _request_id: u64, _granted: bool) {}
}
