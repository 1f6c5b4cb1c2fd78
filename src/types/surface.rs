use std::fmt;

use serde::{Deserialize, Serialize};

use super::permission::PermissionType;

/// Handle of one embedded engine viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Handle of one top-level native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Rectangle relative to the hosting window's content area, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Same size, shifted by `(dx, dy)`, saturating at the `i32` range.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }

    /// A rectangle at the origin covering the whole of `self`.
    pub fn fill(&self) -> Self {
        Self::new(0, 0, self.width, self.height)
    }
}

/// Isolation flags applied to every new surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Never expose a script bridge into page content.
    pub expose_bridge: bool,
    pub devtools: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            expose_bridge: false,
            devtools: false,
        }
    }
}

/// Parameters for a new top-level window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: String,
    pub bounds: Bounds,
    pub min_width: u32,
    pub min_height: u32,
}

/// Engine-side failure reported on a finished load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadError {
    pub code: String,
    pub description: String,
}

/// Kinds of per-surface events; the dispatch table routes on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEventKind {
    TitleChanged,
    Navigated,
    InPageNavigated,
    FinishedLoading,
    PermissionRequested,
}

impl SurfaceEventKind {
    pub const ALL: [SurfaceEventKind; 5] = [
        SurfaceEventKind::TitleChanged,
        SurfaceEventKind::Navigated,
        SurfaceEventKind::InPageNavigated,
        SurfaceEventKind::FinishedLoading,
        SurfaceEventKind::PermissionRequested,
    ];
}

/// Event raised by a surface after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    TitleChanged { title: String },
    Navigated { url: String },
    InPageNavigated { url: String },
    FinishedLoading {
        url: String,
        title: String,
        error: Option<LoadError>,
    },
    PermissionRequested {
        request_id: u64,
        requesting_url: String,
        permission: PermissionType,
    },
}

impl SurfaceEvent {
    pub fn kind(&self) -> SurfaceEventKind {
        match self {
            SurfaceEvent::TitleChanged { .. } => SurfaceEventKind::TitleChanged,
            SurfaceEvent::Navigated { .. } => SurfaceEventKind::Navigated,
            SurfaceEvent::InPageNavigated { .. } => SurfaceEventKind::InPageNavigated,
            SurfaceEvent::FinishedLoading { .. } => SurfaceEventKind::FinishedLoading,
            SurfaceEvent::PermissionRequested { .. } => SurfaceEventKind::PermissionRequested,
        }
    }
}

/// Everything the engine pushes back into the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Surface {
        surface: SurfaceId,
        event: SurfaceEvent,
    },
    WindowResized {
        window: WindowId,
        width: u32,
        height: u32,
    },
    WindowClosed {
        window: WindowId,
    },
}
