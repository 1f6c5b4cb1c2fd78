use thiserror::Error;

use super::surface::{SurfaceId, WindowId};
use super::tab::TabId;

// === ShellError ===

/// Failures of coordinator operations. They are reported to callers as data
/// and never cross the core/UI boundary as panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// The referenced tab id is not present in the registry.
    #[error("Unknown tab: {0}")]
    UnknownTab(TabId),
    /// The operation is not allowed in the current state; nothing was mutated.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// The engine could not load a location.
    #[error("Surface load failure for {url}: {reason}")]
    SurfaceLoadFailure { url: String, reason: String },
    /// A surface or window could not be released at the platform level.
    #[error("Resource teardown failure: {0}")]
    ResourceTeardownFailure(String),
    /// The embedded engine refused an operation outright.
    #[error("Engine error: {0}")]
    Engine(String),
}

impl From<SurfaceError> for ShellError {
    fn from(err: SurfaceError) -> Self {
        match err {
            SurfaceError::LoadFailed { url, reason } => ShellError::SurfaceLoadFailure { url, reason },
            SurfaceError::Teardown(msg) => ShellError::ResourceTeardownFailure(msg),
            other => ShellError::Engine(other.to_string()),
        }
    }
}

// === SurfaceError ===

/// Errors raised by a render engine backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("Unknown surface: {0}")]
    UnknownSurface(SurfaceId),
    #[error("Unknown window: {0}")]
    UnknownWindow(WindowId),
    #[error("Failed to create window: {0}")]
    WindowCreation(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(String),
    #[error("Failed to load {url}: {reason}")]
    LoadFailed { url: String, reason: String },
    #[error("Teardown failed: {0}")]
    Teardown(String),
    #[error("Navigation failed: {0}")]
    Navigation(String),
}

// === SettingsError ===

/// Errors related to settings engine operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings IO error: {0}")]
    IoError(String),
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === HistoryError ===

/// Errors related to the global history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History entry not found: {0}")]
    NotFound(String),
    #[error("History database error: {0}")]
    DatabaseError(String),
    #[error("History recording is disabled")]
    RecordingDisabled,
}

impl From<rusqlite::Error> for HistoryError {
    fn from(err: rusqlite::Error) -> Self {
        HistoryError::DatabaseError(err.to_string())
    }
}

// === PermissionError ===

/// Errors related to site permission management.
#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Permission database error: {0}")]
    DatabaseError(String),
    #[error("Invalid site: {0}")]
    InvalidSite(String),
}

impl From<rusqlite::Error> for PermissionError {
    fn from(err: rusqlite::Error) -> Self {
        PermissionError::DatabaseError(err.to_string())
    }
}
