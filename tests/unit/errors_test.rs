use noxx::types::errors::*;
use noxx::types::surface::{SurfaceId, WindowId};
use noxx::types::tab::TabId;

// === ShellError Tests ===

#[test]
fn shell_error_display_variants() {
    assert_eq!(
        ShellError::UnknownTab(TabId::from("tab-123")).to_string(),
        "Unknown tab: tab-123"
    );
    assert_eq!(
        ShellError::InvalidOperation("the homepage cannot be detached".to_string()).to_string(),
        "Invalid operation: the homepage cannot be detached"
    );
    assert_eq!(
        ShellError::SurfaceLoadFailure {
            url: "https://example.com".to_string(),
            reason: "refused".to_string()
        }
        .to_string(),
        "Surface load failure for https://example.com: refused"
    );
}

#[test]
fn shell_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(ShellError::UnknownTab(TabId::from("id")));
    assert!(err.source().is_none());
}

#[test]
fn surface_error_maps_into_shell_error() {
    assert_eq!(
        ShellError::from(SurfaceError::Teardown("busy".to_string())),
        ShellError::ResourceTeardownFailure("busy".to_string())
    );
    assert_eq!(
        ShellError::from(SurfaceError::LoadFailed {
            url: "https://example.com".to_string(),
            reason: "offline".to_string()
        }),
        ShellError::SurfaceLoadFailure {
            url: "https://example.com".to_string(),
            reason: "offline".to_string()
        }
    );
    assert_eq!(
        ShellError::from(SurfaceError::UnknownWindow(WindowId(4))),
        ShellError::Engine("Unknown window: window#4".to_string())
    );
}

// === SurfaceError Tests ===

#[test]
fn surface_error_display_variants() {
    assert_eq!(
        SurfaceError::UnknownSurface(SurfaceId(9)).to_string(),
        "Unknown surface: surface#9"
    );
    assert_eq!(
        SurfaceError::WindowCreation("display unavailable".to_string()).to_string(),
        "Failed to create window: display unavailable"
    );
    assert_eq!(
        SurfaceError::Navigation("no back entry".to_string()).to_string(),
        "Navigation failed: no back entry"
    );
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("layout.nope".to_string()).to_string(),
        "Invalid settings key: layout.nope"
    );
    assert_eq!(
        SettingsError::IoError("disk full".to_string()).to_string(),
        "Settings IO error: disk full"
    );
}

// === HistoryError / PermissionError Tests ===

#[test]
fn history_error_display_variants() {
    assert_eq!(
        HistoryError::NotFound("h1".to_string()).to_string(),
        "History entry not found: h1"
    );
    assert_eq!(HistoryError::RecordingDisabled.to_string(), "History recording is disabled");
}

#[test]
fn sqlite_errors_convert() {
    let history: HistoryError = rusqlite::Error::InvalidQuery.into();
    assert!(matches!(history, HistoryError::DatabaseError(_)));
    let permission: PermissionError = rusqlite::Error::InvalidQuery.into();
    assert!(matches!(permission, PermissionError::DatabaseError(_)));
}
