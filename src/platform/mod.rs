// NoxX platform paths
// Per-OS config and data directories, selected with `cfg(target_os)`.
// `NOXX_CONFIG_DIR` and `NOXX_DATA_DIR` override the platform defaults.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

pub const CONFIG_DIR_ENV: &str = "NOXX_CONFIG_DIR";
pub const DATA_DIR_ENV: &str = "NOXX_DATA_DIR";

/// Picks a non-empty override, falling back to the platform default.
fn resolve(override_value: Option<String>, platform_default: impl FnOnce() -> PathBuf) -> PathBuf {
    match override_value {
        Some(v) if !v.trim().is_empty() => PathBuf::from(v),
        _ => platform_default(),
    }
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/noxx` or `~/.config/noxx`
/// - **macOS**: `~/Library/Application Support/NoxX`
/// - **Windows**: `%APPDATA%/NoxX`
pub fn get_config_dir() -> PathBuf {
    resolve(env::var(CONFIG_DIR_ENV).ok(), || {
        #[cfg(target_os = "linux")]
        {
            linux::get_config_dir()
        }
        #[cfg(target_os = "macos")]
        {
            macos::get_config_dir()
        }
        #[cfg(target_os = "windows")]
        {
            windows::get_config_dir()
        }
    })
}

/// Directory holding `noxx.db`.
///
/// - **Linux**: `$XDG_DATA_HOME/noxx` or `~/.local/share/noxx`
/// - **macOS**: `~/Library/Application Support/NoxX`
/// - **Windows**: `%APPDATA%/NoxX`
pub fn get_data_dir() -> PathBuf {
    resolve(env::var(DATA_DIR_ENV).ok(), || {
        #[cfg(target_os = "linux")]
        {
            linux::get_data_dir()
        }
        #[cfg(target_os = "macos")]
        {
            macos::get_data_dir()
        }
        #[cfg(target_os = "windows")]
        {
            windows::get_data_dir()
        }
    })
}
