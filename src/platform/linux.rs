// Config: $XDG_CONFIG_HOME/noxx or ~/.config/noxx
// Data:   $XDG_DATA_HOME/noxx or ~/.local/share/noxx

use std::env;
use std::path::PathBuf;

fn home() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("noxx"),
        _ => home().join(".config").join("noxx"),
    }
}

pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("noxx"),
        _ => home().join(".local").join("share").join("noxx"),
    }
}
