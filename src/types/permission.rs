use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Capabilities a page can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionType {
    Camera,
    Microphone,
    Geolocation,
    Notifications,
    Clipboard,
    Midi,
    Fullscreen,
    PointerLock,
}

impl PermissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionType::Camera => "camera",
            PermissionType::Microphone => "microphone",
            PermissionType::Geolocation => "geolocation",
            PermissionType::Notifications => "notifications",
            PermissionType::Clipboard => "clipboard",
            PermissionType::Midi => "midi",
            PermissionType::Fullscreen => "fullscreen",
            PermissionType::PointerLock => "pointer_lock",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camera" => Ok(PermissionType::Camera),
            "microphone" => Ok(PermissionType::Microphone),
            "geolocation" => Ok(PermissionType::Geolocation),
            "notifications" => Ok(PermissionType::Notifications),
            "clipboard" => Ok(PermissionType::Clipboard),
            "midi" => Ok(PermissionType::Midi),
            "fullscreen" => Ok(PermissionType::Fullscreen),
            "pointer_lock" => Ok(PermissionType::PointerLock),
            other => Err(format!("unknown permission type: {}", other)),
        }
    }
}

/// Stored user decision for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
        }
    }
}

impl FromStr for PermissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(PermissionStatus::Granted),
            "denied" => Ok(PermissionStatus::Denied),
            other => Err(format!("unknown permission status: {}", other)),
        }
    }
}

/// Answer handed back to a surface for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionDecision {
    Grant,
    Deny,
}

impl PermissionDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionDecision::Grant)
    }
}

/// A stored decision for a site (hostname) and permission type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePermission {
    pub site: String,
    pub permission_type: PermissionType,
    pub status: PermissionStatus,
    pub updated_at: i64,
}
