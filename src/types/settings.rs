use serde::{Deserialize, Serialize};

use super::surface::Bounds;

/// Top-level shell settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShellSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub window: WindowSettings,
}

/// General browsing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// Location opened by a new tab when a Homepage tab already exists.
    pub new_tab_url: String,
    /// Search url with a `{query}` placeholder.
    pub search_template: String,
    pub devtools: bool,
}

impl ShellSettings {
    /// Range checks serde cannot express.
    pub fn check(&self) -> Result<(), String> {
        self.layout.check()?;
        self.window.check()
    }
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            new_tab_url: "https://www.google.com".to_string(),
            search_template: "https://www.google.com/search?q={query}".to_string(),
            devtools: false,
        }
    }
}

/// Layout-affecting values read when surfaces are created or resized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutSettings {
    /// Height of the tab strip plus navigation toolbar.
    pub chrome_height: u32,
    pub inset_left: u32,
    pub inset_right: u32,
    pub inset_bottom: u32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            chrome_height: 120,
            inset_left: 8,
            inset_right: 8,
            inset_bottom: 0,
        }
    }
}

/// Largest accepted layout inset or chrome height, in logical pixels.
pub const MAX_LAYOUT_EXTENT: u32 = 16_384;

impl LayoutSettings {
    /// Content area of a main window with the given inner size. Insets larger
    /// than the window leave an empty area.
    pub fn content_bounds(&self, width: u32, height: u32) -> Bounds {
        Bounds::new(
            i32::try_from(self.inset_left).unwrap_or(i32::MAX),
            i32::try_from(self.chrome_height).unwrap_or(i32::MAX),
            width.saturating_sub(self.inset_left.saturating_add(self.inset_right)),
            height.saturating_sub(self.chrome_height.saturating_add(self.inset_bottom)),
        )
    }

    /// Names the first field above [`MAX_LAYOUT_EXTENT`].
    pub fn check(&self) -> Result<(), String> {
        let fields = [
            ("chrome_height", self.chrome_height),
            ("inset_left", self.inset_left),
            ("inset_right", self.inset_right),
            ("inset_bottom", self.inset_bottom),
        ];
        match fields.iter().find(|(_, v)| *v > MAX_LAYOUT_EXTENT) {
            Some((name, v)) => Err(format!("layout.{} = {} exceeds {}", name, v, MAX_LAYOUT_EXTENT)),
            None => Ok(()),
        }
    }
}

/// Top-level window geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
    /// Offset of a detached window from its source window, both axes.
    pub detach_offset: i32,
}

impl WindowSettings {
    pub fn check(&self) -> Result<(), String> {
        if self.detach_offset.unsigned_abs() > MAX_LAYOUT_EXTENT {
            return Err(format!(
                "window.detach_offset = {} exceeds {}",
                self.detach_offset, MAX_LAYOUT_EXTENT
            ));
        }
        Ok(())
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            min_width: 800,
            min_height: 600,
            detach_offset: 50,
        }
    }
}
