//! # Configuration
//!
//! Window and frame-loop settings handed to the runtime at startup.

use crate::surface::MAX_SURFACE_SIDE;
use crate::{PixieError, PixieResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default logical screen width in pixels
pub const DEFAULT_LOGICAL_WIDTH: u32 = 128;

/// Default logical screen height in pixels
pub const DEFAULT_LOGICAL_HEIGHT: u32 = 128;

/// Default frame-rate cap
pub const DEFAULT_FPS_CAP: u32 = 60;

/// How the display scale factor is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Largest integer scale that fits the primary monitor
    #[default]
    Auto,
    /// Exactly this scale, no fitting
    Fixed(u32),
}

/// Startup configuration for a Pixie game.
///
/// # Examples
///
/// ```
/// use pixie::{Config, ScaleMode};
///
/// let config = Config::new("demo").with_logical_size(160, 144).with_scale(ScaleMode::Fixed(4));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.fps_cap, Some(60));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window title
    pub title: String,
    /// Optional PNG used as the window icon
    pub icon: Option<PathBuf>,
    /// Logical screen width in unscaled pixels
    pub logical_width: u32,
    /// Logical screen height in unscaled pixels
    pub logical_height: u32,
    /// Scale selection; ignored when `fullscreen` is set
    pub scale: ScaleMode,
    /// Run fullscreen with the scale derived from the monitor height
    pub fullscreen: bool,
    /// Frame-rate cap, `None` for uncapped
    pub fps_cap: Option<u32>,
    /// Request vertical sync from the driver
    pub vsync: bool,
}

impl Config {
    /// Creates a configuration with default settings and the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: None,
            logical_width: DEFAULT_LOGICAL_WIDTH,
            logical_height: DEFAULT_LOGICAL_HEIGHT,
            scale: ScaleMode::Auto,
            fullscreen: false,
            fps_cap: Some(DEFAULT_FPS_CAP),
            vsync: false,
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> PixieResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon = Some(path.into());
        self
    }

    pub fn with_logical_size(mut self, width: u32, height: u32) -> Self {
        self.logical_width = width;
        self.logical_height = height;
        self
    }

    pub fn with_scale(mut self, scale: ScaleMode) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn with_fps_cap(mut self, fps_cap: Option<u32>) -> Self {
        self.fps_cap = fps_cap;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Logical screen size as `(width, height)`.
    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    /// Checks the settings that would otherwise fail deep inside the runtime.
    pub fn validate(&self) -> PixieResult<()> {
        if self.logical_width == 0 || self.logical_height == 0 {
            return Err(PixieError::InvalidConfig(format!(
                "logical size must be non-zero, got {}x{}",
                self.logical_width, self.logical_height
            )));
        }
        if let ScaleMode::Fixed(factor) = self.scale {
            if factor == 0 {
                return Err(PixieError::InvalidConfig(
                    "fixed scale must be at least 1".to_string(),
                ));
            }
            let longest = u64::from(self.logical_width.max(self.logical_height));
            if longest * u64::from(factor) > u64::from(MAX_SURFACE_SIDE) {
                return Err(PixieError::InvalidConfig(format!(
                    "fixed scale {} makes the window wider than {} pixels",
                    factor, MAX_SURFACE_SIDE
                )));
            }
        }
        if self.fps_cap == Some(0) {
            return Err(PixieError::InvalidConfig(
                "fps cap must be at least 1, use null for uncapped".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("pixie")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logical_size(), (128, 128));
        assert_eq!(config.scale, ScaleMode::Auto);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(Config::default().with_logical_size(0, 10).validate().is_err());
        assert!(Config::default()
            .with_scale(ScaleMode::Fixed(0))
            .validate()
            .is_err());
        assert!(Config::default().with_fps_cap(Some(0)).validate().is_err());
        assert!(Config::default().with_fps_cap(None).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_fixed_scale() {
        let huge = Config::default()
            .with_logical_size(8, 8)
            .with_scale(ScaleMode::Fixed(1 << 30));
        assert!(matches!(huge.validate(), Err(PixieError::InvalidConfig(_))));

        // 128 * 511 = 65408 still fits
        let large = Config::default().with_scale(ScaleMode::Fixed(511));
        assert!(large.validate().is_ok());
        assert!(large.with_scale(ScaleMode::Fixed(513)).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"title": "cave", "scale": {"fixed": 3}, "fps_cap": null}"#)
                .unwrap();
        assert_eq!(config.title, "cave");
        assert_eq!(config.scale, ScaleMode::Fixed(3));
        assert_eq!(config.fps_cap, None);
        assert_eq!(config.logical_width, DEFAULT_LOGICAL_WIDTH);
        assert!(!config.fullscreen);
    }

    #[test]
    fn test_auto_scale_serializes_as_string() {
        let json = serde_json::to_string(&ScaleMode::Auto).unwrap();
        assert_eq!(json, "\"auto\"");
    }
}
