//! # Display Scale
//!
//! Integer scale factor shared by every cached surface and draw call.

use crate::config::ScaleMode;
use crate::{PixieError, PixieResult};
use log::{info, warn};
use std::fmt;
use std::num::NonZeroU32;

/// Pixels of the monitor kept free for the title bar, borders and taskbar
/// when auto-fitting a window, as `(width, height)`.
pub const WINDOW_DECORATION_ALLOWANCE: (u32, u32) = (32, 96);

/// Integer display scale. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaleFactor(NonZeroU32);

impl ScaleFactor {
    /// Scale factor of 1 (no scaling).
    pub const ONE: ScaleFactor = ScaleFactor(NonZeroU32::MIN);

    /// Creates a scale factor, returning `None` for zero.
    pub fn new(factor: u32) -> Option<Self> {
        NonZeroU32::new(factor).map(Self)
    }

    /// Creates a scale factor, raising zero to one.
    pub fn clamped(factor: u32) -> Self {
        Self::new(factor).unwrap_or(Self::ONE)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Scales a logical coordinate to screen pixels.
    pub fn apply(self, value: f32) -> f32 {
        value * self.get() as f32
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.get())
    }
}

/// Returns true when resolving `mode` needs the monitor resolution.
pub fn needs_monitor(mode: ScaleMode, fullscreen: bool) -> bool {
    fullscreen || mode == ScaleMode::Auto
}

/// Resolves the display scale for a logical screen size.
///
/// - Fullscreen ignores `mode` and uses `floor(monitor_height / logical_height)`.
/// - `Fixed(n)` is used verbatim.
/// - `Auto` picks the largest integer scale whose window fits the monitor's
///   usable area: the monitor less [`WINDOW_DECORATION_ALLOWANCE`].
///
/// A computed scale of zero (monitor smaller than the logical screen) is raised
/// to one.
///
/// # Examples
///
/// ```
/// use pixie::{resolve, ScaleMode};
///
/// let scale = resolve(ScaleMode::Auto, (128, 128), true, Some((1920, 1080))).unwrap();
/// assert_eq!(scale.get(), 8);
/// ```
pub fn resolve(
    mode: ScaleMode,
    logical: (u32, u32),
    fullscreen: bool,
    monitor: Option<(u32, u32)>,
) -> PixieResult<ScaleFactor> {
    let (logical_w, logical_h) = logical;
    if logical_w == 0 || logical_h == 0 {
        return Err(PixieError::InvalidConfig(format!(
            "logical size must be non-zero, got {logical_w}x{logical_h}"
        )));
    }

    let scale = if fullscreen {
        let (_, monitor_h) = monitor.ok_or(PixieError::MonitorUnavailable)?;
        let factor = monitor_h / logical_h;
        if factor == 0 {
            warn!(
                "Monitor height {} is smaller than logical height {}, using scale 1",
                monitor_h, logical_h
            );
        }
        ScaleFactor::clamped(factor)
    } else {
        match mode {
            ScaleMode::Fixed(factor) => ScaleFactor::new(factor).ok_or_else(|| {
                PixieError::InvalidConfig("fixed scale must be at least 1".to_string())
            })?,
            ScaleMode::Auto => match monitor {
                Some((monitor_w, monitor_h)) => {
                    let (allow_w, allow_h) = WINDOW_DECORATION_ALLOWANCE;
                    let usable_w = monitor_w.saturating_sub(allow_w);
                    let usable_h = monitor_h.saturating_sub(allow_h);
                    let factor = (usable_w / logical_w).min(usable_h / logical_h);
                    if factor == 0 {
                        warn!(
                            "Monitor {}x{} cannot fit logical screen {}x{}, using scale 1",
                            monitor_w, monitor_h, logical_w, logical_h
                        );
                    }
                    ScaleFactor::clamped(factor)
                }
                None => {
                    warn!("Monitor size unknown, falling back to scale 1");
                    ScaleFactor::ONE
                }
            },
        }
    };

    info!(
        "Resolved display scale {} for logical screen {}x{}",
        scale, logical_w, logical_h
    );
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullscreen_uses_monitor_height() {
        let scale = resolve(ScaleMode::Auto, (128, 128), true, Some((1920, 1080))).unwrap();
        assert_eq!(scale.get(), 8);
    }

    #[test]
    fn test_fullscreen_ignores_fixed_scale() {
        let scale = resolve(ScaleMode::Fixed(2), (160, 144), true, Some((2560, 1440))).unwrap();
        assert_eq!(scale.get(), 10);
    }

    #[test]
    fn test_fullscreen_short_monitor_clamps_to_one() {
        let scale = resolve(ScaleMode::Auto, (320, 1200), true, Some((1920, 1080))).unwrap();
        assert_eq!(scale, ScaleFactor::ONE);
    }

    #[test]
    fn test_fullscreen_without_monitor_fails() {
        let result = resolve(ScaleMode::Auto, (128, 128), true, None);
        assert!(matches!(result, Err(PixieError::MonitorUnavailable)));
    }

    #[test]
    fn test_fixed_scale_is_verbatim() {
        let scale = resolve(ScaleMode::Fixed(7), (128, 128), false, Some((640, 480))).unwrap();
        assert_eq!(scale.get(), 7);
    }

    #[test]
    fn test_auto_fits_smaller_dimension() {
        // usable 1888x984: 1888 / 384 = 4, 984 / 216 = 4
        let scale = resolve(ScaleMode::Auto, (384, 216), false, Some((1920, 1080))).unwrap();
        assert_eq!(scale.get(), 4);

        // width is the limiting side here
        let scale = resolve(ScaleMode::Auto, (400, 100), false, Some((1920, 1080))).unwrap();
        assert_eq!(scale.get(), 4);
    }

    #[test]
    fn test_auto_leaves_room_for_decorations() {
        // a 1024px window would cover the whole 1080px height
        let scale = resolve(ScaleMode::Auto, (128, 128), false, Some((1920, 1080))).unwrap();
        assert_eq!(scale.get(), 7);

        // 123 * 8 = 984, exactly the usable height
        let scale = resolve(ScaleMode::Auto, (100, 123), false, Some((1920, 1080))).unwrap();
        assert_eq!(scale.get(), 8);
    }

    #[test]
    fn test_auto_without_monitor_falls_back() {
        let scale = resolve(ScaleMode::Auto, (128, 128), false, None).unwrap();
        assert_eq!(scale, ScaleFactor::ONE);
    }

    #[test]
    fn test_needs_monitor() {
        assert!(needs_monitor(ScaleMode::Auto, false));
        assert!(needs_monitor(ScaleMode::Fixed(3), true));
        assert!(!needs_monitor(ScaleMode::Fixed(3), false));
    }

    #[test]
    fn test_scale_factor_apply() {
        let scale = ScaleFactor::new(3).unwrap();
        assert_eq!(scale.apply(2.5), 7.5);
        assert!(ScaleFactor::new(0).is_none());
        assert_eq!(scale.to_string(), "3x");
    }
}
