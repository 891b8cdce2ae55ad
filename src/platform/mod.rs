//! # Platform Module
//!
//! The capability interface between the runtime and whatever actually owns
//! the window, the event pump and the screen.
//!
//! All coordinates at this level are screen pixels. Scaling from logical
//! units happens in [`crate::Frame`] before a call reaches the platform.

pub mod headless;
pub mod native;

pub use headless::*;
pub use native::*;

use crate::input::KeyCode;
use crate::surface::Surface;
use crate::PixieResult;
use macroquad::color::Color;
use std::time::Duration;

/// Window parameters decided once the display scale is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    pub title: String,
    /// Width in screen pixels
    pub width: u32,
    /// Height in screen pixels
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

/// Events the runtime reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The user asked to close the window
    Quit,
}

/// Handle to a font loaded through [`Platform::load_font`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub(crate) usize);

/// How a string is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Rasterization size in unscaled pixels
    pub size: u16,
    /// Glyph magnification applied after rasterization
    pub scale: f32,
    pub color: Color,
    /// Caller font, or the built-in monospace font when `None`
    pub font: Option<FontId>,
}

/// Window, input, timing and drawing services used by the runtime.
///
/// Async methods are the points where a backend may hand control back to its
/// event loop.
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Resolution of the primary monitor in physical pixels, if known.
    async fn primary_monitor_size(&mut self) -> Option<(u32, u32)>;

    /// Applies the final window size and mode.
    fn open_window(&mut self, request: &WindowRequest) -> PixieResult<()>;

    /// Drains pending window events.
    fn poll_events(&mut self) -> Vec<PlatformEvent>;

    /// Keys currently held down.
    fn keys_down(&self) -> Vec<KeyCode>;

    /// Mouse position in screen pixels.
    fn mouse_position(&self) -> (f32, f32);

    /// Monotonic time since the platform was created.
    fn now(&self) -> Duration;

    /// Blocks for `duration` to hold the frame-rate cap.
    fn sleep(&mut self, duration: Duration);

    /// Shows the finished frame and waits for the next one.
    async fn present(&mut self) -> PixieResult<()>;

    /// Loads a TrueType font.
    fn load_font(&mut self, ttf: &[u8]) -> PixieResult<FontId>;

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color);

    /// Draws a surface unscaled with its top-left corner at `(x, y)`.
    fn blit(&mut self, surface: &Surface, x: f32, y: f32) -> PixieResult<()>;

    /// Draws `text` with its top-left corner at `(x, y)`.
    fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> PixieResult<()>;
}
