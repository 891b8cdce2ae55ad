//! # Headless Platform
//!
//! A windowless backend with a simulated clock. Input and quit are scripted,
//! draw calls are recorded per presented frame. Drives the test-suite and
//! offscreen runs.

use super::{FontId, Platform, PlatformEvent, TextStyle, WindowRequest};
use crate::input::KeyCode;
use crate::surface::{Surface, SurfaceId};
use crate::{PixieError, PixieResult};
use macroquad::color::Color;
use std::collections::VecDeque;
use std::time::Duration;

/// One recorded draw call, in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        color: Color,
    },
    Blit {
        surface: SurfaceId,
        x: f32,
        y: f32,
        width: u32,
        height: u32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
}

/// Platform that renders nowhere.
///
/// # Examples
///
/// ```
/// use pixie::{HeadlessPlatform, KeyCode};
/// use std::time::Duration;
///
/// let platform = HeadlessPlatform::new()
///     .with_monitor(1920, 1080)
///     .with_frame_cost(Duration::from_millis(5))
///     .with_key_frames(vec![vec![KeyCode::Space], vec![]])
///     .quit_after(10);
/// assert!(platform.window().is_none());
/// ```
#[derive(Debug)]
pub struct HeadlessPlatform {
    monitor: Option<(u32, u32)>,
    monitor_queries: usize,
    window: Option<WindowRequest>,
    clock: Duration,
    frame_cost: Duration,
    key_frames: VecDeque<Vec<KeyCode>>,
    keys: Vec<KeyCode>,
    mouse: (f32, f32),
    quit_after: Option<usize>,
    pending: Vec<DrawCommand>,
    frames: Vec<Vec<DrawCommand>>,
    sleeps: Vec<Duration>,
    fonts: usize,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// Creates a headless platform with a 1920x1080 monitor and free frames.
    pub fn new() -> Self {
        Self {
            monitor: Some((1920, 1080)),
            monitor_queries: 0,
            window: None,
            clock: Duration::ZERO,
            frame_cost: Duration::ZERO,
            key_frames: VecDeque::new(),
            keys: Vec::new(),
            mouse: (0.0, 0.0),
            quit_after: None,
            pending: Vec::new(),
            frames: Vec::new(),
            sleeps: Vec::new(),
            fonts: 0,
        }
    }

    pub fn with_monitor(mut self, width: u32, height: u32) -> Self {
        self.monitor = Some((width, height));
        self
    }

    /// Reports the monitor size as unknown.
    pub fn without_monitor(mut self) -> Self {
        self.monitor = None;
        self
    }

    /// Simulated time each presented frame takes.
    pub fn with_frame_cost(mut self, cost: Duration) -> Self {
        self.frame_cost = cost;
        self
    }

    /// Keys held on each successive frame. After the script runs out no keys
    /// are held.
    pub fn with_key_frames(mut self, frames: impl IntoIterator<Item = Vec<KeyCode>>) -> Self {
        self.key_frames = frames.into_iter().collect();
        self
    }

    /// Mouse position in screen pixels.
    pub fn with_mouse(mut self, x: f32, y: f32) -> Self {
        self.mouse = (x, y);
        self
    }

    /// Sends a quit event once `frames` frames have been presented.
    pub fn quit_after(mut self, frames: usize) -> Self {
        self.quit_after = Some(frames);
        self
    }

    /// The window the runtime opened, if any.
    pub fn window(&self) -> Option<&WindowRequest> {
        self.window.as_ref()
    }

    /// How many times the monitor size was requested.
    pub fn monitor_queries(&self) -> usize {
        self.monitor_queries
    }

    /// Draw calls of every presented frame, oldest first.
    pub fn frames(&self) -> &[Vec<DrawCommand>] {
        &self.frames
    }

    /// Draw calls of the most recently presented frame.
    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Every pacing sleep requested so far.
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Platform for HeadlessPlatform {
    async fn primary_monitor_size(&mut self) -> Option<(u32, u32)> {
        self.monitor_queries += 1;
        self.monitor
    }

    fn open_window(&mut self, request: &WindowRequest) -> PixieResult<()> {
        if request.width == 0 || request.height == 0 {
            return Err(PixieError::Window(format!(
                "cannot open a {}x{} window",
                request.width, request.height
            )));
        }
        self.window = Some(request.clone());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        self.keys = self.key_frames.pop_front().unwrap_or_default();
        match self.quit_after {
            Some(limit) if self.frames.len() >= limit => vec![PlatformEvent::Quit],
            _ => Vec::new(),
        }
    }

    fn keys_down(&self) -> Vec<KeyCode> {
        self.keys.clone()
    }

    fn mouse_position(&self) -> (f32, f32) {
        self.mouse
    }

    fn now(&self) -> Duration {
        self.clock
    }

    fn sleep(&mut self, duration: Duration) {
        self.clock += duration;
        self.sleeps.push(duration);
    }

    async fn present(&mut self) -> PixieResult<()> {
        self.clock += self.frame_cost;
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }

    fn load_font(&mut self, ttf: &[u8]) -> PixieResult<FontId> {
        if ttf.is_empty() {
            return Err(PixieError::Font("font data is empty".to_string()));
        }
        self.fonts += 1;
        Ok(FontId(self.fonts - 1))
    }

    fn clear(&mut self, color: Color) {
        self.pending.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.pending.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color) {
        self.pending.push(DrawCommand::Line {
            from,
            to,
            thickness,
            color,
        });
    }

    fn blit(&mut self, surface: &Surface, x: f32, y: f32) -> PixieResult<()> {
        self.pending.push(DrawCommand::Blit {
            surface: surface.id(),
            x,
            y,
            width: surface.width(),
            height: surface.height(),
        });
        Ok(())
    }

    fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> PixieResult<()> {
        if let Some(FontId(index)) = style.font {
            if index >= self.fonts {
                return Err(PixieError::Font(format!("unknown font handle {index}")));
            }
        }
        self.pending.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
        Ok(())
    }
}
