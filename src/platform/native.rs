//! # Macroquad Platform
//!
//! The real backend: a macroquad window, its event pump and its GPU batcher.
//! Surfaces are uploaded to textures the first time they are drawn and cached
//! by [`SurfaceId`] for the rest of the run.

use super::{FontId, Platform, PlatformEvent, TextStyle, WindowRequest};
use crate::config::{Config, ScaleMode};
use crate::frame::Frame;
use crate::input::KeyCode;
use crate::runtime::Runtime;
use crate::surface::{Surface, SurfaceId};
use crate::{Assets, PixieError, PixieResult};
use image::imageops::{self, FilterType};
use log::{debug, error, info};
use macroquad::color::{Color, WHITE};
use macroquad::miniquad;
use macroquad::text::{draw_text_ex, load_ttf_font_from_bytes, measure_text, Font, TextParams};
use macroquad::texture::{draw_texture, FilterMode, Texture2D};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// Frames to wait for the window manager to apply a mode change.
const MODE_SWITCH_FRAMES: usize = 3;

/// Backend drawing into a macroquad window.
///
/// Must be created inside the macroquad executor, which [`launch`] does.
pub struct MacroquadPlatform {
    fullscreen: bool,
    started: Instant,
    textures: HashMap<SurfaceId, Texture2D>,
    fonts: Vec<Font>,
    window: (u32, u32),
    offset: (f32, f32),
}

impl MacroquadPlatform {
    /// `fullscreen` must match the mode the window was created in.
    pub fn new(fullscreen: bool) -> Self {
        Self {
            fullscreen,
            started: Instant::now(),
            textures: HashMap::new(),
            fonts: Vec::new(),
            window: (0, 0),
            offset: (0.0, 0.0),
        }
    }

    fn physical_screen_size() -> (u32, u32) {
        let dpi = macroquad::window::screen_dpi_scale();
        (
            (macroquad::window::screen_width() * dpi) as u32,
            (macroquad::window::screen_height() * dpi) as u32,
        )
    }

    fn texture_for(&mut self, surface: &Surface) -> PixieResult<&Texture2D> {
        if !self.textures.contains_key(&surface.id()) {
            let (width, height) = surface.size();
            let too_large = || PixieError::SurfaceTooLarge {
                width: u64::from(width),
                height: u64::from(height),
            };
            let texture = Texture2D::from_rgba8(
                u16::try_from(width).map_err(|_| too_large())?,
                u16::try_from(height).map_err(|_| too_large())?,
                surface.pixels().as_raw(),
            );
            texture.set_filter(FilterMode::Nearest);
            debug!("Uploaded surface {:?} ({}x{})", surface.id(), width, height);
            self.textures.insert(surface.id(), texture);
        }
        self.textures
            .get(&surface.id())
            .ok_or(PixieError::NotMaterialized("Texture"))
    }
}

impl Platform for MacroquadPlatform {
    async fn primary_monitor_size(&mut self) -> Option<(u32, u32)> {
        // macroquad has no monitor query; a fullscreen window covers the monitor
        if !self.fullscreen {
            macroquad::window::set_fullscreen(true);
        }
        for _ in 0..MODE_SWITCH_FRAMES {
            macroquad::window::next_frame().await;
        }
        let size = Self::physical_screen_size();
        if !self.fullscreen {
            macroquad::window::set_fullscreen(false);
            macroquad::window::next_frame().await;
        }

        debug!("Measured primary monitor size {}x{}", size.0, size.1);
        (size.0 > 0 && size.1 > 0).then_some(size)
    }

    fn open_window(&mut self, request: &WindowRequest) -> PixieResult<()> {
        if !request.fullscreen {
            macroquad::window::request_new_screen_size(
                request.width as f32,
                request.height as f32,
            );
        }
        macroquad::input::prevent_quit();
        self.fullscreen = request.fullscreen;
        self.window = (request.width, request.height);
        info!(
            "Window '{}' at {}x{} (fullscreen: {}, vsync: {})",
            request.title, request.width, request.height, request.fullscreen, request.vsync
        );
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        if self.fullscreen {
            let screen = (
                macroquad::window::screen_width(),
                macroquad::window::screen_height(),
            );
            self.offset = centring_offset(screen, self.window);
        }
        if macroquad::input::is_quit_requested() {
            vec![PlatformEvent::Quit]
        } else {
            Vec::new()
        }
    }

    fn keys_down(&self) -> Vec<KeyCode> {
        macroquad::input::get_keys_down().into_iter().collect()
    }

    fn mouse_position(&self) -> (f32, f32) {
        let (x, y) = macroquad::input::mouse_position();
        (x - self.offset.0, y - self.offset.1)
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    async fn present(&mut self) -> PixieResult<()> {
        macroquad::window::next_frame().await;
        Ok(())
    }

    fn load_font(&mut self, ttf: &[u8]) -> PixieResult<FontId> {
        let mut font =
            load_ttf_font_from_bytes(ttf).map_err(|e| PixieError::Font(e.to_string()))?;
        font.set_filter(FilterMode::Nearest);
        self.fonts.push(font);
        Ok(FontId(self.fonts.len() - 1))
    }

    fn clear(&mut self, color: Color) {
        macroquad::window::clear_background(color);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let (dx, dy) = self.offset;
        macroquad::shapes::draw_rectangle(x + dx, y + dy, width, height, color);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Color) {
        let (dx, dy) = self.offset;
        macroquad::shapes::draw_line(
            from.0 + dx,
            from.1 + dy,
            to.0 + dx,
            to.1 + dy,
            thickness,
            color,
        );
    }

    fn blit(&mut self, surface: &Surface, x: f32, y: f32) -> PixieResult<()> {
        let (dx, dy) = self.offset;
        let texture = self.texture_for(surface)?;
        draw_texture(texture, x + dx, y + dy, WHITE);
        Ok(())
    }

    fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> PixieResult<()> {
        let font = match style.font {
            Some(FontId(index)) => Some(
                self.fonts
                    .get(index)
                    .ok_or_else(|| PixieError::Font(format!("unknown font handle {index}")))?,
            ),
            None => None,
        };
        // macroquad positions text by its baseline
        let dimensions = measure_text(text, font, style.size, style.scale);
        draw_text_ex(
            text,
            x + self.offset.0,
            y + self.offset.1 + dimensions.offset_y,
            TextParams {
                font,
                font_size: style.size,
                font_scale: style.scale,
                color: style.color,
                ..Default::default()
            },
        );
        Ok(())
    }
}

/// Top-left corner that centres a `window` sized screen inside `screen`.
/// Whole pixels only, and never negative.
fn centring_offset(screen: (f32, f32), window: (u32, u32)) -> (f32, f32) {
    (
        ((screen.0 - window.0 as f32) / 2.0).max(0.0).floor(),
        ((screen.1 - window.1 as f32) / 2.0).max(0.0).floor(),
    )
}

/// Decodes an icon image into the three sizes the window manager wants.
fn load_icon(path: &Path) -> PixieResult<miniquad::conf::Icon> {
    let image = image::open(path)
        .map_err(|source| PixieError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let mut icon = miniquad::conf::Icon {
        small: [0; 16 * 16 * 4],
        medium: [0; 32 * 32 * 4],
        big: [0; 64 * 64 * 4],
    };
    icon.small
        .copy_from_slice(imageops::resize(&image, 16, 16, FilterType::Nearest).as_raw());
    icon.medium
        .copy_from_slice(imageops::resize(&image, 32, 32, FilterType::Nearest).as_raw());
    icon.big
        .copy_from_slice(imageops::resize(&image, 64, 64, FilterType::Nearest).as_raw());
    Ok(icon)
}

/// Builds the macroquad window configuration.
///
/// With a fixed scale the window opens at its final size. Otherwise it opens
/// at the logical size and is resized once the scale is resolved.
pub fn window_conf(config: &Config) -> PixieResult<macroquad::conf::Conf> {
    config.validate()?;
    let (width, height) = match config.scale {
        ScaleMode::Fixed(scale) if !config.fullscreen => (
            config.logical_width.saturating_mul(scale),
            config.logical_height.saturating_mul(scale),
        ),
        _ => config.logical_size(),
    };
    let icon = config.icon.as_deref().map(load_icon).transpose()?;

    Ok(macroquad::conf::Conf {
        miniquad_conf: miniquad::conf::Conf {
            window_title: config.title.clone(),
            window_width: i32::try_from(width).unwrap_or(i32::MAX),
            window_height: i32::try_from(height).unwrap_or(i32::MAX),
            high_dpi: false,
            fullscreen: config.fullscreen,
            window_resizable: false,
            icon,
            platform: miniquad::conf::Platform {
                swap_interval: Some(if config.vsync { 1 } else { 0 }),
                ..Default::default()
            },
            ..Default::default()
        },
        default_filter_mode: FilterMode::Nearest,
        ..Default::default()
    })
}

/// Opens a window and runs `update` once per frame until the window closes.
///
/// Returns after the window is gone. Errors from configuration surface
/// before the window opens; errors raised inside the loop are logged and end
/// the process with status 1, since the event loop cannot hand them back.
pub fn launch<F>(config: Config, assets: Assets, update: F) -> PixieResult<()>
where
    F: FnMut(&mut Frame<'_, MacroquadPlatform>) -> PixieResult<()> + 'static,
{
    let conf = window_conf(&config)?;
    info!("Launching '{}' (pixie v{})", config.title, crate::VERSION);

    macroquad::Window::from_config(conf, async move {
        let platform = MacroquadPlatform::new(config.fullscreen);
        let mut runtime = Runtime::new(config, assets, platform);
        if let Err(e) = runtime.run(update).await {
            error!("Game loop failed: {}", e);
            std::process::exit(1);
        }
    });
    Ok(())
}
