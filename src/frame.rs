//! # Frame
//!
//! The drawing and query surface handed to the update callback each frame.
//! Every position is in logical units; the frame multiplies by the display
//! scale before forwarding to the platform. Cached surfaces are already
//! scaled and are blitted as-is.

use crate::assets::{Assets, SpriteId, SpritesheetId, TilemapId};
use crate::input::{InputState, Keys};
use crate::platform::{FontId, Platform, TextStyle};
use crate::scale::ScaleFactor;
use crate::PixieResult;
use macroquad::color::Color;

/// Rasterization size of the built-in font, in logical pixels.
pub const DEFAULT_FONT_SIZE: u16 = 16;

/// One frame's view of the game: drawing, input and assets.
pub struct Frame<'a, P: Platform> {
    platform: &'a mut P,
    assets: &'a mut Assets,
    input: &'a InputState,
    scale: ScaleFactor,
    logical_size: (u32, u32),
    fps: f32,
}

impl<'a, P: Platform> Frame<'a, P> {
    pub(crate) fn new(
        platform: &'a mut P,
        assets: &'a mut Assets,
        input: &'a InputState,
        scale: ScaleFactor,
        logical_size: (u32, u32),
        fps: f32,
    ) -> Self {
        Self {
            platform,
            assets,
            input,
            scale,
            logical_size,
            fps,
        }
    }

    fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (self.scale.apply(x), self.scale.apply(y))
    }

    /// Fills the whole screen.
    pub fn cls(&mut self, color: Color) {
        self.platform.clear(color);
    }

    /// Fills the rectangle spanning two corners.
    pub fn rect(&mut self, from_x: f32, from_y: f32, to_x: f32, to_y: f32, color: Color) {
        let (x, y) = self.to_screen(from_x.min(to_x), from_y.min(to_y));
        let width = self.scale.apply((to_x - from_x).abs());
        let height = self.scale.apply((to_y - from_y).abs());
        self.platform.fill_rect(x, y, width, height, color);
    }

    /// Draws a one logical pixel wide line.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color) {
        self.line_width(from, to, 1.0, color);
    }

    /// Draws a line `width` logical pixels wide.
    pub fn line_width(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        let from = self.to_screen(from.0, from.1);
        let to = self.to_screen(to.0, to.1);
        self.platform.line(from, to, self.scale.apply(width), color);
    }

    /// Sets one logical pixel.
    pub fn pixel(&mut self, x: f32, y: f32, color: Color) {
        let (x, y) = self.to_screen(x, y);
        let size = self.scale.apply(1.0);
        self.platform.fill_rect(x, y, size, size, color);
    }

    /// Draws text in the built-in monospace font.
    ///
    /// Glyphs are rasterized at the logical size and magnified by the display
    /// scale, so small fonts get blocky at large scales.
    pub fn text(&mut self, x: f32, y: f32, text: &str, color: Color) -> PixieResult<()> {
        self.draw_text(x, y, text, color, None)
    }

    /// Draws text in a font loaded with [`Frame::load_font`].
    pub fn text_with_font(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        color: Color,
        font: FontId,
    ) -> PixieResult<()> {
        self.draw_text(x, y, text, color, Some(font))
    }

    fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        color: Color,
        font: Option<FontId>,
    ) -> PixieResult<()> {
        let (x, y) = self.to_screen(x, y);
        let style = TextStyle {
            size: DEFAULT_FONT_SIZE,
            scale: self.scale.get() as f32,
            color,
            font,
        };
        self.platform.text(text, x, y, &style)
    }

    /// Loads a TrueType font for [`Frame::text_with_font`].
    pub fn load_font(&mut self, ttf: &[u8]) -> PixieResult<FontId> {
        self.platform.load_font(ttf)
    }

    /// Draws a sprite with its top-left corner at `(x, y)`.
    pub fn sprite(&mut self, x: f32, y: f32, sprite: SpriteId) -> PixieResult<()> {
        let (x, y) = self.to_screen(x, y);
        let surface = self.assets.sprite_surface(sprite)?;
        self.platform.blit(surface, x, y)
    }

    /// Draws a baked tilemap with its top-left corner at `(x, y)`.
    pub fn tilemap(&mut self, x: f32, y: f32, tilemap: TilemapId) -> PixieResult<()> {
        let (x, y) = self.to_screen(x, y);
        let surface = self.assets.tilemap_surface(tilemap)?;
        self.platform.blit(surface, x, y)
    }

    /// Draws one spritesheet cell with its top-left corner at `(x, y)`.
    pub fn cell(&mut self, x: f32, y: f32, sheet: SpritesheetId, index: usize) -> PixieResult<()> {
        let (x, y) = self.to_screen(x, y);
        let surface = self.assets.cell_surface(sheet, index)?;
        self.platform.blit(surface, x, y)
    }

    /// True while any of `keys` is held.
    pub fn btn(&self, keys: impl Keys) -> bool {
        self.input.is_held(keys)
    }

    /// True on the frame any of `keys` goes down. Asking twice in one frame
    /// gives the same answer.
    pub fn btnp(&self, keys: impl Keys) -> bool {
        self.input.is_pressed(keys)
    }

    /// True on the frame any of `keys` comes back up.
    pub fn btnr(&self, keys: impl Keys) -> bool {
        self.input.is_released(keys)
    }

    /// Mouse position in logical units.
    pub fn mouse(&self) -> (f32, f32) {
        self.input.mouse()
    }

    pub fn input(&self) -> &InputState {
        self.input
    }

    /// Measured frame rate.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    pub fn logical_size(&self) -> (u32, u32) {
        self.logical_size
    }

    pub fn assets(&self) -> &Assets {
        &*self.assets
    }

    /// Registry access for resources created mid-game. They are prepared
    /// immediately at the current scale.
    pub fn assets_mut(&mut self) -> &mut Assets {
        &mut *self.assets
    }
}
