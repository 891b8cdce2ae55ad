//! # Sprites
//!
//! Single images, decoded and pre-scaled once the display scale is known.

use super::Materialization;
use crate::scale::ScaleFactor;
use crate::surface::{ImageSource, Surface};
use crate::PixieResult;
use log::debug;

/// A single image drawn as one pre-scaled surface.
#[derive(Debug)]
pub struct Sprite {
    source: ImageSource,
    state: Materialization<Surface>,
}

impl Sprite {
    /// Creates a pending sprite. Nothing is decoded until materialization.
    pub fn new(source: impl Into<ImageSource>) -> Self {
        Self {
            source: source.into(),
            state: Materialization::Pending,
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn is_materialized(&self) -> bool {
        self.state.is_ready()
    }

    /// Decodes and scales the sprite. Does nothing if already materialized.
    pub fn ensure_materialized(&mut self, scale: ScaleFactor) -> PixieResult<&Surface> {
        if let Materialization::Pending = self.state {
            let pixels = self.source.decode()?;
            let surface = Surface::new(pixels).scaled(scale)?;
            debug!(
                "Materialized sprite {} at {} ({}x{})",
                self.source.describe(),
                scale,
                surface.width(),
                surface.height()
            );
            self.state = Materialization::Ready(surface);
        }
        self.state.ready("Sprite")
    }

    /// The scaled surface, if materialized.
    pub fn surface(&self) -> Option<&Surface> {
        self.state.get()
    }

    /// Scaled width and height, if materialized.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.surface().map(Surface::size)
    }
}
