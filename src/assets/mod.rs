//! # Asset Registry
//!
//! Sprites, spritesheets and tilemaps are registered with an [`Assets`]
//! registry before the window exists. Nothing is decoded until the display
//! scale is known; [`Assets::materialize_all`] then prepares every pending
//! resource in dependency order. Resources added after that point are
//! prepared immediately.

pub mod sprite;
pub mod spritesheet;
pub mod tilemap;

pub use sprite::*;
pub use spritesheet::*;
pub use tilemap::*;

use crate::scale::ScaleFactor;
use crate::surface::{ImageSource, Surface};
use crate::{PixieError, PixieResult};
use log::info;

/// Preparation state shared by every resource kind.
#[derive(Debug)]
pub(crate) enum Materialization<T> {
    /// Registered, not yet decoded or scaled
    Pending,
    /// Surfaces prepared at the registry's scale
    Ready(T),
}

impl<T> Materialization<T> {
    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, Materialization::Ready(_))
    }

    pub(crate) fn get(&self) -> Option<&T> {
        match self {
            Materialization::Ready(value) => Some(value),
            Materialization::Pending => None,
        }
    }

    /// The prepared value, or `NotMaterialized` naming the resource kind.
    pub(crate) fn ready(&self, kind: &'static str) -> PixieResult<&T> {
        self.get().ok_or(PixieError::NotMaterialized(kind))
    }
}

/// Handle to a sprite registered with [`Assets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub(crate) usize);

/// Handle to a spritesheet registered with [`Assets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpritesheetId(pub(crate) usize);

/// Handle to a tilemap registered with [`Assets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilemapId(pub(crate) usize);

/// Registry of every drawable resource in a game.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use pixie::{Assets, ScaleFactor, TileGrid};
///
/// let mut assets = Assets::new();
/// let sheet = assets.add_spritesheet(RgbaImage::new(16, 8), 8, 8).unwrap();
/// let map = assets
///     .add_tilemap(sheet, TileGrid::new(vec![vec![0, 1, -1]]).unwrap(), None)
///     .unwrap();
/// assert_eq!(assets.pending_count(), 2);
///
/// assets.materialize_all(ScaleFactor::new(2).unwrap()).unwrap();
/// assert_eq!(assets.tilemap(map).unwrap().size(), Some((48, 16)));
/// ```
#[derive(Debug, Default)]
pub struct Assets {
    scale: Option<ScaleFactor>,
    sprites: Vec<Sprite>,
    sheets: Vec<Spritesheet>,
    tilemaps: Vec<Tilemap>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scale resources are prepared at, once resolved.
    pub fn scale(&self) -> Option<ScaleFactor> {
        self.scale
    }

    /// Registers a sprite.
    ///
    /// Once the registry has a scale, the sprite is decoded right away and a
    /// load failure is returned here instead of being deferred.
    pub fn add_sprite(&mut self, source: impl Into<ImageSource>) -> PixieResult<SpriteId> {
        let mut sprite = Sprite::new(source);
        if let Some(scale) = self.scale {
            sprite.ensure_materialized(scale)?;
        }
        self.sprites.push(sprite);
        Ok(SpriteId(self.sprites.len() - 1))
    }

    /// Registers a spritesheet with the given cell size.
    pub fn add_spritesheet(
        &mut self,
        source: impl Into<ImageSource>,
        cell_width: u32,
        cell_height: u32,
    ) -> PixieResult<SpritesheetId> {
        let mut sheet = Spritesheet::new(source, cell_width, cell_height)?;
        if let Some(scale) = self.scale {
            sheet.ensure_materialized(scale)?;
        }
        self.sheets.push(sheet);
        Ok(SpritesheetId(self.sheets.len() - 1))
    }

    /// Registers a tilemap drawing from an already registered spritesheet.
    pub fn add_tilemap(
        &mut self,
        sheet: SpritesheetId,
        grid: TileGrid,
        color_key: Option<[u8; 3]>,
    ) -> PixieResult<TilemapId> {
        let mut tilemap = Tilemap::new(sheet, grid, color_key);
        if let Some(scale) = self.scale {
            tilemap.ensure_materialized(self.spritesheet(sheet)?, scale)?;
        } else {
            self.spritesheet(sheet)?;
        }
        self.tilemaps.push(tilemap);
        Ok(TilemapId(self.tilemaps.len() - 1))
    }

    /// Prepares every pending resource at `scale`.
    ///
    /// Spritesheets go first, then sprites, then tilemaps, because baking a
    /// tilemap reads its sheet's cells. Calling this again at the same scale
    /// only prepares resources that are still pending.
    ///
    /// # Errors
    ///
    /// Returns [`PixieError::ScaleMismatch`] if the registry was already
    /// materialized at a different scale, or the first load/bake error.
    pub fn materialize_all(&mut self, scale: ScaleFactor) -> PixieResult<()> {
        if let Some(resolved) = self.scale {
            if resolved != scale {
                return Err(PixieError::ScaleMismatch {
                    resolved: resolved.get(),
                    requested: scale.get(),
                });
            }
        }
        self.scale = Some(scale);

        let pending = self.pending_count();
        for sheet in &mut self.sheets {
            sheet.ensure_materialized(scale)?;
        }
        for sprite in &mut self.sprites {
            sprite.ensure_materialized(scale)?;
        }
        for tilemap in &mut self.tilemaps {
            let sheet = self
                .sheets
                .get(tilemap.sheet().0)
                .ok_or_else(|| PixieError::UnknownResource(format!("{:?}", tilemap.sheet())))?;
            tilemap.ensure_materialized(sheet, scale)?;
        }

        info!(
            "Materialized {} pending resources at scale {} ({} sprites, {} spritesheets, {} tilemaps)",
            pending,
            scale,
            self.sprites.len(),
            self.sheets.len(),
            self.tilemaps.len()
        );
        Ok(())
    }

    /// Number of resources not yet materialized.
    pub fn pending_count(&self) -> usize {
        self.sprites.iter().filter(|s| !s.is_materialized()).count()
            + self.sheets.iter().filter(|s| !s.is_materialized()).count()
            + self.tilemaps.iter().filter(|t| !t.is_materialized()).count()
    }

    pub fn sprite(&self, id: SpriteId) -> PixieResult<&Sprite> {
        self.sprites
            .get(id.0)
            .ok_or_else(|| PixieError::UnknownResource(format!("{id:?}")))
    }

    pub fn spritesheet(&self, id: SpritesheetId) -> PixieResult<&Spritesheet> {
        self.sheets
            .get(id.0)
            .ok_or_else(|| PixieError::UnknownResource(format!("{id:?}")))
    }

    pub fn tilemap(&self, id: TilemapId) -> PixieResult<&Tilemap> {
        self.tilemaps
            .get(id.0)
            .ok_or_else(|| PixieError::UnknownResource(format!("{id:?}")))
    }

    /// Scaled surface of a sprite, ready to blit.
    pub fn sprite_surface(&self, id: SpriteId) -> PixieResult<&Surface> {
        self.sprite(id)?
            .surface()
            .ok_or(PixieError::NotMaterialized("Sprite"))
    }

    /// Scaled surface of one spritesheet cell.
    pub fn cell_surface(&self, id: SpritesheetId, index: usize) -> PixieResult<&Surface> {
        self.spritesheet(id)?.cell(index)
    }

    /// Baked, scaled surface of a tilemap.
    pub fn tilemap_surface(&self, id: TilemapId) -> PixieResult<&Surface> {
        self.tilemap(id)?
            .surface()
            .ok_or(PixieError::NotMaterialized("Tilemap"))
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn spritesheets(&self) -> &[Spritesheet] {
        &self.sheets
    }

    pub fn tilemaps(&self) -> &[Tilemap] {
        &self.tilemaps
    }
}
