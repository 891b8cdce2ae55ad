//! # Tilemaps
//!
//! A rectangular grid of spritesheet cell indices baked into one surface.
//!
//! Grids come from code, CSV files or JSON array-of-arrays files. Baking
//! composites the unscaled cells first and scales the finished map once, so
//! adjacent tiles never show seams.

use super::{Materialization, Spritesheet, SpritesheetId};
use crate::scale::ScaleFactor;
use crate::surface::{apply_color_key, checked_size, scale_pixels, Surface};
use crate::{PixieError, PixieResult};
use image::{imageops, RgbaImage};
use log::debug;
use std::path::Path;

/// Cell index meaning "draw nothing here". Also returned by
/// [`Tilemap::get_tile`] outside the map.
pub const EMPTY_TILE: i32 = -1;

/// Validated rectangular grid of cell indices, stored row-major.
///
/// # Examples
///
/// ```
/// use pixie::{TileGrid, EMPTY_TILE};
///
/// let grid = TileGrid::new(vec![vec![0, -1], vec![1, 2]]).unwrap();
/// assert_eq!(grid.size(), (2, 2));
/// assert_eq!(grid.get(1, 0), Some(EMPTY_TILE));
/// assert!(TileGrid::new(vec![vec![1, 2], vec![3]]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: Vec<Vec<i32>>,
}

impl TileGrid {
    /// Validates that the grid is non-empty and every row has the same length.
    pub fn new(rows: Vec<Vec<i32>>) -> PixieResult<Self> {
        let expected = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(PixieError::EmptyTilemap),
        };
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(PixieError::RaggedTilemap {
                row,
                expected,
                found,
            });
        }
        Ok(Self { rows })
    }

    /// Grid filled with one value.
    pub fn filled(width: usize, height: usize, value: i32) -> PixieResult<Self> {
        Self::new(vec![vec![value; width]; height])
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Value at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Overwrites one cell. Returns false when the position is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: i32) -> bool {
        match self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> &[Vec<i32>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<i32>> {
        self.rows
    }

    /// Serializes the grid as a JSON array of arrays.
    pub fn to_json(&self) -> PixieResult<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    /// Writes the grid to `path` in the format [`load_json`] reads.
    pub fn save_json(&self, path: impl AsRef<Path>) -> PixieResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl TryFrom<Vec<Vec<i32>>> for TileGrid {
    type Error = PixieError;

    fn try_from(rows: Vec<Vec<i32>>) -> PixieResult<Self> {
        Self::new(rows)
    }
}

/// Parses comma separated integers, one map row per line.
///
/// Blank lines are skipped and so are blank fields, which means a row with an
/// empty field comes back shorter than its neighbours and fails
/// [`TileGrid::new`].
pub fn parse_csv(text: &str) -> PixieResult<Vec<Vec<i32>>> {
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for field in line.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let value = field.parse::<i32>().map_err(|_| PixieError::CsvParse {
                line: index + 1,
                message: format!("'{field}' is not an integer"),
            })?;
            row.push(value);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Reads and validates a CSV tilemap file.
pub fn load_csv(path: impl AsRef<Path>) -> PixieResult<TileGrid> {
    let text = std::fs::read_to_string(path)?;
    TileGrid::new(parse_csv(&text)?)
}

/// Parses a JSON array of integer arrays.
pub fn parse_json(text: &str) -> PixieResult<Vec<Vec<i32>>> {
    Ok(serde_json::from_str(text)?)
}

/// Reads and validates a JSON tilemap file.
pub fn load_json(path: impl AsRef<Path>) -> PixieResult<TileGrid> {
    let text = std::fs::read_to_string(path)?;
    TileGrid::new(parse_json(&text)?)
}

/// Composites unscaled cells into one canvas. `EMPTY_TILE` leaves the cell
/// transparent.
pub(crate) fn composite(
    grid: &TileGrid,
    cells: &[Surface],
    cell_size: (u32, u32),
) -> PixieResult<RgbaImage> {
    let (cell_w, cell_h) = cell_size;
    let (width, height) = checked_size(
        grid.width() as u64 * u64::from(cell_w),
        grid.height() as u64 * u64::from(cell_h),
    )?;
    let mut canvas = RgbaImage::new(width, height);

    for (row, values) in grid.rows().iter().enumerate() {
        for (col, &index) in values.iter().enumerate() {
            if index == EMPTY_TILE {
                continue;
            }
            let cell = usize::try_from(index)
                .ok()
                .and_then(|i| cells.get(i))
                .ok_or(PixieError::TileIndexOutOfRange {
                    index,
                    col,
                    row,
                    cells: cells.len(),
                })?;
            imageops::overlay(
                &mut canvas,
                cell.pixels(),
                i64::from(col as u32 * cell_w),
                i64::from(row as u32 * cell_h),
            );
        }
    }
    Ok(canvas)
}

/// A grid of spritesheet cells drawn as one pre-scaled surface.
#[derive(Debug)]
pub struct Tilemap {
    sheet: SpritesheetId,
    grid: TileGrid,
    color_key: Option<[u8; 3]>,
    state: Materialization<Surface>,
}

impl Tilemap {
    /// Creates a pending tilemap over `sheet`. Pixels matching `color_key`
    /// become transparent after baking.
    pub fn new(sheet: SpritesheetId, grid: TileGrid, color_key: Option<[u8; 3]>) -> Self {
        Self {
            sheet,
            grid,
            color_key,
            state: Materialization::Pending,
        }
    }

    /// The spritesheet this map draws from.
    pub fn sheet(&self) -> SpritesheetId {
        self.sheet
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn color_key(&self) -> Option<[u8; 3]> {
        self.color_key
    }

    pub fn is_materialized(&self) -> bool {
        self.state.is_ready()
    }

    /// Bakes the map from `sheet`'s unscaled cells and scales the result.
    /// Does nothing if already materialized.
    ///
    /// # Errors
    ///
    /// Fails with [`PixieError::NotMaterialized`] if the spritesheet is still
    /// pending, with [`PixieError::TileIndexOutOfRange`] for any index
    /// other than [`EMPTY_TILE`] that the sheet does not have, and with
    /// [`PixieError::SurfaceTooLarge`] if the baked map would exceed
    /// [`MAX_SURFACE_SIDE`](crate::MAX_SURFACE_SIDE) on either side.
    pub fn ensure_materialized(
        &mut self,
        sheet: &Spritesheet,
        scale: ScaleFactor,
    ) -> PixieResult<&Surface> {
        if let Materialization::Pending = self.state {
            let mut baked = composite(&self.grid, sheet.raw_cells()?, sheet.cell_size())?;
            if let Some(key) = self.color_key {
                apply_color_key(&mut baked, key);
            }
            let surface = Surface::new(scale_pixels(&baked, scale)?);
            debug!(
                "Baked {}x{} tilemap at {} into {}x{} pixels",
                self.grid.width(),
                self.grid.height(),
                scale,
                surface.width(),
                surface.height()
            );
            self.state = Materialization::Ready(surface);
        }
        self.state.ready("Tilemap")
    }

    /// Baked surface, if materialized.
    pub fn surface(&self) -> Option<&Surface> {
        self.state.get()
    }

    /// Baked pixel size, if materialized.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.surface().map(Surface::size)
    }

    /// Map width in cells.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Map height in cells.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Cell index at column `x`, row `y`, or [`EMPTY_TILE`] outside the map.
    pub fn get_tile(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 {
            return EMPTY_TILE;
        }
        self.grid
            .get(x as usize, y as usize)
            .unwrap_or(EMPTY_TILE)
    }
}
