//! # Spritesheets
//!
//! An image cut into a fixed grid of equal cells. Cells are numbered in
//! row-major order starting at the top-left.

use super::Materialization;
use crate::scale::ScaleFactor;
use crate::surface::{ImageSource, Surface};
use crate::{PixieError, PixieResult};
use log::debug;

/// Cell layout of a decoded spritesheet.
///
/// Partial cells at the right or bottom edge are dropped: the column and row
/// counts are the source size divided by the cell size, rounded down.
///
/// # Examples
///
/// ```
/// use pixie::SheetGrid;
///
/// let grid = SheetGrid::from_source_size(24, 8, 8, 8);
/// assert_eq!(grid.len(), 3);
/// assert_eq!(grid.index_of(2, 0), 2);
/// assert_eq!(grid.coord_of(2), (2, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGrid {
    /// Cell width in unscaled pixels
    pub cell_width: u32,
    /// Cell height in unscaled pixels
    pub cell_height: u32,
    /// Number of cells in each row
    pub cells_per_row: u32,
    /// Number of complete rows
    pub rows: u32,
}

impl SheetGrid {
    /// Computes the layout for a source image. Cell sizes must be non-zero.
    pub fn from_source_size(width: u32, height: u32, cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
            cells_per_row: width / cell_width,
            rows: height / cell_height,
        }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells_per_row as usize * self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell index for a column/row coordinate.
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.cells_per_row as usize + x as usize
    }

    /// Column/row coordinate for a cell index.
    ///
    /// # Panics
    ///
    /// Panics if the sheet has no columns.
    pub fn coord_of(&self, index: usize) -> (u32, u32) {
        let per_row = self.cells_per_row as usize;
        ((index % per_row) as u32, (index / per_row) as u32)
    }

    /// Pixel origin of a cell within the unscaled source image.
    fn origin_of(&self, index: usize) -> (u32, u32) {
        let (col, row) = self.coord_of(index);
        (col * self.cell_width, row * self.cell_height)
    }
}

#[derive(Debug)]
struct SheetCells {
    grid: SheetGrid,
    /// Unscaled cells, composited by tilemaps
    raw: Vec<Surface>,
    /// Cells pre-multiplied by the display scale, drawn directly
    scaled: Vec<Surface>,
}

/// A grid of equally sized sprites cut from one image.
#[derive(Debug)]
pub struct Spritesheet {
    source: ImageSource,
    cell_width: u32,
    cell_height: u32,
    state: Materialization<SheetCells>,
}

impl Spritesheet {
    /// Creates a pending spritesheet with the given cell size.
    pub fn new(source: impl Into<ImageSource>, cell_width: u32, cell_height: u32) -> PixieResult<Self> {
        if cell_width == 0 || cell_height == 0 {
            return Err(PixieError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            source: source.into(),
            cell_width,
            cell_height,
            state: Materialization::Pending,
        })
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Cell size in unscaled pixels.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    pub fn is_materialized(&self) -> bool {
        self.state.is_ready()
    }

    /// Decodes the image, slices it into cells and scales each cell.
    /// Does nothing if already materialized.
    pub fn ensure_materialized(&mut self, scale: ScaleFactor) -> PixieResult<SheetGrid> {
        if let Materialization::Pending = self.state {
            let sheet = Surface::new(self.source.decode()?);
            let grid = SheetGrid::from_source_size(
                sheet.width(),
                sheet.height(),
                self.cell_width,
                self.cell_height,
            );

            let raw: Vec<Surface> = (0..grid.len())
                .map(|index| {
                    let (x, y) = grid.origin_of(index);
                    sheet.region(x, y, grid.cell_width, grid.cell_height)
                })
                .collect();
            let scaled = raw
                .iter()
                .map(|cell| cell.scaled(scale))
                .collect::<PixieResult<Vec<_>>>()?;

            debug!(
                "Materialized spritesheet {} at {}: {} cells ({}x{})",
                self.source.describe(),
                scale,
                grid.len(),
                grid.cells_per_row,
                grid.rows
            );
            self.state = Materialization::Ready(SheetCells { grid, raw, scaled });
        }
        self.state.ready("Spritesheet").map(|cells| cells.grid)
    }

    /// Cell layout, if materialized.
    pub fn grid(&self) -> Option<SheetGrid> {
        self.state.get().map(|cells| cells.grid)
    }

    /// Number of cells, zero until materialized.
    pub fn len(&self) -> usize {
        self.grid().map_or(0, |grid| grid.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pre-scaled surface of one cell.
    pub fn cell(&self, index: usize) -> PixieResult<&Surface> {
        let cells = self.state.ready("Spritesheet")?;
        cells.scaled.get(index).ok_or(PixieError::CellIndexOutOfRange {
            index,
            cells: cells.scaled.len(),
        })
    }

    /// Unscaled cells in index order, for compositing.
    pub(crate) fn raw_cells(&self) -> PixieResult<&[Surface]> {
        self.state
            .ready("Spritesheet")
            .map(|cells| cells.raw.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn striped(width: u32, height: u32, cell: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let index = (y / cell) * (width / cell) + x / cell;
            Rgba([index as u8 * 10, 0, 0, 255])
        })
    }

    #[test]
    fn test_three_cells_left_to_right() {
        let mut sheet = Spritesheet::new(striped(24, 8, 8), 8, 8).unwrap();
        let grid = sheet.ensure_materialized(ScaleFactor::ONE).unwrap();
        assert_eq!(grid.len(), 3);
        for index in 0..3 {
            let cell = sheet.cell(index).unwrap();
            assert_eq!(cell.size(), (8, 8));
            assert_eq!(cell.pixel(4, 4), Some(Rgba([index as u8 * 10, 0, 0, 255])));
        }
        assert!(sheet.cell(3).is_err());
    }

    #[test]
    fn test_partial_cells_are_dropped() {
        let mut sheet = Spritesheet::new(RgbaImage::new(20, 13), 8, 8).unwrap();
        let grid = sheet.ensure_materialized(ScaleFactor::ONE).unwrap();
        assert_eq!(grid.cells_per_row, 2);
        assert_eq!(grid.rows, 1);
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn test_cells_are_scaled_raw_cells_are_not() {
        let mut sheet = Spritesheet::new(striped(16, 16, 8), 8, 8).unwrap();
        sheet.ensure_materialized(ScaleFactor::new(3).unwrap()).unwrap();
        assert_eq!(sheet.cell(3).unwrap().size(), (24, 24));
        assert_eq!(sheet.raw_cells().unwrap()[3].size(), (8, 8));
    }

    #[test]
    fn test_zero_cell_size_rejected() {
        let result = Spritesheet::new(RgbaImage::new(8, 8), 0, 8);
        assert!(matches!(
            result,
            Err(PixieError::InvalidCellSize { width: 0, height: 8 })
        ));
    }

    #[test]
    fn test_cell_before_materialize_fails() {
        let sheet = Spritesheet::new(RgbaImage::new(8, 8), 8, 8).unwrap();
        assert!(matches!(sheet.cell(0), Err(PixieError::NotMaterialized(_))));
        assert_eq!(sheet.grid(), None);
    }

    #[test]
    fn test_coordinate_index_conversion() {
        let grid = SheetGrid::from_source_size(32, 24, 8, 8);
        assert_eq!(grid.index_of(1, 2), 9);
        assert_eq!(grid.coord_of(9), (1, 2));
        assert_eq!(grid.origin_of(9), (8, 16));
    }
}
