//! Integration tests for deferred materialization of sprites, spritesheets
//! and tilemaps.

use image::{Rgba, RgbaImage};
use pixie::{
    Assets, PixieError, PixieResult, ScaleFactor, SheetGrid, Spritesheet, TileGrid, EMPTY_TILE,
    MAX_SURFACE_SIDE,
};
use proptest::prelude::*;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// 24x8 sheet: red, green and blue 8x8 cells.
fn rgb_sheet() -> RgbaImage {
    RgbaImage::from_fn(24, 8, |x, _| match x / 8 {
        0 => RED,
        1 => GREEN,
        _ => BLUE,
    })
}

#[test]
fn test_sheet_from_png_file() -> PixieResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sheet.png");
    rgb_sheet()
        .save(&path)
        .map_err(|source| PixieError::ImageLoad {
            path: path.clone(),
            source,
        })?;

    let mut assets = Assets::new();
    let sheet = assets.add_spritesheet(path, 8, 8)?;
    assets.materialize_all(ScaleFactor::new(2).unwrap())?;

    let spritesheet = assets.spritesheet(sheet)?;
    assert_eq!(spritesheet.len(), 3);
    assert_eq!(spritesheet.cell(1)?.size(), (16, 16));
    assert_eq!(spritesheet.cell(1)?.pixel(15, 15), Some(GREEN));
    Ok(())
}

#[test]
fn test_tilemap_with_empty_cell() -> PixieResult<()> {
    let mut assets = Assets::new();
    let sheet = assets.add_spritesheet(rgb_sheet(), 8, 8)?;
    let map = assets.add_tilemap(sheet, TileGrid::new(vec![vec![0, -1], vec![1, 2]])?, None)?;
    assets.materialize_all(ScaleFactor::new(3).unwrap())?;

    let surface = assets.tilemap_surface(map)?;
    assert_eq!(surface.size(), (48, 48));
    assert_eq!(surface.pixel(0, 0), Some(RED));
    assert_eq!(surface.pixel(47, 0).map(|p| p.0[3]), Some(0));
    assert_eq!(surface.pixel(0, 47), Some(GREEN));
    assert_eq!(surface.pixel(47, 47), Some(BLUE));
    Ok(())
}

#[test]
fn test_missing_image_aborts_materialization() {
    let mut assets = Assets::new();
    assets.add_sprite("does/not/exist.png").unwrap();
    let result = assets.materialize_all(ScaleFactor::ONE);
    assert!(matches!(result, Err(PixieError::ImageLoad { .. })));
}

#[test]
fn test_sheets_materialize_before_tilemaps() -> PixieResult<()> {
    // the tilemap is registered against a sheet registered later in time
    // than a sprite, yet baking still finds the sheet ready
    let mut assets = Assets::new();
    assets.add_sprite(RgbaImage::new(1, 1))?;
    let sheet = assets.add_spritesheet(rgb_sheet(), 8, 8)?;
    let map = assets.add_tilemap(sheet, TileGrid::filled(3, 1, 2)?, None)?;
    assets.add_sprite(RgbaImage::new(1, 1))?;

    assets.materialize_all(ScaleFactor::ONE)?;
    assert_eq!(assets.tilemap(map)?.size(), Some((24, 8)));
    assert_eq!(assets.pending_count(), 0);
    Ok(())
}

#[test]
fn test_color_key_turns_pixels_transparent() -> PixieResult<()> {
    let mut assets = Assets::new();
    let sheet = assets.add_spritesheet(rgb_sheet(), 8, 8)?;
    let map = assets.add_tilemap(sheet, TileGrid::new(vec![vec![0, 2]])?, Some([0, 0, 255]))?;
    assets.materialize_all(ScaleFactor::ONE)?;

    let surface = assets.tilemap_surface(map)?;
    assert_eq!(surface.pixel(4, 4), Some(RED));
    assert_eq!(surface.pixel(12, 4).map(|p| p.0[3]), Some(0));
    Ok(())
}

#[test]
fn test_huge_scale_is_rejected_not_overflowed() {
    let mut assets = Assets::new();
    assets.add_sprite(RgbaImage::new(8, 8)).unwrap();

    let result = assets.materialize_all(ScaleFactor::new(1 << 30).unwrap());
    match result {
        Err(PixieError::SurfaceTooLarge { width, height }) => {
            assert_eq!((width, height), (8 << 30, 8 << 30));
        }
        other => panic!("expected SurfaceTooLarge, got {:?}", other),
    }
}

#[test]
fn test_oversized_tilemap_canvas_is_rejected() -> PixieResult<()> {
    let mut assets = Assets::new();
    let sheet = assets.add_spritesheet(rgb_sheet(), 8, 8)?;
    let cols = MAX_SURFACE_SIDE as usize / 8 + 1;
    assets.add_tilemap(sheet, TileGrid::filled(cols, 1, EMPTY_TILE)?, None)?;

    let result = assets.materialize_all(ScaleFactor::ONE);
    assert!(matches!(
        result,
        Err(PixieError::SurfaceTooLarge { height: 8, .. })
    ));
    Ok(())
}

proptest! {
    #[test]
    fn test_cell_count_truncates(
        width in 1u32..64,
        height in 1u32..64,
        cell_w in 1u32..16,
        cell_h in 1u32..16,
    ) {
        let mut sheet = Spritesheet::new(RgbaImage::new(width, height), cell_w, cell_h).unwrap();
        let grid = sheet.ensure_materialized(ScaleFactor::ONE).unwrap();
        prop_assert_eq!(grid.len(), ((width / cell_w) * (height / cell_h)) as usize);
        prop_assert_eq!(sheet.len(), grid.len());
    }

    #[test]
    fn test_index_coordinate_round_trip(
        per_row in 1u32..32,
        rows in 1u32..32,
        seed in any::<u32>(),
    ) {
        let grid = SheetGrid::from_source_size(per_row * 8, rows * 8, 8, 8);
        let index = (seed as usize) % grid.len();
        let (x, y) = grid.coord_of(index);
        prop_assert!(x < per_row && y < rows);
        prop_assert_eq!(grid.index_of(x, y), index);
    }

    #[test]
    fn test_baked_size_matches_grid(
        cols in 1usize..8,
        rows in 1usize..8,
        scale in 1u32..5,
    ) {
        let mut assets = Assets::new();
        let sheet = assets.add_spritesheet(rgb_sheet(), 8, 8).unwrap();
        let map = assets
            .add_tilemap(sheet, TileGrid::filled(cols, rows, 1).unwrap(), None)
            .unwrap();
        assets.materialize_all(ScaleFactor::new(scale).unwrap()).unwrap();

        let expected = (cols as u32 * 8 * scale, rows as u32 * 8 * scale);
        prop_assert_eq!(assets.tilemap(map).unwrap().size(), Some(expected));
    }
}
