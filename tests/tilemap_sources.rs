//! Integration tests for loading tilemaps and configuration from files.

use pixie::{load_csv, load_json, Config, PixieError, PixieResult, ScaleMode, TileGrid, EMPTY_TILE};
use std::fs;

#[test]
fn test_load_csv_file() -> PixieResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("level.csv");
    fs::write(&path, "0,1,2\n-1,-1,3\n\n")?;

    let grid = load_csv(&path)?;
    assert_eq!(grid.size(), (3, 2));
    assert_eq!(grid.get(0, 1), Some(EMPTY_TILE));
    assert_eq!(grid.get(2, 1), Some(3));
    Ok(())
}

#[test]
fn test_csv_with_blank_field_is_ragged() -> PixieResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ragged.csv");
    fs::write(&path, "1,2,3\n4,,6\n")?;

    match load_csv(&path) {
        Err(PixieError::RaggedTilemap {
            row,
            expected,
            found,
        }) => {
            assert_eq!((row, expected, found), (1, 3, 2));
        }
        other => panic!("expected a ragged tilemap error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_missing_csv_is_io_error() {
    let result = load_csv("no/such/map.csv");
    assert!(matches!(result, Err(PixieError::Io(_))));
}

#[test]
fn test_json_save_then_load() -> PixieResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("map.json");

    let mut grid = TileGrid::filled(4, 3, EMPTY_TILE)?;
    grid.set(2, 1, 7);
    grid.save_json(&path)?;

    assert_eq!(fs::read_to_string(&path)?, "[[-1,-1,-1,-1],[-1,-1,7,-1],[-1,-1,-1,-1]]");
    assert_eq!(load_json(&path)?, grid);
    Ok(())
}

#[test]
fn test_json_must_be_array_of_arrays() -> PixieResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"rows": [[1]]}"#)?;

    assert!(matches!(load_json(&path), Err(PixieError::Serde(_))));
    Ok(())
}

#[test]
fn test_config_file() -> PixieResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("game.json");
    fs::write(
        &path,
        r#"{"title": "cave", "logical_width": 384, "logical_height": 216, "scale": {"fixed": 4}}"#,
    )?;

    let config = Config::from_json_file(&path)?;
    assert_eq!(config.title, "cave");
    assert_eq!(config.logical_size(), (384, 216));
    assert_eq!(config.scale, ScaleMode::Fixed(4));
    assert_eq!(config.fps_cap, Some(60));
    Ok(())
}

#[test]
fn test_invalid_config_file_rejected() -> PixieResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("zero.json");
    fs::write(&path, r#"{"logical_width": 0}"#)?;

    assert!(matches!(
        Config::from_json_file(&path),
        Err(PixieError::InvalidConfig(_))
    ));
    Ok(())
}
