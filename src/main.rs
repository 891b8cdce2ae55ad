//! # Pixie Demo
//!
//! Walks a player sprite around a tilemap. The map is read from a CSV or JSON
//! file, or generated from a seed over a procedurally drawn spritesheet.

use clap::Parser;
use image::{Rgba, RgbaImage};
use log::info;
use pixie::{
    launch, load_csv, load_json, Assets, Config, KeyCode, PixieError, PixieResult, ScaleMode,
    TileGrid, BLACK, WHITE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Side of one map cell in logical pixels
const CELL: u32 = 8;

const GRASS: i32 = 0;
const WALL: i32 = 1;
const WATER: i32 = 2;
const FLOWER: i32 = 3;

/// Command line arguments for the Pixie demo.
#[derive(Parser, Debug)]
#[command(name = "pixie")]
#[command(about = "A tiny fantasy-console sprite and tilemap demo")]
#[command(version)]
struct Args {
    /// Tilemap file (.csv or .json); a map is generated when omitted
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Random seed for the generated map
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed integer display scale instead of fitting the monitor
    #[arg(long)]
    scale: Option<u32>,

    /// Run fullscreen
    #[arg(long)]
    fullscreen: bool,

    /// Disable the frame-rate cap
    #[arg(long)]
    uncapped: bool,

    /// Request vertical sync
    #[arg(long)]
    vsync: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> PixieResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);
    info!("Starting Pixie demo v{}", pixie::VERSION);

    let config = build_config(&args)?;
    let grid = match &args.map {
        Some(path) => load_map(path)?,
        None => generate_map(args.seed, config.logical_size())?,
    };
    info!("Map is {}x{} cells", grid.width(), grid.height());

    let spawn = find_spawn(&grid);
    let mut assets = Assets::new();
    let sheet = assets.add_spritesheet(demo_spritesheet(), CELL, CELL)?;
    let map = assets.add_tilemap(sheet, grid, None)?;
    let player = assets.add_sprite(player_sprite())?;

    let (mut x, mut y) = spawn;
    let mut show_hud = true;

    launch(config, assets, move |frame| {
        let (mut next_x, mut next_y) = (x, y);
        if frame.btn([KeyCode::Left, KeyCode::A]) {
            next_x -= 1.0;
        }
        if frame.btn([KeyCode::Right, KeyCode::D]) {
            next_x += 1.0;
        }
        if frame.btn([KeyCode::Up, KeyCode::W]) {
            next_y -= 1.0;
        }
        if frame.btn([KeyCode::Down, KeyCode::S]) {
            next_y += 1.0;
        }
        if frame.btnp(KeyCode::Tab) {
            show_hud = !show_hud;
        }

        let tilemap = frame.assets().tilemap(map)?;
        if is_walkable(tilemap.get_tile(cell_of(next_x), cell_of(y))) {
            x = next_x;
        }
        if is_walkable(tilemap.get_tile(cell_of(x), cell_of(next_y))) {
            y = next_y;
        }

        frame.cls(BLACK);
        frame.tilemap(0.0, 0.0, map)?;
        frame.sprite(x, y, player)?;

        if show_hud {
            let (width, _) = frame.logical_size();
            frame.rect(0.0, 0.0, width as f32, 10.0, BLACK);
            let hud = format!("{:.0} fps {}", frame.fps(), frame.scale());
            frame.text(1.0, 1.0, &hud, WHITE)?;
        }
        Ok(())
    })
}

/// Initializes logging for the demo.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();
}

/// Merges the configuration file with command line overrides.
fn build_config(args: &Args) -> PixieResult<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::new("pixie demo"),
    };
    if let Some(scale) = args.scale {
        config = config.with_scale(ScaleMode::Fixed(scale));
    }
    if args.fullscreen {
        config = config.with_fullscreen(true);
    }
    if args.uncapped {
        config = config.with_fps_cap(None);
    }
    if args.vsync {
        config = config.with_vsync(true);
    }
    config.validate()?;
    Ok(config)
}

fn load_map(path: &Path) -> PixieResult<TileGrid> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => load_csv(path),
        Some("json") => load_json(path),
        _ => Err(PixieError::InvalidConfig(format!(
            "map {} must be a .csv or .json file",
            path.display()
        ))),
    }
}

/// Walled map covering the logical screen with random water and flowers.
fn generate_map(seed: u64, logical: (u32, u32)) -> PixieResult<TileGrid> {
    let mut rng = StdRng::seed_from_u64(seed);
    let width = (logical.0 / CELL).max(3) as usize;
    let height = (logical.1 / CELL).max(3) as usize;

    let rows: Vec<Vec<i32>> = (0..height)
        .map(|row| {
            (0..width)
                .map(|col| {
                    if row == 0 || col == 0 || row == height - 1 || col == width - 1 {
                        WALL
                    } else {
                        match rng.gen_range(0..100) {
                            0..=7 => WALL,
                            8..=15 => WATER,
                            16..=25 => FLOWER,
                            _ => GRASS,
                        }
                    }
                })
                .collect::<Vec<i32>>()
        })
        .collect();
    TileGrid::new(rows)
}

fn is_walkable(tile: i32) -> bool {
    matches!(tile, GRASS | FLOWER)
}

fn cell_of(position: f32) -> i32 {
    ((position + CELL as f32 / 2.0) / CELL as f32).floor() as i32
}

/// Top-left pixel of the first walkable cell.
fn find_spawn(grid: &TileGrid) -> (f32, f32) {
    grid.rows()
        .iter()
        .enumerate()
        .find_map(|(row, values)| {
            values
                .iter()
                .position(|&tile| is_walkable(tile))
                .map(|col| ((col as u32 * CELL) as f32, (row as u32 * CELL) as f32))
        })
        .unwrap_or((0.0, 0.0))
}

/// Four 8x8 cells: grass, wall, water, flower.
fn demo_spritesheet() -> RgbaImage {
    RgbaImage::from_fn(CELL * 4, CELL, |x, y| {
        let (cx, cy) = (x % CELL, y % CELL);
        match (x / CELL) as i32 {
            GRASS if (cx + cy * 3) % 7 == 0 => Rgba([40, 120, 40, 255]),
            GRASS => Rgba([60, 160, 60, 255]),
            WALL if cy % 4 == 3 || (cx + (cy / 4) * 4) % 8 == 0 => Rgba([70, 60, 60, 255]),
            WALL => Rgba([130, 110, 100, 255]),
            WATER if (cx + cy) % 5 == 0 => Rgba([120, 170, 255, 255]),
            WATER => Rgba([40, 80, 200, 255]),
            _ if (3..5).contains(&cx) && (3..5).contains(&cy) => Rgba([250, 220, 60, 255]),
            _ if (2..6).contains(&cx) && (2..6).contains(&cy) => Rgba([230, 80, 140, 255]),
            _ => Rgba([60, 160, 60, 255]),
        }
    })
}

/// Small 8x8 figure on a transparent background.
fn player_sprite() -> RgbaImage {
    const SHAPE: [&str; 8] = [
        "..####..", "..#..#..", "..####..", "...##...", ".######.", "...##...", "..#..#..",
        ".##..##.",
    ];
    RgbaImage::from_fn(CELL, CELL, |x, y| {
        match SHAPE[y as usize].as_bytes()[x as usize] {
            b'#' => Rgba([255, 240, 200, 255]),
            _ => Rgba([0, 0, 0, 0]),
        }
    })
}
