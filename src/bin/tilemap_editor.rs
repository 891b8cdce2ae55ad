//! # Tilemap Editor
//!
//! Paints spritesheet cells into a tilemap and saves it as a JSON array of
//! arrays that the demo and [`pixie::load_json`] read back.
//!
//! Controls: arrow keys move the cursor, `[` and `]` pick the cell, space
//! paints, backspace erases and `S` saves.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{error, info, warn};
use pixie::{
    launch, load_json, Assets, Config, Frame, KeyCode, PixieError, PixieResult, Platform,
    SheetGrid, SpritesheetId, TileGrid, DARKGRAY, EMPTY_TILE, WHITE, YELLOW,
};
use std::path::PathBuf;

/// Height of the status line in logical pixels
const STATUS_HEIGHT: u32 = 18;

/// Gap between the map and the palette in logical pixels
const GAP: u32 = 4;

/// Command line arguments for the tilemap editor.
#[derive(Parser, Debug)]
#[command(name = "tilemap_editor")]
#[command(about = "Paint spritesheet cells into a JSON tilemap")]
#[command(version)]
struct Args {
    /// Spritesheet image
    spritesheet: PathBuf,

    /// Width of one spritesheet cell in pixels
    cell_width: u32,

    /// Height of one spritesheet cell in pixels
    cell_height: u32,

    /// Tilemap JSON file to write; loaded first if it exists
    output: PathBuf,

    /// Map width in cells for a new tilemap
    #[arg(long, default_value_t = 16)]
    width: usize,

    /// Map height in cells for a new tilemap
    #[arg(long, default_value_t = 16)]
    height: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Editing state carried between frames.
struct Editor {
    sheet: SpritesheetId,
    grid: TileGrid,
    cell_size: (u32, u32),
    cursor: (usize, usize),
    selected: usize,
    output: PathBuf,
    status: String,
}

impl Editor {
    fn palette_top(&self) -> f32 {
        (self.grid.height() as u32 * self.cell_size.1 + GAP) as f32
    }

    fn update<P: Platform>(&mut self, frame: &mut Frame<'_, P>) -> PixieResult<()> {
        let cells = frame.assets().spritesheet(self.sheet)?.len();
        self.handle_input(frame, cells);

        frame.cls(DARKGRAY);
        self.draw_map(frame)?;
        self.draw_palette(frame)?;
        let (_, height) = frame.logical_size();
        frame.text(1.0, (height - STATUS_HEIGHT + 1) as f32, &self.status, WHITE)
    }

    fn handle_input<P: Platform>(&mut self, frame: &Frame<'_, P>, cells: usize) {
        let (col, row) = self.cursor;
        if frame.btnp(KeyCode::Left) {
            self.cursor.0 = col.saturating_sub(1);
        }
        if frame.btnp(KeyCode::Right) {
            self.cursor.0 = (col + 1).min(self.grid.width() - 1);
        }
        if frame.btnp(KeyCode::Up) {
            self.cursor.1 = row.saturating_sub(1);
        }
        if frame.btnp(KeyCode::Down) {
            self.cursor.1 = (row + 1).min(self.grid.height() - 1);
        }

        if cells > 0 {
            if frame.btnp(KeyCode::LeftBracket) {
                self.selected = (self.selected + cells - 1) % cells;
            }
            if frame.btnp(KeyCode::RightBracket) {
                self.selected = (self.selected + 1) % cells;
            }
        }

        let (col, row) = self.cursor;
        if frame.btn(KeyCode::Space) && cells > 0 {
            self.grid.set(col, row, self.selected as i32);
        }
        if frame.btn(KeyCode::Backspace) {
            self.grid.set(col, row, EMPTY_TILE);
        }

        if frame.btnp(KeyCode::S) {
            self.status = match self.grid.save_json(&self.output) {
                Ok(()) => {
                    info!("Saved tilemap to {}", self.output.display());
                    format!("saved {}", self.output.display())
                }
                Err(e) => {
                    warn!("Could not save {}: {}", self.output.display(), e);
                    "save failed".to_string()
                }
            };
        } else if frame.btnp([KeyCode::Left, KeyCode::Right, KeyCode::Up, KeyCode::Down])
            || frame.btnp([KeyCode::LeftBracket, KeyCode::RightBracket])
        {
            self.status = format!(
                "({},{}) cell {}",
                self.cursor.0, self.cursor.1, self.selected
            );
        }
    }

    fn draw_map<P: Platform>(&self, frame: &mut Frame<'_, P>) -> PixieResult<()> {
        let (cell_w, cell_h) = (self.cell_size.0 as f32, self.cell_size.1 as f32);
        for (row, values) in self.grid.rows().iter().enumerate() {
            for (col, &tile) in values.iter().enumerate() {
                if let Ok(index) = usize::try_from(tile) {
                    frame.cell(col as f32 * cell_w, row as f32 * cell_h, self.sheet, index)?;
                }
            }
        }

        let x = self.cursor.0 as f32 * cell_w;
        let y = self.cursor.1 as f32 * cell_h;
        outline(frame, x, y, cell_w, cell_h);
        Ok(())
    }

    fn draw_palette<P: Platform>(&self, frame: &mut Frame<'_, P>) -> PixieResult<()> {
        let Some(grid) = frame.assets().spritesheet(self.sheet)?.grid() else {
            return Ok(());
        };
        let top = self.palette_top();
        let (cell_w, cell_h) = (grid.cell_width as f32, grid.cell_height as f32);
        for index in 0..grid.len() {
            let (col, row) = grid.coord_of(index);
            frame.cell(col as f32 * cell_w, top + row as f32 * cell_h, self.sheet, index)?;
        }

        if self.selected < grid.len() {
            let (col, row) = grid.coord_of(self.selected);
            outline(frame, col as f32 * cell_w, top + row as f32 * cell_h, cell_w, cell_h);
        }
        Ok(())
    }
}

/// Rejects a loaded map that uses cells the spritesheet does not have.
fn check_tiles(grid: &TileGrid, cells: usize) -> PixieResult<()> {
    for (row, values) in grid.rows().iter().enumerate() {
        for (col, &index) in values.iter().enumerate() {
            let known = index == EMPTY_TILE || usize::try_from(index).is_ok_and(|i| i < cells);
            if !known {
                return Err(PixieError::TileIndexOutOfRange {
                    index,
                    col,
                    row,
                    cells,
                });
            }
        }
    }
    Ok(())
}

fn outline<P: Platform>(frame: &mut Frame<'_, P>, x: f32, y: f32, width: f32, height: f32) {
    frame.line((x, y), (x + width, y), YELLOW);
    frame.line((x, y + height), (x + width, y + height), YELLOW);
    frame.line((x, y), (x, y + height), YELLOW);
    frame.line((x + width, y), (x + width, y + height), YELLOW);
}

fn main() -> PixieResult<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            println!("Error. Wrong arguments ({:?}).", e.kind());
            println!("{}", Args::command().render_help());
            println!("Ex: tilemap_editor spritesheet.png 8 8 tilemap.json");
            return Ok(());
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_timestamp(None)
        .init();

    let grid = if args.output.exists() {
        info!("Editing existing tilemap {}", args.output.display());
        load_json(&args.output)?
    } else {
        TileGrid::filled(args.width, args.height, EMPTY_TILE)?
    };

    let mut assets = Assets::new();
    let sheet = assets.add_spritesheet(args.spritesheet.clone(), args.cell_width, args.cell_height)?;

    let (sheet_w, sheet_h) =
        image::image_dimensions(&args.spritesheet).map_err(|source| PixieError::ImageLoad {
            path: args.spritesheet.clone(),
            source,
        })?;
    let cells =
        SheetGrid::from_source_size(sheet_w, sheet_h, args.cell_width, args.cell_height).len();
    if let Err(e) = check_tiles(&grid, cells) {
        error!("{} does not match {}", args.output.display(), args.spritesheet.display());
        eprintln!("Error. {}: {}", args.output.display(), e);
        std::process::exit(1);
    }

    let map_w = grid.width() as u32 * args.cell_width;
    let map_h = grid.height() as u32 * args.cell_height;

    let config = Config::new(format!("tilemap editor: {}", args.output.display()))
        .with_logical_size(map_w.max(sheet_w), map_h + GAP + sheet_h + STATUS_HEIGHT);

    let mut editor = Editor {
        sheet,
        grid,
        cell_size: (args.cell_width, args.cell_height),
        cursor: (0, 0),
        selected: 0,
        output: args.output,
        status: "[ ] pick, space paint, S save".to_string(),
    };

    launch(config, assets, move |frame| editor.update(frame))
}
