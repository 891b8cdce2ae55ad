//! # Pixie
//!
//! A tiny fantasy-console style layer for 2D sprite and tilemap games, built
//! on top of macroquad.
//!
//! ## Architecture Overview
//!
//! Pixie keeps every expensive surface operation out of the frame loop. The
//! core concepts are:
//!
//! - **Assets**: an explicit registry of sprites, spritesheets and tilemaps.
//!   Resources added before the window exists stay pending until the display
//!   scale is known, then get decoded, sliced, baked and pre-scaled once.
//! - **Scale**: a single integer factor resolved at startup (fixed, fit to the
//!   monitor, or derived from the fullscreen resolution).
//! - **Runtime**: the frame loop. It polls events, snapshots input, calls the
//!   user update callback with a [`Frame`], presents and paces the frame.
//! - **Platform**: the capability trait the runtime talks to. The macroquad
//!   backend drives a real window; the headless backend records draw calls.
//!
//! ```no_run
//! use pixie::{launch, Assets, Config, KeyCode, BLACK};
//!
//! let mut assets = Assets::new();
//! let player = assets.add_sprite("player.png").unwrap();
//! let mut x = 60.0;
//!
//! launch(Config::new("demo"), assets, move |frame| {
//!     if frame.btn([KeyCode::Right, KeyCode::D]) {
//!         x += 1.0;
//!     }
//!     frame.cls(BLACK);
//!     frame.sprite(x, 60.0, player)
//! })
//! .unwrap();
//! ```

pub mod assets;
pub mod config;
pub mod frame;
pub mod input;
pub mod platform;
pub mod runtime;
pub mod scale;
pub mod surface;

pub use assets::*;
pub use config::*;
pub use frame::*;
pub use input::*;
pub use platform::*;
pub use runtime::*;
pub use scale::*;
pub use surface::*;

pub use macroquad::color::colors::*;
pub use macroquad::color::Color;

use std::path::PathBuf;

/// Core error type for Pixie.
#[derive(thiserror::Error, Debug)]
pub enum PixieError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// An image file could not be opened or decoded
    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A CSV tilemap contained something other than integers
    #[error("CSV tilemap line {line}: {message}")]
    CsvParse { line: usize, message: String },

    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Runtime operation called in the wrong loop state
    #[error("Invalid runtime state: {0}")]
    InvalidState(String),

    /// Spritesheet cells must be at least one pixel in each direction
    #[error("Invalid spritesheet cell size {width}x{height}")]
    InvalidCellSize { width: u32, height: u32 },

    /// Tilemap grid has no rows or no columns
    #[error("Tilemap grid is empty")]
    EmptyTilemap,

    /// Tilemap grid is not rectangular
    #[error("Tilemap row {row} has {found} cells, expected {expected}")]
    RaggedTilemap {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Tilemap refers to a cell the spritesheet does not have
    #[error("Tile index {index} at column {col}, row {row} is out of range for a spritesheet with {cells} cells")]
    TileIndexOutOfRange {
        index: i32,
        col: usize,
        row: usize,
        cells: usize,
    },

    /// A draw call referred to a spritesheet cell that does not exist
    #[error("Spritesheet cell {index} is out of range ({cells} cells)")]
    CellIndexOutOfRange { index: usize, cells: usize },

    /// A resource was used before its surfaces were prepared
    #[error("{0} has not been materialized yet")]
    NotMaterialized(&'static str),

    /// A handle does not belong to this asset registry
    #[error("Unknown resource handle: {0}")]
    UnknownResource(String),

    /// Assets were already materialized at another scale
    #[error("Assets are materialized at scale {resolved}, cannot materialize at scale {requested}")]
    ScaleMismatch { resolved: u32, requested: u32 },

    /// Fullscreen scaling needs the monitor resolution
    #[error("Primary monitor size is unavailable")]
    MonitorUnavailable,

    /// Window or display initialization failed
    #[error("Window initialization failed: {0}")]
    Window(String),

    /// Font could not be loaded
    #[error("Font error: {0}")]
    Font(String),

    /// Surface exceeds what the backend can upload as a texture
    #[error("Surface of {width}x{height} pixels is too large for the platform")]
    SurfaceTooLarge { width: u64, height: u64 },
}

/// Result type used throughout the Pixie codebase.
pub type PixieResult<T> = Result<T, PixieError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
