//! Tetro Dodge - a falling-polyomino dodging game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, danger field, bots, update loop)
//! - `config`: Match configuration and presets
//! - `view`: Read-only frame snapshot for renderers
//! - `error`: Recoverable error kinds

pub mod config;
pub mod error;
pub mod sim;
pub mod view;

pub use config::{GameConfig, MatchPreset};
pub use error::{BotError, CommandError, ConfigError, SpawnError};

/// Default tuning values
pub mod consts {
    /// Players sharing the screen, each with their own grid
    pub const NUM_PLAYERS: usize = 2;

    /// Grid dimensions per player, in cells
    pub const GRID_COLUMNS: i32 = 10;
    pub const GRID_ROWS: i32 = 20;
    /// Pixel size of one cell
    pub const CELL_SIZE: i32 = 40;
    /// Largest accepted grid area, in cells
    pub const MAX_GRID_CELLS: i32 = 1 << 20;
    /// Token row, counted up from the bottom edge
    pub const PLAYER_ROWS_FROM_BOTTOM: i32 = 3;

    /// Obstacles descend one cell per move interval (ms, at speed 1.0)
    pub const MOVE_INTERVAL_MS: f64 = 600.0;
    /// Spawn waves fire once per spawn interval (ms, at speed 1.0)
    pub const SPAWN_INTERVAL_MS: f64 = 500.0;
    /// Bots think more often than obstacles fall
    pub const BOT_THINK_INTERVAL_MS: f64 = 100.0;

    /// Speed multiplier bounds
    pub const INITIAL_SPEED: f64 = 1.0;
    pub const SPEED_INCREMENT: f64 = 0.2;
    pub const MIN_SPEED_MULTIPLIER: f64 = 0.2;
    pub const MAX_SPEED_MULTIPLIER: f64 = 5.0;
    /// Floor used when dividing intervals by the multiplier
    pub const SPEED_EPSILON: f64 = 0.01;

    /// Score points per unpaused second at speed 1.0
    pub const SCORE_PER_SECOND: f64 = 10.0;

    /// Extra projection steps past the grid height
    pub const SIMULATION_DEPTH_MARGIN: i32 = 5;
    /// Upper bound on the depth margin, as a multiple of the grid height
    pub const MAX_DEPTH_MARGIN_GRIDS: i32 = 4;

    /// Spawn spacing
    pub const BUFFER_RADIUS: i32 = 2;
    pub const SOLO_BUFFER_RADIUS: i32 = 1;
    /// Only obstacles whose top row is above this row take part in buffer checks
    pub const NEAR_SPAWN_ROWS: i32 = 4;
    /// Placement attempts per lane per wave
    pub const SPAWN_ATTEMPTS: u32 = 1;

    /// Danger weighting used by the center-hugging bot
    pub const CENTER_HUGGER_DANGER_WEIGHT: f64 = 10.0;
    pub const CENTER_HUGGER_CENTER_WEIGHT: f64 = 0.2;
}
