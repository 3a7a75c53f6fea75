//! Match configuration
//!
//! Fixed when a match starts; there is no mid-match reload.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::grid::Grid;
use crate::sim::spawn::{Lane, SpawnPolicyKind, default_lanes};

/// Observed game variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MatchPreset {
    /// One player, tight spawn buffer, exact-cell collisions
    Solo,
    /// Two players racing side by side
    #[default]
    Versus,
}

impl MatchPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPreset::Solo => "Solo",
            MatchPreset::Versus => "Versus",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "solo" | "single" => Some(MatchPreset::Solo),
            "versus" | "vs" => Some(MatchPreset::Versus),
            _ => None,
        }
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::from_preset(*self)
    }
}

/// Every tunable of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub players: usize,

    // === Grid (per player) ===
    pub columns: i32,
    pub rows: i32,
    pub cell_size: i32,
    /// Row the tokens live on
    pub player_row: i32,
    pub lanes: Vec<Lane>,

    // === Timing (ms at speed 1.0) ===
    pub move_interval_ms: f64,
    pub spawn_interval_ms: f64,
    pub bot_think_interval_ms: f64,

    // === Speed ===
    pub initial_speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub speed_increment: f64,

    // === Bots ===
    /// Danger projection steps beyond the grid height
    pub depth_margin: i32,

    // === Spawning ===
    pub buffer_radius: i32,
    pub near_spawn_rows: i32,
    /// Placement attempts per lane per wave (0 disables spawning)
    pub spawn_attempts: u32,
    pub spawn_policy: SpawnPolicyKind,

    // === Collision ===
    /// Also treat the cell above the token as a hit
    pub check_row_above: bool,

    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: NUM_PLAYERS,

            columns: GRID_COLUMNS,
            rows: GRID_ROWS,
            cell_size: CELL_SIZE,
            player_row: GRID_ROWS - PLAYER_ROWS_FROM_BOTTOM,
            lanes: default_lanes(),

            move_interval_ms: MOVE_INTERVAL_MS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            bot_think_interval_ms: BOT_THINK_INTERVAL_MS,

            initial_speed: INITIAL_SPEED,
            min_speed: MIN_SPEED_MULTIPLIER,
            max_speed: MAX_SPEED_MULTIPLIER,
            speed_increment: SPEED_INCREMENT,

            depth_margin: SIMULATION_DEPTH_MARGIN,

            buffer_radius: BUFFER_RADIUS,
            near_spawn_rows: NEAR_SPAWN_ROWS,
            spawn_attempts: SPAWN_ATTEMPTS,
            spawn_policy: SpawnPolicyKind::RandomLane,

            check_row_above: true,

            seed: 0x5EED,
        }
    }
}

impl GameConfig {
    pub fn from_preset(preset: MatchPreset) -> Self {
        match preset {
            MatchPreset::Versus => Self::default(),
            MatchPreset::Solo => Self {
                players: 1,
                buffer_radius: SOLO_BUFFER_RADIUS,
                check_row_above: false,
                ..Self::default()
            },
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.columns, self.rows, self.cell_size)
    }

    /// Danger projection depth: the grid height plus a margin
    pub fn simulation_depth(&self) -> i32 {
        self.rows.saturating_add(self.depth_margin)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.players == 0 {
            return invalid("at least one player is required".into());
        }
        if self.columns <= 0 || self.rows <= 0 || self.cell_size <= 0 {
            return invalid(format!(
                "grid {}x{} with cell size {} must be positive",
                self.columns, self.rows, self.cell_size
            ));
        }
        match self.columns.checked_mul(self.rows) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return invalid(format!(
                    "grid {}x{} exceeds {MAX_GRID_CELLS} cells",
                    self.columns, self.rows
                ));
            }
        }
        if self.player_row < 0 || self.player_row >= self.rows {
            return invalid(format!("player row {} is outside the grid", self.player_row));
        }

        if self.lanes.is_empty() {
            return invalid("at least one lane is required".into());
        }
        for lane in &self.lanes {
            if lane.width <= 0 || lane.start < 0 || lane.end() > self.columns {
                return invalid(format!(
                    "lane `{}` ({}+{}) does not fit {} columns",
                    lane.name, lane.start, lane.width, self.columns
                ));
            }
        }
        let mut spans: Vec<&Lane> = self.lanes.iter().collect();
        spans.sort_by_key(|l| l.start);
        for pair in spans.windows(2) {
            if pair[0].end() > pair[1].start {
                return invalid(format!(
                    "lanes `{}` and `{}` overlap",
                    pair[0].name, pair[1].name
                ));
            }
        }
        match self.spawn_policy {
            SpawnPolicyKind::FixedLane { lane } if lane >= self.lanes.len() => {
                return invalid(format!("spawn policy names missing lane {lane}"));
            }
            SpawnPolicyKind::MultiLane { count: 0 } => {
                return invalid("multi-lane policy needs at least one lane".into());
            }
            _ => {}
        }

        let intervals = [
            self.move_interval_ms,
            self.spawn_interval_ms,
            self.bot_think_interval_ms,
        ];
        if intervals.iter().any(|i| !i.is_finite() || *i <= 0.0) {
            return invalid("intervals must be positive".into());
        }

        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed) {
            return invalid(format!(
                "speed bounds [{}, {}] are not ordered and positive",
                self.min_speed, self.max_speed
            ));
        }
        if self.initial_speed < self.min_speed || self.initial_speed > self.max_speed {
            return invalid(format!(
                "initial speed {} outside [{}, {}]",
                self.initial_speed, self.min_speed, self.max_speed
            ));
        }
        if self.speed_increment <= 0.0 {
            return invalid("speed increment must be positive".into());
        }

        if self.depth_margin < 0 || self.buffer_radius < 0 {
            return invalid("depth margin and buffer radius cannot be negative".into());
        }
        if self.depth_margin > self.rows * MAX_DEPTH_MARGIN_GRIDS {
            return invalid(format!(
                "depth margin {} exceeds {} grid heights",
                self.depth_margin, MAX_DEPTH_MARGIN_GRIDS
            ));
        }
        if self.buffer_radius > self.columns.max(self.rows) {
            return invalid(format!(
                "buffer radius {} is wider than the grid",
                self.buffer_radius
            ));
        }
        Ok(())
    }
}
