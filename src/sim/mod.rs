//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Wall-clock timestamps are passed in, never read
//! - Seeded RNG only
//! - Players update in index order
//! - No rendering or input-device dependencies

pub mod bot;
pub mod collision;
pub mod danger;
pub mod grid;
pub mod piece;
pub mod spawn;
pub mod state;
pub mod tick;

pub use bot::{BotAlgorithm, BotController, BotPlan, BotStrategy, BotView, think};
pub use collision::token_collides;
pub use danger::DangerField;
pub use grid::{Grid, Shape, occupied_cells, occupied_cells_clipped};
pub use piece::{Obstacle, ShapeTemplate, catalog};
pub use spawn::{Lane, SpawnPlanner, SpawnPolicy, SpawnPolicyKind, can_place};
pub use state::{GameEvent, MatchPhase, MatchState, Player};
pub use tick::{Command, apply_command, interval_elapsed, tick};
