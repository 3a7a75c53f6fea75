//! Read-only frame snapshot for renderers
//!
//! Positions are in pixels, ready to draw. Capturing a frame never touches
//! the simulation.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::sim::grid::Grid;
use crate::sim::state::{MatchState, Player};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    /// Top-left pixel of the bounding box
    pub origin: IVec2,
    /// Top-left pixel of each filled cell
    pub cells: Vec<IVec2>,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: usize,
    pub token: IVec2,
    pub score: u64,
    pub ended: bool,
    pub bot_active: bool,
    pub bot_algorithm: u8,
    /// Planned cells, empty unless the bot is driving
    pub bot_path: Vec<IVec2>,
    pub obstacles: Vec<ObstacleView>,
}

impl PlayerView {
    fn capture(player: &Player, grid: &Grid) -> Self {
        let bot_path = if player.bot.active {
            player.bot.path.iter().map(|&c| grid.to_pixels(c)).collect()
        } else {
            Vec::new()
        };
        Self {
            id: player.id,
            token: grid.to_pixels(player.token),
            score: player.score,
            ended: player.ended,
            bot_active: player.bot.active,
            bot_algorithm: player.bot.algorithm.number(),
            bot_path,
            obstacles: player
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    origin: grid.to_pixels(o.origin),
                    cells: o.cells().into_iter().map(|c| grid.to_pixels(c)).collect(),
                    color: o.color,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub grid: Grid,
    pub speed: f64,
    pub paused: bool,
    pub ended: bool,
    pub players: Vec<PlayerView>,
}

impl FrameView {
    pub fn capture(state: &MatchState) -> Self {
        Self {
            grid: state.grid,
            speed: state.speed,
            paused: state.is_paused(),
            ended: state.is_ended(),
            players: state
                .players
                .iter()
                .map(|p| PlayerView::capture(p, &state.grid))
                .collect(),
        }
    }
}
