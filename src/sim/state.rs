//! Match state and core simulation types
//!
//! One `MatchState` is built per match and replaced wholesale on reset. It is
//! passed explicitly to every operation; nothing lives in globals.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bot::BotController;
use super::grid::Grid;
use super::piece::{Obstacle, catalog};
use super::spawn::{SpawnPlanner, SpawnPolicy};
use crate::config::GameConfig;
use crate::consts::SPEED_EPSILON;
use crate::error::ConfigError;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Running,
    Paused,
    /// Every player is out. Only a reset leaves this phase.
    Ended,
}

/// Things that happened during a tick, for logging and presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ObstaclesDescended,
    Spawned { player: usize, count: usize },
    PlayerLost { player: usize, score: u64 },
    MatchEnded,
}

/// One player's token, field and autopilot
#[derive(Debug)]
pub struct Player {
    pub id: usize,
    /// Token cell; the row is fixed for the match
    pub token: IVec2,
    pub obstacles: Vec<Obstacle>,
    pub score: u64,
    /// Collided; the player is frozen for the rest of the match
    pub ended: bool,
    pub bot: BotController,
    pub last_spawn_ms: f64,
    pub spawn_policy: Box<dyn SpawnPolicy>,
}

impl Player {
    fn new(id: usize, config: &GameConfig, now_ms: f64) -> Self {
        Self {
            id,
            token: IVec2::new(config.grid().center_column(), config.player_row),
            obstacles: Vec::new(),
            score: 0,
            ended: false,
            bot: BotController::default(),
            // Stagger the first wave of each player
            last_spawn_ms: now_ms - (config.spawn_interval_ms / 2.0) * (id + 1) as f64,
            spawn_policy: config.spawn_policy.build(),
        }
    }
}

/// Complete match state
#[derive(Debug)]
pub struct MatchState {
    pub config: GameConfig,
    pub grid: Grid,
    pub players: Vec<Player>,
    pub started_ms: f64,
    /// Wall-clock time spent paused, excluded from score and timers
    pub paused_total_ms: f64,
    pause_started_ms: Option<f64>,
    pub last_move_ms: f64,
    pub speed: f64,
    pub phase: MatchPhase,
    pub(crate) planner: SpawnPlanner,
    pub(crate) rng: Pcg32,
}

impl MatchState {
    /// Validate `config` and start a match at `now_ms`
    pub fn new(config: GameConfig, now_ms: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = Pcg32::seed_from_u64(config.seed);
        Ok(Self::start(config, now_ms, rng))
    }

    fn start(config: GameConfig, now_ms: f64, rng: Pcg32) -> Self {
        let planner = SpawnPlanner {
            shapes: catalog(),
            buffer_radius: config.buffer_radius,
            near_spawn_rows: config.near_spawn_rows,
            attempts: config.spawn_attempts,
        };
        let players = (0..config.players)
            .map(|id| Player::new(id, &config, now_ms))
            .collect();

        Self {
            grid: config.grid(),
            players,
            started_ms: now_ms,
            paused_total_ms: 0.0,
            pause_started_ms: None,
            last_move_ms: now_ms,
            speed: config.initial_speed,
            phase: MatchPhase::Running,
            planner,
            rng,
            config,
        }
    }

    /// Start a fresh match, carrying over each player's bot activation and
    /// algorithm. The RNG stream continues.
    pub fn reset(&mut self, now_ms: f64) {
        let carried: Vec<_> = self
            .players
            .iter()
            .map(|p| (p.bot.active, p.bot.algorithm))
            .collect();
        let rng = self.rng.clone();
        *self = Self::start(self.config.clone(), now_ms, rng);
        for (player, (active, algorithm)) in self.players.iter_mut().zip(carried) {
            player.bot.active = active;
            player.bot.algorithm = algorithm;
        }
        log::info!("Match reset");
    }

    pub fn is_paused(&self) -> bool {
        self.phase == MatchPhase::Paused
    }

    pub fn is_ended(&self) -> bool {
        self.phase == MatchPhase::Ended
    }

    pub fn player(&self, id: usize) -> Option<&Player> {
        self.players.get(id)
    }

    /// Unpaused time since the match started
    pub fn play_time_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.started_ms - self.paused_total_ms).max(0.0)
    }

    /// Obstacle descent interval at the current speed
    pub fn move_interval_ms(&self) -> f64 {
        self.config.move_interval_ms / self.speed.max(SPEED_EPSILON)
    }

    /// Spawn wave interval at the current speed
    pub fn spawn_interval_ms(&self) -> f64 {
        self.config.spawn_interval_ms / self.speed.max(SPEED_EPSILON)
    }

    /// Score for a given unpaused play time at the current speed
    pub fn score_for(&self, play_time_ms: f64) -> u64 {
        (play_time_ms / 1000.0 * crate::consts::SCORE_PER_SECOND * self.speed).floor() as u64
    }

    pub(crate) fn begin_pause(&mut self, now_ms: f64) {
        self.pause_started_ms = Some(now_ms);
        self.phase = MatchPhase::Paused;
    }

    /// Leave the pause, pushing every timer forward by the paused span
    pub(crate) fn end_pause(&mut self, now_ms: f64) {
        let paused = self
            .pause_started_ms
            .take()
            .map_or(0.0, |start| (now_ms - start).max(0.0));
        self.paused_total_ms += paused;
        self.last_move_ms += paused;
        for player in &mut self.players {
            player.last_spawn_ms += paused;
            player.bot.last_think_ms += paused;
        }
        self.phase = MatchPhase::Running;
    }
}
