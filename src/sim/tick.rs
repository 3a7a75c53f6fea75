//! Update loop and input commands
//!
//! `tick` is called once per display refresh with a wall-clock timestamp in
//! milliseconds. Each timer is a plain "has the interval passed since it last
//! fired" check; missed intervals are not caught up.

use serde::{Deserialize, Serialize};

use super::bot::{BotAlgorithm, BotView};
use super::collision::token_collides;
use super::danger::DangerField;
use super::state::{GameEvent, MatchPhase, MatchState};
use crate::error::CommandError;

/// Discrete input, applied immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveLeft { player: usize },
    MoveRight { player: usize },
    TogglePause,
    ToggleBot { player: usize },
    /// Select algorithm 1..=4
    SetBotAlgorithm { player: usize, algorithm: u8 },
    IncreaseSpeed,
    DecreaseSpeed,
    ResetIfEnded,
}

impl Command {
    /// Default two-player keyboard layout. Once the match has ended every key
    /// restarts it.
    pub fn from_key(key: &str, match_ended: bool) -> Option<Self> {
        if match_ended {
            return Some(Command::ResetIfEnded);
        }
        let command = match key.to_lowercase().as_str() {
            "p" => Command::TogglePause,
            "arrowleft" => Command::MoveLeft { player: 0 },
            "arrowright" => Command::MoveRight { player: 0 },
            "b" => Command::ToggleBot { player: 0 },
            "a" => Command::MoveLeft { player: 1 },
            "d" => Command::MoveRight { player: 1 },
            "n" => Command::ToggleBot { player: 1 },
            "arrowup" => Command::IncreaseSpeed,
            "arrowdown" => Command::DecreaseSpeed,
            digit @ ("1" | "2" | "3" | "4") => Command::SetBotAlgorithm {
                player: 0,
                algorithm: digit.parse().ok()?,
            },
            digit @ ("7" | "8" | "9") => Command::SetBotAlgorithm {
                player: 1,
                algorithm: digit.parse::<u8>().ok()? - 6,
            },
            "0" => Command::SetBotAlgorithm {
                player: 1,
                algorithm: 4,
            },
            _ => return None,
        };
        Some(command)
    }
}

/// True when more than `interval_ms` has passed since `last_ms`
#[inline]
pub fn interval_elapsed(now_ms: f64, last_ms: f64, interval_ms: f64) -> bool {
    now_ms - last_ms > interval_ms
}

/// Apply one command. Ended matches only accept a reset; paused matches only
/// accept unpause and reset. Rejected commands leave the state untouched.
pub fn apply_command(
    state: &mut MatchState,
    command: Command,
    now_ms: f64,
) -> Result<(), CommandError> {
    if state.is_ended() {
        if command == Command::ResetIfEnded {
            state.reset(now_ms);
        }
        return Ok(());
    }

    match command {
        Command::ResetIfEnded => {}
        Command::TogglePause => {
            if state.is_paused() {
                state.end_pause(now_ms);
            } else {
                state.begin_pause(now_ms);
            }
        }
        _ if state.is_paused() => {}
        Command::MoveLeft { player } | Command::MoveRight { player } => {
            let grid = state.grid;
            let p = state
                .players
                .get_mut(player)
                .ok_or(CommandError::UnknownPlayer(player))?;
            if !p.bot.active && !p.ended {
                let step = if matches!(command, Command::MoveLeft { .. }) { -1 } else { 1 };
                p.token.x = grid.clamp_column(p.token.x + step);
            }
        }
        Command::ToggleBot { player } => {
            let p = state
                .players
                .get_mut(player)
                .ok_or(CommandError::UnknownPlayer(player))?;
            p.bot.active = !p.bot.active;
        }
        Command::SetBotAlgorithm { player, algorithm } => {
            let algorithm = BotAlgorithm::from_number(algorithm)?;
            let p = state
                .players
                .get_mut(player)
                .ok_or(CommandError::UnknownPlayer(player))?;
            p.bot.algorithm = algorithm;
        }
        Command::IncreaseSpeed => {
            state.speed = (state.speed + state.config.speed_increment).min(state.config.max_speed);
        }
        Command::DecreaseSpeed => {
            state.speed = (state.speed - state.config.speed_increment).max(state.config.min_speed);
        }
    }
    Ok(())
}

/// Advance the match to `now_ms`
pub fn tick(state: &mut MatchState, now_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != MatchPhase::Running {
        return events;
    }

    // Descent for every live player first
    if interval_elapsed(now_ms, state.last_move_ms, state.move_interval_ms()) {
        for player in state.players.iter_mut().filter(|p| !p.ended) {
            for obstacle in &mut player.obstacles {
                obstacle.descend();
            }
        }
        state.last_move_ms = now_ms;
        events.push(GameEvent::ObstaclesDescended);
    }

    let score = state.score_for(state.play_time_ms(now_ms));
    let spawn_interval = state.spawn_interval_ms();
    let depth = state.config.simulation_depth();
    let think_interval = state.config.bot_think_interval_ms;
    let check_row_above = state.config.check_row_above;
    let grid = state.grid;

    let MatchState {
        players,
        planner,
        rng,
        config,
        ..
    } = &mut *state;

    for player in players.iter_mut() {
        if player.ended {
            continue;
        }
        player.score = score;

        if player.bot.active && interval_elapsed(now_ms, player.bot.last_think_ms, think_interval)
        {
            let field = DangerField::build(&grid, &player.obstacles, depth);
            let view = BotView {
                column: player.token.x,
                row: player.token.y,
                field: &field,
            };
            player.bot.think(&view, now_ms);
        }

        if player.bot.active {
            player.token.x = grid.clamp_column(player.bot.step_from(player.token.x));
        }

        if interval_elapsed(now_ms, player.last_spawn_ms, spawn_interval) {
            let wave = planner.plan_wave(
                player.spawn_policy.as_mut(),
                &config.lanes,
                &player.obstacles,
                rng,
            );
            if !wave.is_empty() {
                events.push(GameEvent::Spawned {
                    player: player.id,
                    count: wave.len(),
                });
            }
            player.obstacles.extend(wave);
            player.last_spawn_ms = now_ms;
        }

        if token_collides(player.token, &player.obstacles, check_row_above) {
            player.ended = true;
            log::info!("Player {} has lost with score {}", player.id + 1, player.score);
            events.push(GameEvent::PlayerLost {
                player: player.id,
                score: player.score,
            });
        }
    }

    for player in players.iter_mut() {
        player.obstacles.retain(|o| !o.has_exited(grid.rows));
    }

    if state.players.iter().all(|p| p.ended) {
        state.phase = MatchPhase::Ended;
        log::info!("Race over");
        events.push(GameEvent::MatchEnded);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, MatchPreset};
    use crate::sim::grid::Shape;
    use crate::sim::piece::{Obstacle, ShapeTemplate};
    use crate::sim::spawn::SpawnPolicyKind;
    use glam::IVec2;

    fn quiet_config() -> GameConfig {
        // No spawning so tests control every obstacle
        GameConfig {
            spawn_attempts: 0,
            ..Default::default()
        }
    }

    fn block(x: i32, y: i32) -> Obstacle {
        let template = ShapeTemplate {
            shape: Shape::from_rows(&[&[1]]).unwrap(),
            color: 0,
        };
        Obstacle::new(&template, IVec2::new(x, y), 0)
    }

    #[test]
    fn test_obstacles_descend_on_move_interval() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        state.players[0].obstacles.push(block(0, 0));

        assert!(tick(&mut state, 600.0).is_empty());
        assert_eq!(state.players[0].obstacles[0].origin.y, 0);

        let events = tick(&mut state, 601.0);
        assert_eq!(events, vec![GameEvent::ObstaclesDescended]);
        assert_eq!(state.players[0].obstacles[0].origin.y, 1);
        assert_eq!(state.last_move_ms, 601.0);

        // No catch-up for a long gap
        tick(&mut state, 5000.0);
        assert_eq!(state.players[0].obstacles[0].origin.y, 2);
    }

    #[test]
    fn test_exited_obstacles_pruned() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        state.players[0].obstacles.push(block(0, 19));
        tick(&mut state, 601.0);
        assert!(state.players[0].obstacles.is_empty());
    }

    #[test]
    fn test_collision_ends_player() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        state.players[0].obstacles.push(block(5, 14));
        tick(&mut state, 601.0);
        assert!(!state.players[0].ended);

        // Row above the token counts in the versus layout
        let events = tick(&mut state, 1202.0);
        assert!(state.players[0].ended);
        assert!(events.contains(&GameEvent::PlayerLost {
            player: 0,
            score: 12
        }));
        assert!(!state.is_ended());
    }

    #[test]
    fn test_spawn_waves_fill_field() {
        let config = GameConfig {
            spawn_policy: SpawnPolicyKind::RoundRobin,
            ..Default::default()
        };
        let mut state = MatchState::new(config, 0.0).unwrap();
        // Player 1's staggered timer is already half an interval behind
        let events = tick(&mut state, 1.0);
        assert!(events.contains(&GameEvent::Spawned {
            player: 1,
            count: 1
        }));
        assert_eq!(state.players[1].obstacles.len(), 1);
        assert_eq!(state.players[1].obstacles[0].lane, 0);
        assert!(state.players[1].obstacles[0].origin.y < 0);
        assert!(state.players[0].obstacles.is_empty());
    }

    #[test]
    fn test_pause_freezes_score_and_time() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        tick(&mut state, 1000.0);
        assert_eq!(state.players[0].score, 10);

        apply_command(&mut state, Command::TogglePause, 1000.0).unwrap();
        assert!(tick(&mut state, 2000.0).is_empty());
        assert_eq!(state.players[0].score, 10);
        apply_command(&mut state, Command::TogglePause, 3000.0).unwrap();

        assert_eq!(state.paused_total_ms, 2000.0);
        tick(&mut state, 3000.0);
        assert_eq!(state.players[0].score, 10);
        tick(&mut state, 4000.0);
        assert_eq!(state.players[0].score, 20);
    }

    #[test]
    fn test_paused_match_ignores_other_commands() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        apply_command(&mut state, Command::TogglePause, 0.0).unwrap();
        apply_command(&mut state, Command::MoveLeft { player: 0 }, 0.0).unwrap();
        apply_command(&mut state, Command::IncreaseSpeed, 0.0).unwrap();
        apply_command(&mut state, Command::ToggleBot { player: 0 }, 0.0).unwrap();
        assert_eq!(state.players[0].token.x, 5);
        assert_eq!(state.speed, 1.0);
        assert!(!state.players[0].bot.active);
    }

    #[test]
    fn test_speed_clamped_to_bounds() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        for _ in 0..20 {
            apply_command(&mut state, Command::DecreaseSpeed, 0.0).unwrap();
        }
        assert_eq!(state.speed, state.config.min_speed);
        apply_command(&mut state, Command::DecreaseSpeed, 0.0).unwrap();
        assert_eq!(state.speed, state.config.min_speed);

        for _ in 0..50 {
            apply_command(&mut state, Command::IncreaseSpeed, 0.0).unwrap();
        }
        assert_eq!(state.speed, state.config.max_speed);
        assert!((state.move_interval_ms() - 120.0).abs() < 1e-9);
        assert!((state.spawn_interval_ms() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_manual_moves_clamped_and_blocked_by_bot() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        for _ in 0..8 {
            apply_command(&mut state, Command::MoveLeft { player: 0 }, 0.0).unwrap();
        }
        assert_eq!(state.players[0].token.x, 0);
        apply_command(&mut state, Command::MoveRight { player: 1 }, 0.0).unwrap();
        assert_eq!(state.players[1].token.x, 6);

        apply_command(&mut state, Command::ToggleBot { player: 1 }, 0.0).unwrap();
        apply_command(&mut state, Command::MoveRight { player: 1 }, 0.0).unwrap();
        assert_eq!(state.players[1].token.x, 6);
    }

    #[test]
    fn test_invalid_commands_rejected() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        assert_eq!(
            apply_command(&mut state, Command::SetBotAlgorithm { player: 0, algorithm: 5 }, 0.0),
            Err(CommandError::InvalidAlgorithm(5))
        );
        assert_eq!(
            apply_command(&mut state, Command::ToggleBot { player: 7 }, 0.0),
            Err(CommandError::UnknownPlayer(7))
        );
        assert_eq!(state.players[0].bot.algorithm, BotAlgorithm::NearestSafe);

        apply_command(&mut state, Command::SetBotAlgorithm { player: 0, algorithm: 3 }, 0.0)
            .unwrap();
        assert_eq!(state.players[0].bot.algorithm, BotAlgorithm::CenterHugger);
    }

    #[test]
    fn test_bot_dodges_toward_plan() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        state.players[0].obstacles.push(block(5, 10));
        apply_command(&mut state, Command::ToggleBot { player: 0 }, 0.0).unwrap();

        tick(&mut state, 150.0);
        let bot = &state.players[0].bot;
        assert_eq!(bot.target_column, Some(4));
        assert_eq!(bot.path, vec![IVec2::new(5, 17), IVec2::new(4, 17)]);
        assert_eq!(state.players[0].token.x, 4);

        // Steps happen every tick, thinking only every think interval
        tick(&mut state, 166.0);
        assert_eq!(state.players[0].bot.last_think_ms, 150.0);
        assert_eq!(state.players[0].token.x, 4);
    }

    #[test]
    fn test_match_ends_once_and_freezes() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        state.players[0].obstacles.push(block(5, 17));
        state.players[1].obstacles.push(block(5, 16));

        let events = tick(&mut state, 10.0);
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::MatchEnded).count(),
            1
        );
        assert!(state.is_ended());

        let rows: Vec<i32> = state.players.iter().map(|p| p.obstacles[0].origin.y).collect();
        for t in 1..5 {
            assert!(tick(&mut state, 10.0 + 1000.0 * t as f64).is_empty());
        }
        let after: Vec<i32> = state.players.iter().map(|p| p.obstacles[0].origin.y).collect();
        assert_eq!(rows, after);
    }

    #[test]
    fn test_ended_match_only_resets() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        state.players[0].bot.active = true;
        for player in &mut state.players {
            player.obstacles.push(block(5, 17));
        }
        tick(&mut state, 10.0);
        assert!(state.is_ended());

        apply_command(&mut state, Command::TogglePause, 20.0).unwrap();
        assert!(state.is_ended());

        apply_command(&mut state, Command::ResetIfEnded, 30.0).unwrap();
        assert_eq!(state.phase, MatchPhase::Running);
        assert!(state.players.iter().all(|p| !p.ended && p.obstacles.is_empty()));
        assert!(state.players[0].bot.active);
        assert!(!state.players[1].bot.active);
    }

    #[test]
    fn test_reset_ignored_while_running() {
        let mut state = MatchState::new(quiet_config(), 0.0).unwrap();
        state.players[0].obstacles.push(block(0, 0));
        apply_command(&mut state, Command::ResetIfEnded, 10.0).unwrap();
        assert_eq!(state.players[0].obstacles.len(), 1);
    }

    #[test]
    fn test_solo_ends_on_single_collision() {
        let config = GameConfig {
            spawn_attempts: 0,
            ..MatchPreset::Solo.config()
        };
        let mut state = MatchState::new(config, 0.0).unwrap();
        state.players[0].obstacles.push(block(5, 16));
        tick(&mut state, 10.0);
        // Solo does not count the row above
        assert!(!state.is_ended());
        state.players[0].obstacles.push(block(5, 17));
        tick(&mut state, 20.0);
        assert!(state.is_ended());
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(Command::from_key("ArrowLeft", false), Some(Command::MoveLeft { player: 0 }));
        assert_eq!(Command::from_key("d", false), Some(Command::MoveRight { player: 1 }));
        assert_eq!(
            Command::from_key("3", false),
            Some(Command::SetBotAlgorithm { player: 0, algorithm: 3 })
        );
        assert_eq!(
            Command::from_key("8", false),
            Some(Command::SetBotAlgorithm { player: 1, algorithm: 2 })
        );
        assert_eq!(
            Command::from_key("0", false),
            Some(Command::SetBotAlgorithm { player: 1, algorithm: 4 })
        );
        assert_eq!(Command::from_key("x", false), None);
        assert_eq!(Command::from_key("x", true), Some(Command::ResetIfEnded));
    }

    #[test]
    fn test_bots_survive_a_while() {
        let mut state = MatchState::new(GameConfig::default(), 0.0).unwrap();
        for player in 0..2 {
            apply_command(&mut state, Command::ToggleBot { player }, 0.0).unwrap();
        }
        let mut now = 0.0;
        while now < 5000.0 && !state.is_ended() {
            now += 1000.0 / 60.0;
            tick(&mut state, now);
            for player in &state.players {
                assert!(state.grid.contains_column(player.token.x));
                assert!(player.obstacles.iter().all(|o| o.origin.y < state.grid.rows));
            }
        }
        assert!(state.players.iter().any(|p| !p.obstacles.is_empty()));
    }
}
