//! Tetro Dodge headless driver
//!
//! Plays a bot-only match on a simulated 60 Hz clock and prints the final
//! frame as JSON.
//!
//! Usage: `tetro-dodge [solo|versus] [seed]`

use tetro_dodge::sim::{BotAlgorithm, Command, GameEvent, MatchState, apply_command, tick};
use tetro_dodge::view::FrameView;
use tetro_dodge::{GameConfig, MatchPreset};

/// Simulated frame length (ms)
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Give up after ten simulated minutes
const MAX_MATCH_MS: f64 = 10.0 * 60.0 * 1000.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let preset = args
        .next()
        .as_deref()
        .and_then(MatchPreset::from_str)
        .unwrap_or_default();
    let mut config = GameConfig::from_preset(preset);
    if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
        config.seed = seed;
    }
    log::info!("Tetro Dodge ({}) starting with seed {}", preset.as_str(), config.seed);

    let mut state = match MatchState::new(config, 0.0) {
        Ok(state) => state,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    // Give each player a different autopilot
    for player in 0..state.players.len() {
        let algorithm = BotAlgorithm::ALL[player % BotAlgorithm::ALL.len()].number();
        for command in [
            Command::ToggleBot { player },
            Command::SetBotAlgorithm { player, algorithm },
        ] {
            if let Err(e) = apply_command(&mut state, command, 0.0) {
                log::warn!("Command {command:?} rejected: {e}");
            }
        }
    }

    let mut now = 0.0;
    while !state.is_ended() && now < MAX_MATCH_MS {
        now += FRAME_MS;
        for event in tick(&mut state, now) {
            match event {
                GameEvent::PlayerLost { player, score } => {
                    log::info!("P{} out at {:.1}s with {}", player + 1, now / 1000.0, score);
                }
                GameEvent::Spawned { player, count } => {
                    log::debug!("P{} spawned {}", player + 1, count);
                }
                GameEvent::ObstaclesDescended | GameEvent::MatchEnded => {}
            }
        }
    }

    for player in &state.players {
        log::info!(
            "P{} ({}): {}",
            player.id + 1,
            player.bot.algorithm.strategy().name(),
            player.score
        );
    }

    match serde_json::to_string_pretty(&FrameView::capture(&state)) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode final frame: {e}"),
    }
}
