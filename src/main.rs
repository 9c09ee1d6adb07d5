//! Headless gemfall runner (default binary).
//!
//! Plays a level with the built-in hint as the player and prints each move.
//! Configuration comes from `GEMFALL_*` environment variables and logging is
//! controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gemfall::core::LevelConfig;
use gemfall::engine::{EngineConfig, Session, SessionStatus};

/// Move cap for levels without a move or time limit
const ENDLESS_MOVES: u32 = 50;

/// Simulated time per move in arcade levels
const ARCADE_MS_PER_MOVE: u64 = 1_500;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env();
    let level = load_level(&config)?;
    info!(seed = config.seed, level = %level.name, "starting autoplay");
    debug!(config = %level.to_json()?, "level loaded");
    run(&config, &level)
}

fn load_level(config: &EngineConfig) -> Result<LevelConfig> {
    let Some(path) = config.level_path.as_deref() else {
        return Ok(LevelConfig {
            name: "endless".to_string(),
            ..LevelConfig::default()
        });
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading level file {}", path))?;
    LevelConfig::from_json(&json).with_context(|| format!("loading level {}", path))
}

fn run(config: &EngineConfig, level: &LevelConfig) -> Result<()> {
    let mut session = Session::from_config(config, level);
    println!(
        "level {} (seed {}, {})",
        session.level_name(),
        config.seed,
        config.difficulty.as_str()
    );
    println!("{}", session.board());

    while session.status() == SessionStatus::Playing {
        if session.time_left_ms().is_none()
            && session.moves_left().is_none()
            && session.moves_made() >= ENDLESS_MOVES
        {
            break;
        }
        let Some(hint) = session.hint() else {
            break;
        };
        let report = session
            .play(hint.from, hint.to)
            .with_context(|| format!("playing {:?} -> {:?}", hint.from, hint.to))?;
        println!(
            "move {:>3}: ({},{}) -> ({},{})  rounds {:>2}  cleared {:>3}  +{:<5} score {}{}",
            session.moves_made(),
            hint.from.row,
            hint.from.col,
            hint.to.row,
            hint.to.col,
            report.rounds.len(),
            report.cleared_count(),
            report.total_score,
            session.score(),
            report
                .fusion
                .map(|f| format!("  [{}]", f.as_str()))
                .unwrap_or_default(),
        );
        session.tick(ARCADE_MS_PER_MOVE);
    }

    println!("{}", session.board());
    let summary = serde_json::json!({
        "level": session.level_name(),
        "status": format!("{:?}", session.status()),
        "score": session.score(),
        "moves": session.moves_made(),
        "shuffles": session.shuffles(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
