use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use city_trader::simulation::{
    AutoPlayer, FileStorage, GameConfig, GameEngine, GameRng, GameStateManager, LocalLeaderboard,
    LogAnalytics, LogAudio, MemoryStorage, SaveStorage,
};

#[derive(Parser)]
#[command(name = "city_trader")]
#[command(about = "Headless Beijing/Shanghai trading game played by a bot")]
struct Cli {
    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding game parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the save file (kept in memory when omitted)
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Player name shown on the leaderboard
    #[arg(long)]
    name: Option<String>,

    /// Enable the hacker event and wangba bonus
    #[arg(long)]
    hacking: bool,

    /// Stop after this many turns
    #[arg(long)]
    max_turns: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    run_headless(&cli, config)
}

/// Play one full game with the bot and report the result
fn run_headless(cli: &Cli, config: GameConfig) -> Result<()> {
    info!("Running city trader in headless mode...");

    let (engine_rng, bot_rng) = match cli.seed {
        Some(seed) => {
            info!("Seed: {}", seed);
            (GameRng::seeded(seed), GameRng::seeded(seed.wrapping_add(1)))
        }
        None => (GameRng::new(), GameRng::new()),
    };

    let storage: Box<dyn SaveStorage> = match &cli.save_dir {
        Some(dir) => Box::new(FileStorage::new(dir)),
        None => Box::new(MemoryStorage::new()),
    };

    let engine = GameEngine::new(config, Box::new(engine_rng));
    let mut manager = GameStateManager::new(engine, storage)
        .with_audio(Box::new(LogAudio))
        .with_analytics(Box::new(LogAnalytics))
        .with_leaderboard(Box::new(LocalLeaderboard::new(10)));

    if let Some(name) = &cli.name {
        manager.set_player_name(name);
    }
    manager.set_hacking_enabled(cli.hacking);
    manager.new_game();

    info!("Initial state:");
    info!("{}", manager.state().summary());

    let mut bot = AutoPlayer::new(Box::new(bot_rng));
    let report = bot
        .play_game(&mut manager, cli.max_turns)
        .context("Bot stopped on an unexpected rejection")?;

    if let Some(record) = manager.submit_score() {
        info!("Leaderboard entry: {} {}", record.name, record.score);
    }

    info!("=== GAME COMPLETE ===");
    info!("{}", manager.state().summary());
    info!("Final score: {}", report.final_score);
    info!("Turns played: {}", report.turns);
    info!("Events seen: {}", report.events);
    Ok(())
}
