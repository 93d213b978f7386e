//! Hive CLI - Command-line interface
//!
//! Commands:
//! - play: Play against the search engine on the terminal
//! - arena: Run agent-vs-agent games and tally the results
//! - best-move: Analyse a JSON board snapshot

mod arena_cmd;
mod best_move_cmd;
mod play_cmd;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hive_core::EngineConfig;

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Hive rules engine and adversarial search")]
struct Cli {
    /// Seed for random agents
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Engine configuration JSON file (flags override its values)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the search engine
    Play(play_cmd::PlayArgs),
    /// Play agents against each other
    Arena(arena_cmd::ArenaArgs),
    /// Search a snapshot for the best action
    BestMove(best_move_cmd::BestMoveArgs),
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, config),
        Commands::Arena(args) => arena_cmd::run(args, config, cli.seed),
        Commands::BestMove(args) => best_move_cmd::run(args, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)?;
            tracing::info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}
