//! Arena command - play agents against each other
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_settings(), play_arena(), report_results()
//! - Level 3: play_single_game(), make_agent()
//! - Level 4: formatting utilities

use anyhow::{ensure, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use hive_core::{
    play_game, Agent, EngineConfig, GameRecord, GameResult, RandomAgent, RulesConfig,
    SearchAgent, SearchConfig, Tally,
};

const DEFAULT_SEED: u64 = 42;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    Random,
    Minimax,
    Beam,
}

#[derive(Args)]
pub struct ArenaArgs {
    /// Agent playing first
    #[arg(long, value_enum, default_value = "minimax")]
    pub p1: AgentKind,

    /// Agent playing second
    #[arg(long, value_enum, default_value = "random")]
    pub p2: AgentKind,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Search depth for minimax and beam agents
    #[arg(long)]
    pub depth: Option<u32>,

    /// Beam width for beam agents
    #[arg(long, default_value = "4")]
    pub beam_width: usize,

    /// Turns per player before the game is scored
    #[arg(long, default_value = "20")]
    pub max_turns: u16,

    /// Hard cap on plies per game
    #[arg(long, default_value = "400")]
    pub max_plies: u32,

    /// Three tiles around a queen win
    #[arg(long)]
    pub simplified: bool,

    /// Play games on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything a single game needs, shared across worker threads
struct Settings {
    p1: AgentKind,
    p2: AgentKind,
    rules: RulesConfig,
    search: SearchConfig,
    beam_width: usize,
    max_plies: u32,
    base_seed: u64,
}

struct ArenaResults {
    games: Vec<GameRecord>,
    tally: Tally,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run arena command
///
/// 1. Merge flags over the loaded config
/// 2. Play every game
/// 3. Report the tally
pub fn run(args: ArenaArgs, config: EngineConfig, seed: Option<u64>) -> Result<()> {
    let settings = build_settings(&args, config, seed)?;

    tracing::info!(
        "Starting arena: {:?} vs {:?} ({} games, depth={}, max_turns={})",
        settings.p1,
        settings.p2,
        args.games,
        settings.search.depth,
        args.max_turns
    );

    let results = play_arena(&settings, &args);

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_settings(args: &ArenaArgs, config: EngineConfig, seed: Option<u64>) -> Result<Settings> {
    ensure!(args.games > 0, "--games must be at least 1");
    ensure!(args.beam_width > 0, "--beam-width must be at least 1");

    let mut rules = config.rules.with_max_turns(args.max_turns);
    rules.simplified |= args.simplified;

    let mut search = config.search;
    if let Some(depth) = args.depth {
        search.depth = depth;
    }

    Ok(Settings {
        p1: args.p1,
        p2: args.p2,
        rules,
        search,
        beam_width: args.beam_width,
        max_plies: args.max_plies,
        base_seed: seed.unwrap_or(DEFAULT_SEED),
    })
}

/// Play all games, optionally spread across the rayon pool
fn play_arena(settings: &Settings, args: &ArenaArgs) -> ArenaResults {
    let pb = ProgressBar::new(args.games as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }

    let play = |i: usize| {
        let record = play_single_game(settings, i as u64);
        tracing::debug!("Game {}: {} ({} plies)", i + 1, record.result, record.plies);
        pb.inc(1);
        record
    };

    let games: Vec<GameRecord> = if args.parallel {
        (0..args.games).into_par_iter().map(play).collect()
    } else {
        (0..args.games).map(play).collect()
    };
    pb.finish_with_message("done");

    compute_statistics(games)
}

fn report_results(results: &ArenaResults, args: &ArenaArgs) {
    if args.json {
        print_json_results(results, args);
    } else {
        print_text_results(results, args);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(settings: &Settings, game: u64) -> GameRecord {
    // Each game gets its own seeds so results don't depend on scheduling
    let seed = settings.base_seed.wrapping_add(game.wrapping_mul(2));
    let mut p1 = make_agent(settings.p1, settings, seed);
    let mut p2 = make_agent(settings.p2, settings, seed.wrapping_add(1));
    play_game(p1.as_mut(), p2.as_mut(), settings.rules, settings.max_plies)
}

fn make_agent(kind: AgentKind, settings: &Settings, seed: u64) -> Box<dyn Agent> {
    match kind {
        AgentKind::Random => Box::new(RandomAgent::new(seed)),
        AgentKind::Minimax => Box::new(SearchAgent::new(settings.search.clone())),
        AgentKind::Beam => Box::new(SearchAgent::new(
            settings.search.clone().with_beam(settings.beam_width),
        )),
    }
}

fn compute_statistics(games: Vec<GameRecord>) -> ArenaResults {
    let tally: Tally = games.iter().map(|g| g.result).collect();
    let total_plies: u32 = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    ArenaResults {
        games,
        tally,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn result_label(result: GameResult) -> String {
    match result {
        GameResult::Ongoing => "unfinished".to_string(),
        other => other.to_string(),
    }
}

fn print_json_results(results: &ArenaResults, args: &ArenaArgs) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: String,
        plies: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        p1: String,
        p2: String,
        total_games: u32,
        tally: Tally,
        avg_plies: f32,
        p1_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.tally.games();
    let output = JsonOutput {
        p1: format!("{:?}", args.p1).to_lowercase(),
        p2: format!("{:?}", args.p2).to_lowercase(),
        total_games: total,
        tally: results.tally,
        avg_plies: results.avg_plies,
        p1_win_rate: if total > 0 {
            results.tally.p1_wins as f32 / total as f32
        } else {
            0.0
        },
        games: results
            .games
            .iter()
            .enumerate()
            .map(|(i, g)| JsonGame {
                game_number: i + 1,
                result: result_label(g.result),
                plies: g.plies,
            })
            .collect(),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(err) => tracing::error!("Failed to serialize results: {err}"),
    }
}

fn print_text_results(results: &ArenaResults, args: &ArenaArgs) {
    let tally = &results.tally;
    let total = tally.games().max(1) as f32;

    println!("\n=== Arena Results ===");
    println!("{:?} (p1) vs {:?} (p2)", args.p1, args.p2);
    println!("Total games: {}", tally.games());
    println!(
        "P1 wins:     {} ({:.1}%)",
        tally.p1_wins,
        tally.p1_wins as f32 / total * 100.0
    );
    println!(
        "P2 wins:     {} ({:.1}%)",
        tally.p2_wins,
        tally.p2_wins as f32 / total * 100.0
    );
    println!("Draws:       {}", tally.draws);
    if tally.unfinished > 0 {
        println!("Unfinished:  {}", tally.unfinished);
    }
    println!("Avg plies:   {:.1}", results.avg_plies);
}
