//! Best-move command - search a saved position
//!
//! Reads a JSON snapshot (as written by `Snapshot::to_json`), rebuilds the
//! board and reports the action the searcher picks for the side to move.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hive_core::{
    Action, Board, EngineConfig, SearchConfig, SearchOutcome, Searcher, Snapshot, TileId,
};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct BestMoveArgs {
    /// Snapshot JSON file
    #[arg(value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Search depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Recurse only into this many best children per node
    #[arg(long)]
    pub beam_width: Option<usize>,

    /// Stop after this many nodes
    #[arg(long)]
    pub node_budget: Option<u64>,

    /// Stop after this many milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: BestMoveArgs, config: EngineConfig) -> Result<()> {
    let mut board = load_board(&args)?;
    let search = search_config(&args, config.search);
    let player = board.current_player();

    tracing::info!(
        "Searching for player {} (depth={}, beam={:?})",
        player,
        search.depth,
        search.beam_width
    );

    let mut searcher = Searcher::new(search);
    let outcome = searcher.best_action(&mut board);

    if args.json {
        print_json(&board, &outcome)?;
    } else {
        print_text(&board, &outcome);
    }
    Ok(())
}

// ============================================================================
// STEPS
// ============================================================================

fn load_board(args: &BestMoveArgs) -> Result<Board> {
    let content = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("Failed to read snapshot: {}", args.snapshot.display()))?;
    let snapshot = Snapshot::from_json(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", args.snapshot.display()))?;
    let board = Board::from_snapshot(&snapshot)
        .with_context(|| format!("Inconsistent snapshot: {}", args.snapshot.display()))?;
    Ok(board)
}

fn search_config(args: &BestMoveArgs, mut search: SearchConfig) -> SearchConfig {
    if let Some(depth) = args.depth {
        search.depth = depth;
    }
    if args.beam_width.is_some() {
        search.beam_width = args.beam_width;
    }
    if args.node_budget.is_some() {
        search.node_budget = args.node_budget;
    }
    if args.time_limit_ms.is_some() {
        search.time_limit_ms = args.time_limit_ms;
    }
    search
}

fn tile_name(board: &Board, action: Action) -> String {
    TileId::from_index(board.current_player(), action.index)
        .map(|t| t.to_string())
        .unwrap_or_else(|| format!("#{}", action.index))
}

fn print_json(board: &Board, outcome: &SearchOutcome) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        player: u8,
        tile: Option<String>,
        action: Option<Action>,
        score: f32,
        stats: &'a hive_core::SearchStats,
    }

    let output = JsonOutput {
        player: board.current_player().number(),
        tile: outcome.action.map(|a| tile_name(board, a)),
        action: outcome.action,
        score: outcome.score,
        stats: &outcome.stats,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(board: &Board, outcome: &SearchOutcome) {
    match outcome.action {
        Some(action) => println!(
            "Best action: {} -> {} (score {:.2})",
            tile_name(board, action),
            action.pos,
            outcome.score
        ),
        None => println!("No legal action: player {} must pass", board.current_player()),
    }
    let stats = &outcome.stats;
    println!(
        "Nodes: {}  cache hit rate: {:.1}%  time: {} ms{}",
        stats.nodes,
        stats.hit_rate * 100.0,
        stats.elapsed_ms,
        if stats.aborted { "  (limit reached)" } else { "" }
    );
}
