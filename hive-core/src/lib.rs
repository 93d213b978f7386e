//! Hive Core - Rules engine and adversarial search
//!
//! This crate provides the core game logic for Hive:
//! - Hex geometry with axial coordinates
//! - Board state with stacking and an incremental Zobrist hash
//! - One-hive connectivity and per-insect move generation
//! - Placement rules, legal actions and game results
//! - Heuristic evaluation and alpha-beta / beam search
//! - Agents, an arena runner and read-only snapshots

pub mod action_space;
pub mod agent;
pub mod arena;
pub mod board;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod eval;
pub mod game;
pub mod hex;
pub mod movegen;
pub mod search;
pub mod snapshot;
pub mod tile;

// Re-exports for convenient access
pub use action_space::{Action, ActionMask, ACTION_SPACE_SIZE};
pub use agent::{Agent, RandomAgent, SearchAgent};
pub use arena::{play_game, GameRecord, Tally, Turn};
pub use board::{Board, Relocation};
pub use cache::{CacheStats, TranspositionCache};
pub use config::{EngineConfig, RulesConfig, SearchConfig};
pub use connectivity::{is_connected, ConnectivityChecker, HiveCheck};
pub use error::{IllegalAction, ParseError, SnapshotError};
pub use eval::{evaluate, evaluate_board, EvalParams, Features};
pub use game::{ActionGuard, ActionKind, GameResult, GameStatus, LegalActions, Undo};
pub use hex::{Hex, DIRECTIONS, ORIGIN};
pub use movegen::{valid_moves, HexSet};
pub use search::{SearchOutcome, SearchStats, Searcher};
pub use snapshot::{Snapshot, StackEntry};
pub use tile::{Insect, Player, TileId};
