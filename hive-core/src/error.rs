//! Error types
//!
//! Illegal actions are ordinary values: the search, the CLI and agents probe
//! legality constantly, so rejections are returned, never panicked. Broken
//! board invariants are bugs and panic at the mutation site instead.

use thiserror::Error;

use crate::hex::Hex;
use crate::tile::{Player, TileId};

/// Why an action was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalAction {
    #[error("game is already over")]
    GameOver,

    #[error("it is player {expected}'s turn")]
    NotYourTurn { expected: Player },

    #[error("{0} is not in hand")]
    TileNotInHand(TileId),

    #[error("{0} has not been placed yet")]
    TileInHand(TileId),

    #[error("cannot move before placing queen")]
    QueenNotPlaced,

    #[error("must place queen within first 3 turns")]
    QueenDeadline,

    #[error("{0} is occupied")]
    Occupied(Hex),

    #[error("{0} is not adjacent to a valid tile")]
    NotAdjacent(Hex),

    #[error("{0} touches an opponent tile")]
    TouchesOpponent(Hex),

    #[error("{tile} cannot move to {to}")]
    InvalidMove { tile: TileId, to: Hex },
}

impl IllegalAction {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            IllegalAction::GameOver => "game_over",
            IllegalAction::NotYourTurn { .. } => "not_your_turn",
            IllegalAction::TileNotInHand(_) => "tile_not_in_hand",
            IllegalAction::TileInHand(_) => "tile_in_hand",
            IllegalAction::QueenNotPlaced => "queen_not_placed",
            IllegalAction::QueenDeadline => "queen_deadline",
            IllegalAction::Occupied(_) => "occupied",
            IllegalAction::NotAdjacent(_) => "not_adjacent",
            IllegalAction::TouchesOpponent(_) => "touches_opponent",
            IllegalAction::InvalidMove { .. } => "invalid_move",
        }
    }
}

/// Malformed text at the CLI boundary
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid coordinate '{0}', expected q,r")]
    Coordinate(String),

    #[error("unknown tile name '{0}'")]
    TileName(String),

    #[error("invalid action kind '{0}', expected place or move")]
    ActionKind(String),
}

/// Inconsistent snapshot data
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("{0} appears more than once")]
    DuplicateTile(TileId),

    #[error("stack at {0} is empty")]
    EmptyStack(Hex),

    #[error("queen position for player {player} does not match the board")]
    QueenMismatch { player: Player },

    #[error("hand of player {player} does not match the tiles on the board")]
    HandMismatch { player: Player },

    #[error("hand index {0} is not a piece identity")]
    BadHandIndex(u8),

    #[error("stack at {0} has a non-beetle tile above ground level")]
    IllegalStack(Hex),

    #[error("placed tiles do not form one connected hive")]
    Disconnected,

    #[error("player {player} has fewer turns than tiles on the board")]
    TurnCount { player: Player },

    #[error("turn counters {turns:?} are more than one turn apart")]
    TurnOrder { turns: [u16; 2] },
}
