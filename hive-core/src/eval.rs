//! Position evaluation
//!
//! Scores are computed from a small [`Features`] summary so the same formula
//! works on a live board and on a [`Snapshot`](crate::snapshot::Snapshot).

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game::GameResult;
use crate::movegen::{valid_moves, HexSet};
use crate::tile::{Player, TileId};

/// Heuristic weights
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalParams {
    /// Per tile around the opponent's queen (minus around our own)
    pub queen_surrounding: f32,
    /// Queen free of an enemy tile on top
    pub ownership: f32,
    /// Decided game
    pub win: f32,
    /// Per piece identity with a legal action
    pub mobility: f32,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            queen_surrounding: 1.0,
            ownership: 3.0,
            win: 100.0,
            mobility: 0.5,
        }
    }
}

/// Everything the evaluation looks at, indexed by player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Features {
    /// Occupied hexes around each queen
    pub surrounding: [u8; 2],
    /// Queen in hand or topped by its owner
    pub queen_owned: [bool; 2],
    /// Distinct piece identities with at least one legal action
    pub movable: [u8; 2],
    pub result: GameResult,
}

impl Features {
    pub fn collect(board: &Board) -> Self {
        Self::collect_with(board, valid_moves)
    }

    /// Collect with move generation routed through `moves`
    pub fn collect_with<F>(board: &Board, mut moves: F) -> Self
    where
        F: FnMut(&Board, TileId) -> HexSet,
    {
        let movable = Player::BOTH.map(|p| {
            board
                .legal_actions_with(p, &mut moves)
                .active_pieces()
                .count() as u8
        });
        Self {
            surrounding: Player::BOTH.map(|p| board.queen_surrounding(p) as u8),
            queen_owned: Player::BOTH.map(|p| queen_owned(board, p)),
            movable,
            result: board.game_over_with(&mut moves),
        }
    }
}

fn queen_owned(board: &Board, player: Player) -> bool {
    match board.queen_position(player) {
        Some(pos) => board.top(pos).map_or(true, |t| t.owner() == player),
        None => true,
    }
}

/// Score from `player`'s point of view
pub fn evaluate(features: &Features, player: Player, params: &EvalParams) -> f32 {
    let me = player.index();
    let opp = player.opponent().index();
    let mut value = 0.0;

    let net_surrounding = features.surrounding[opp] as f32 - features.surrounding[me] as f32;
    value += net_surrounding * params.queen_surrounding;

    match features.result {
        GameResult::Winner(w) if w == player => value += params.win,
        GameResult::Winner(_) => value -= params.win,
        _ => {}
    }

    let net_owned = features.queen_owned[me] as i32 - features.queen_owned[opp] as i32;
    value += net_owned as f32 * params.ownership;

    let net_movable = features.movable[me] as f32 - features.movable[opp] as f32;
    value += net_movable * params.mobility;

    value
}

/// Evaluate a live board with uncached move generation
pub fn evaluate_board(board: &Board, player: Player, params: &EvalParams) -> f32 {
    evaluate(&Features::collect(board), player, params)
}
