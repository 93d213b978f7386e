//! Game rules on top of the board: placement, legal actions, results
//!
//! Search-facing code commits actions with [`Board::apply`] and reverts them
//! with [`Board::undo`] (or the [`ActionGuard`] returned by
//! [`Board::apply_scoped`]). Text-facing code goes through
//! [`Board::execute`], which validates everything and reports why an action
//! was refused.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action_space::{Action, ActionMask};
use crate::board::Board;
use crate::error::{IllegalAction, ParseError};
use crate::hex::{Hex, ORIGIN};
use crate::movegen::{valid_moves, HexSet};
use crate::tile::{Insect, Player, TileId};

/// Turn counter at which an unplaced queen must be placed
const QUEEN_DEADLINE: u16 = 2;

/// Queen neighbors needed to win a simplified game
const SIMPLIFIED_SURROUND: usize = 3;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    Winner(Player),
    Draw,
}

impl GameResult {
    pub fn is_over(&self) -> bool {
        *self != GameResult::Ongoing
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Ongoing => write!(f, "ongoing"),
            GameResult::Winner(p) => write!(f, "player {p} wins"),
            GameResult::Draw => write!(f, "draw"),
        }
    }
}

/// Where the game is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// No tile placed yet
    Setup,
    Turn(Player),
    Terminal(GameResult),
}

/// Placement or movement, as typed at the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Place,
    Move,
}

impl FromStr for ActionKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "place" => Ok(ActionKind::Place),
            "move" => Ok(ActionKind::Move),
            _ => Err(ParseError::ActionKind(s.to_string())),
        }
    }
}

/// Record needed to revert one committed action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Undo {
    Placed { tile: TileId },
    Moved { tile: TileId, from: Hex },
    Passed { player: Player },
}

/// Legal actions of one player: hex -> piece identities that may go there,
/// sorted by hex
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegalActions {
    entries: Vec<(Hex, ActionMask)>,
}

impl LegalActions {
    pub fn entries(&self) -> &[(Hex, ActionMask)] {
        &self.entries
    }

    pub fn mask_at(&self, pos: Hex) -> ActionMask {
        self.entries
            .binary_search_by_key(&pos, |(p, _)| *p)
            .map(|i| self.entries[i].1)
            .unwrap_or_default()
    }

    pub fn contains(&self, action: Action) -> bool {
        self.mask_at(action.pos).contains(action.index)
    }

    /// Every action in canonical order (hex, then index)
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.entries
            .iter()
            .flat_map(|(pos, mask)| mask.indices().map(move |i| Action::new(*pos, i)))
    }

    /// Number of actions
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, m)| m.count() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct piece identities with at least one action
    pub fn active_pieces(&self) -> ActionMask {
        self.entries
            .iter()
            .fold(ActionMask::EMPTY, |acc, (_, m)| acc.union(*m))
    }
}

// ============================================================================
// RULES
// ============================================================================

impl Board {
    /// True when `player` may only place the queen
    pub fn queen_deadline(&self, player: Player) -> bool {
        self.turns(player) >= QUEEN_DEADLINE && !self.queen_placed(player)
    }

    /// Empty hexes where `player` could put any tile, sorted
    pub fn placement_targets(&self, player: Player) -> Vec<Hex> {
        if self.is_empty() {
            return vec![ORIGIN];
        }
        let first = self.placed_count(player) == 0;
        let mut targets: Vec<Hex> = self
            .occupied()
            .flat_map(|pos| pos.neighbors())
            .filter(|pos| !self.is_occupied(*pos))
            .filter(|pos| first || !self.touches_opponent(*pos, player))
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Hexes where `player` may place a copy of `insect`
    pub fn valid_placements(&self, player: Player, insect: Insect) -> Vec<Hex> {
        let in_hand = TileId::all_for(player).any(|t| t.insect() == insect && self.in_hand(t));
        if !in_hand || (self.queen_deadline(player) && insect != Insect::Queen) {
            return Vec::new();
        }
        self.placement_targets(player)
    }

    /// Whether `player` may place some tile on `pos`
    pub fn valid_placement(&self, pos: Hex, player: Player) -> Result<(), IllegalAction> {
        if self.is_occupied(pos) {
            return Err(IllegalAction::Occupied(pos));
        }
        if self.is_empty() {
            return Ok(());
        }
        if self.neighbors_occupied(pos) == 0 {
            return Err(IllegalAction::NotAdjacent(pos));
        }
        if self.placed_count(player) > 0 && self.touches_opponent(pos, player) {
            return Err(IllegalAction::TouchesOpponent(pos));
        }
        Ok(())
    }

    fn touches_opponent(&self, pos: Hex, player: Player) -> bool {
        pos.neighbors()
            .iter()
            .filter_map(|n| self.top(*n))
            .any(|t| t.owner() != player)
    }

    /// Tiles of `player` that may be placed right now
    fn placeable(&self, player: Player) -> impl Iterator<Item = TileId> + '_ {
        let deadline = self.queen_deadline(player);
        TileId::all_for(player)
            .filter(move |t| self.in_hand(*t) && (!deadline || t.insect() == Insect::Queen))
    }

    /// Legal actions of `player`, using uncached move generation
    pub fn legal_actions(&self, player: Player) -> LegalActions {
        self.legal_actions_with(player, valid_moves)
    }

    /// Legal actions of `player` with moves taken from `moves`
    pub fn legal_actions_with<F>(&self, player: Player, mut moves: F) -> LegalActions
    where
        F: FnMut(&Board, TileId) -> HexSet,
    {
        let mut map: BTreeMap<Hex, ActionMask> = BTreeMap::new();

        let placeable: Vec<TileId> = self.placeable(player).collect();
        if !placeable.is_empty() {
            for pos in self.placement_targets(player) {
                let mask = map.entry(pos).or_default();
                for tile in &placeable {
                    mask.insert(tile.index());
                }
            }
        }

        for tile in TileId::all_for(player) {
            if self.in_hand(tile) {
                continue;
            }
            for pos in moves(self, tile) {
                map.entry(pos).or_default().insert(tile.index());
            }
        }

        LegalActions {
            entries: map.into_iter().collect(),
        }
    }

    pub fn has_legal_action(&self, player: Player) -> bool {
        self.has_legal_action_with(player, valid_moves)
    }

    /// Stops at the first legal action found
    pub fn has_legal_action_with<F>(&self, player: Player, mut moves: F) -> bool
    where
        F: FnMut(&Board, TileId) -> HexSet,
    {
        if self.placeable(player).next().is_some() && !self.placement_targets(player).is_empty() {
            return true;
        }
        TileId::all_for(player)
            .filter(|t| !self.in_hand(*t))
            .any(|t| !moves(self, t).is_empty())
    }

    // ========================================================================
    // RESULT
    // ========================================================================

    /// Occupied hexes around the queen of `player` (0 while unplaced)
    pub fn queen_surrounding(&self, player: Player) -> usize {
        self.queen_position(player)
            .map_or(0, |pos| self.neighbors_occupied(pos))
    }

    pub fn game_over(&self) -> GameResult {
        self.game_over_with(valid_moves)
    }

    /// Game result with stalemate moves taken from `moves`
    pub fn game_over_with<F>(&self, mut moves: F) -> GameResult
    where
        F: FnMut(&Board, TileId) -> HexSet,
    {
        let around = [
            self.queen_surrounding(Player::One),
            self.queen_surrounding(Player::Two),
        ];

        match (around[0] == 6, around[1] == 6) {
            (true, true) => return GameResult::Draw,
            (true, false) => return GameResult::Winner(Player::Two),
            (false, true) => return GameResult::Winner(Player::One),
            (false, false) => {}
        }

        if self.rules().simplified {
            let threatened = around.map(|n| n >= SIMPLIFIED_SURROUND);
            match (threatened[0], threatened[1]) {
                (true, false) => return GameResult::Winner(Player::Two),
                (false, true) => return GameResult::Winner(Player::One),
                _ => {}
            }
        }

        if let Some(limit) = self.rules().max_turns {
            if self.turns(Player::One) >= limit && self.turns(Player::Two) >= limit {
                // Each side scores the pressure on the opposing queen
                return match around[1].cmp(&around[0]) {
                    std::cmp::Ordering::Greater => GameResult::Winner(Player::One),
                    std::cmp::Ordering::Less => GameResult::Winner(Player::Two),
                    std::cmp::Ordering::Equal => GameResult::Draw,
                };
            }
        }

        if !self.has_legal_action_with(Player::One, &mut moves)
            && !self.has_legal_action_with(Player::Two, &mut moves)
        {
            return GameResult::Draw;
        }

        GameResult::Ongoing
    }

    pub fn status(&self) -> GameStatus {
        match self.game_over() {
            GameResult::Ongoing if self.is_empty() && self.turns(Player::One) == 0 => {
                GameStatus::Setup
            }
            GameResult::Ongoing => GameStatus::Turn(self.current_player()),
            result => GameStatus::Terminal(result),
        }
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Validate and commit a text-level action for the tile's owner
    pub fn execute(&mut self, tile: TileId, kind: ActionKind, pos: Hex) -> Result<(), IllegalAction> {
        if let Err(err) = self.check_action(tile, kind, pos) {
            debug!(%tile, ?kind, %pos, reason = err.code(), "rejected action");
            return Err(err);
        }
        match kind {
            ActionKind::Place => self.place(tile, pos),
            ActionKind::Move => self.move_tile(tile, pos),
        }
        Ok(())
    }

    fn check_action(&self, tile: TileId, kind: ActionKind, pos: Hex) -> Result<(), IllegalAction> {
        if self.game_over().is_over() {
            return Err(IllegalAction::GameOver);
        }
        let player = tile.owner();
        let expected = self.current_player();
        if player != expected {
            return Err(IllegalAction::NotYourTurn { expected });
        }

        match kind {
            ActionKind::Place => {
                if !self.in_hand(tile) {
                    return Err(IllegalAction::TileNotInHand(tile));
                }
                if self.queen_deadline(player) && tile.insect() != Insect::Queen {
                    return Err(IllegalAction::QueenDeadline);
                }
                self.valid_placement(pos, player)
            }
            ActionKind::Move => {
                if self.in_hand(tile) {
                    return Err(IllegalAction::TileInHand(tile));
                }
                if !self.queen_placed(player) {
                    return Err(IllegalAction::QueenNotPlaced);
                }
                if !valid_moves(self, tile).contains(&pos) {
                    return Err(IllegalAction::InvalidMove { tile, to: pos });
                }
                Ok(())
            }
        }
    }

    /// Commit an action for the player to act. The action must be legal.
    pub fn apply(&mut self, action: Action) -> Undo {
        let player = self.current_player();
        let tile = action
            .tile(player)
            .unwrap_or_else(|| panic!("action index {} out of range", action.index));
        match self.location(tile) {
            None => {
                self.place(tile, action.pos);
                Undo::Placed { tile }
            }
            Some(from) => {
                self.move_tile(tile, action.pos);
                Undo::Moved { tile, from }
            }
        }
    }

    /// Player to act gives up the turn
    pub fn pass(&mut self) -> Undo {
        Undo::Passed {
            player: self.pass_turn(),
        }
    }

    pub fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Placed { tile } => self.undo_place(tile),
            Undo::Moved { tile, from } => self.undo_move(tile, from),
            Undo::Passed { player } => self.undo_pass(player),
        }
    }

    /// Apply `action`; the guard reverts it when dropped
    pub fn apply_scoped(&mut self, action: Action) -> ActionGuard<'_> {
        let undo = self.apply(action);
        ActionGuard { board: self, undo: Some(undo) }
    }

    pub fn pass_scoped(&mut self) -> ActionGuard<'_> {
        let undo = self.pass();
        ActionGuard { board: self, undo: Some(undo) }
    }
}

// ============================================================================
// SCOPED ACTIONS
// ============================================================================

/// Board with one action applied; dropping the guard undoes it
#[must_use = "the action is undone as soon as the guard is dropped"]
pub struct ActionGuard<'a> {
    board: &'a mut Board,
    undo: Option<Undo>,
}

impl ActionGuard<'_> {
    pub fn undo_record(&self) -> Option<Undo> {
        self.undo
    }
}

impl Deref for ActionGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for ActionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            self.board.undo(undo);
        }
    }
}
