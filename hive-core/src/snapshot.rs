//! Read-only board snapshot for external consumers
//!
//! A snapshot is plain owned data: stacks, hands, counters, queen positions,
//! legal actions for both sides and the result. Agents and learning code read
//! it without touching the live board, and [`Board::from_snapshot`] rebuilds
//! a playable board from one.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::action_space::{ActionMask, ACTION_SPACE_SIZE};
use crate::board::Board;
use crate::config::RulesConfig;
use crate::connectivity::is_connected;
use crate::error::SnapshotError;
use crate::eval::Features;
use crate::game::{GameResult, LegalActions};
use crate::hex::Hex;
use crate::tile::{Insect, Player, TileId};

/// Tiles at one hex, bottom to top
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    pub pos: Hex,
    pub tiles: Vec<TileId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stacks: Vec<StackEntry>,
    /// Action indices still in each player's hand
    pub hands: [Vec<u8>; 2],
    pub turns: [u16; 2],
    pub queens: [Option<Hex>; 2],
    pub legal_actions: [LegalActions; 2],
    pub result: GameResult,
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Snapshot {
    /// Tile positions re-indexed from `perspective`: 0-10 for own tiles,
    /// 11-21 for the opponent's
    pub fn tile_positions(&self, perspective: Player) -> BTreeMap<usize, Hex> {
        let mut positions = BTreeMap::new();
        for entry in &self.stacks {
            for tile in &entry.tiles {
                let mut index = tile.index() as usize;
                if tile.owner() != perspective {
                    index += ACTION_SPACE_SIZE;
                }
                positions.insert(index, entry.pos);
            }
        }
        positions
    }

    /// Player to act
    pub fn current_player(&self) -> Player {
        Player::to_act(self.turns)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Evaluation features, without a live board
    pub fn features(&self) -> Features {
        let occupied: FxHashSet<Hex> = self.stacks.iter().map(|e| e.pos).collect();
        let top = |pos: Hex| {
            self.stacks
                .iter()
                .find(|e| e.pos == pos)
                .and_then(|e| e.tiles.last().copied())
        };

        let surrounding = Player::BOTH.map(|p| match self.queens[p.index()] {
            Some(q) => q.neighbors().iter().filter(|n| occupied.contains(n)).count() as u8,
            None => 0,
        });
        let queen_owned = Player::BOTH.map(|p| match self.queens[p.index()] {
            Some(q) => top(q).map_or(true, |t| t.owner() == p),
            None => true,
        });
        let movable =
            Player::BOTH.map(|p| self.legal_actions[p.index()].active_pieces().count() as u8);

        Features {
            surrounding,
            queen_owned,
            movable,
            result: self.result,
        }
    }
}

impl Board {
    /// Owned copy of everything an outside consumer may read
    pub fn snapshot(&self) -> Snapshot {
        let stacks = self
            .stacks()
            .into_iter()
            .map(|(pos, tiles)| StackEntry {
                pos,
                tiles: tiles.to_vec(),
            })
            .collect();
        Snapshot {
            stacks,
            hands: Player::BOTH.map(|p| self.hand(p).indices().collect()),
            turns: Player::BOTH.map(|p| self.turns(p)),
            queens: Player::BOTH.map(|p| self.queen_position(p)),
            legal_actions: Player::BOTH.map(|p| self.legal_actions(p)),
            result: self.game_over(),
            rules: *self.rules(),
        }
    }

    /// Rebuild a board. Hands are derived from the stacks and must agree
    /// with the snapshot, as must the queen positions. Only beetles may sit
    /// above ground, the hive must be connected and the turn counters must
    /// be reachable from the tiles placed.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Board, SnapshotError> {
        let mut board = Board::with_rules(snapshot.rules);
        let mut seen = FxHashSet::default();

        for entry in &snapshot.stacks {
            if entry.tiles.is_empty() {
                return Err(SnapshotError::EmptyStack(entry.pos));
            }
            for (level, tile) in entry.tiles.iter().enumerate() {
                if !seen.insert(*tile) {
                    return Err(SnapshotError::DuplicateTile(*tile));
                }
                if level > 0 && tile.insect() != Insect::Beetle {
                    return Err(SnapshotError::IllegalStack(entry.pos));
                }
                board.push(*tile, entry.pos);
            }
        }
        if !is_connected(&board) {
            return Err(SnapshotError::Disconnected);
        }

        let hands = Player::BOTH.map(|p| {
            TileId::all_for(p)
                .filter(|t| !seen.contains(t))
                .map(|t| t.index())
                .collect::<ActionMask>()
        });
        for player in Player::BOTH {
            let claimed = &snapshot.hands[player.index()];
            if let Some(&bad) = claimed.iter().find(|&&i| i as usize >= ACTION_SPACE_SIZE) {
                return Err(SnapshotError::BadHandIndex(bad));
            }
            let claimed: ActionMask = claimed.iter().copied().collect();
            if claimed != hands[player.index()] {
                return Err(SnapshotError::HandMismatch { player });
            }
            if snapshot.queens[player.index()] != board.queen_position(player) {
                return Err(SnapshotError::QueenMismatch { player });
            }
            let placed = ACTION_SPACE_SIZE - claimed.count() as usize;
            if (snapshot.turns[player.index()] as usize) < placed {
                return Err(SnapshotError::TurnCount { player });
            }
        }
        if snapshot.turns[0].abs_diff(snapshot.turns[1]) > 1 {
            return Err(SnapshotError::TurnOrder {
                turns: snapshot.turns,
            });
        }

        board.restore_bookkeeping(hands, snapshot.turns);
        Ok(board)
    }
}
