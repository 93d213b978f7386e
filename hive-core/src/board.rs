//! Board state: stacks of tiles on an unbounded hex grid
//!
//! The board only knows where tiles are. Rule checks live in
//! [`movegen`](crate::movegen) and [`game`](crate::game); the mutators here
//! assume the caller already validated the action and panic when a board
//! invariant would break.

use rustc_hash::FxHashMap;

use crate::action_space::ActionMask;
use crate::config::RulesConfig;
use crate::hex::Hex;
use crate::tile::{Player, TileId, TOTAL_TILES};

// ============================================================================
// ZOBRIST KEYS
// ============================================================================

/// Mixed into the canonical hash together with the turn counters
const TURN_SALT: u64 = 0xa6c1_1b62_6b10_5b7c;

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Key for one tile sitting at `level` (0 = ground) of the stack at `pos`
fn tile_key(tile: TileId, pos: Hex, level: usize) -> u64 {
    let q = pos.q as u16 as u64;
    let r = pos.r as u16 as u64;
    splitmix64((tile.slot() as u64) << 48 | (level as u64 & 0xff) << 32 | q << 16 | r)
}

// ============================================================================
// RELOCATION
// ============================================================================

/// A tile lifted off `from` and, optionally, set down on `to`.
///
/// Used to ask questions about a board one move ahead without mutating it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relocation {
    pub tile: TileId,
    pub from: Hex,
    pub to: Option<Hex>,
}

impl Relocation {
    pub fn lift(tile: TileId, from: Hex) -> Self {
        Self { tile, from, to: None }
    }

    pub fn step(tile: TileId, from: Hex, to: Hex) -> Self {
        Self { tile, from, to: Some(to) }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Complete board state
#[derive(Clone, Debug)]
pub struct Board {
    stacks: FxHashMap<Hex, Vec<TileId>>,
    locations: [Option<Hex>; TOTAL_TILES],
    hands: [ActionMask; 2],
    turns: [u16; 2],
    queens: [Option<Hex>; 2],
    hash: u64,
    rules: RulesConfig,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, both hands full, standard rules
    pub fn new() -> Self {
        Self::with_rules(RulesConfig::default())
    }

    pub fn with_rules(rules: RulesConfig) -> Self {
        Self {
            stacks: FxHashMap::default(),
            locations: [None; TOTAL_TILES],
            hands: [ActionMask::FULL; 2],
            turns: [0; 2],
            queens: [None; 2],
            hash: 0,
            rules,
        }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Tiles at `pos`, bottom to top (empty slice for an empty hex)
    pub fn stack_at(&self, pos: Hex) -> &[TileId] {
        self.stacks.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn height(&self, pos: Hex) -> usize {
        self.stacks.get(&pos).map_or(0, Vec::len)
    }

    pub fn top(&self, pos: Hex) -> Option<TileId> {
        self.stacks.get(&pos).and_then(|s| s.last().copied())
    }

    pub fn is_occupied(&self, pos: Hex) -> bool {
        self.stacks.contains_key(&pos)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Occupied hexes, in no particular order
    pub fn occupied(&self) -> impl Iterator<Item = Hex> + '_ {
        self.stacks.keys().copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.stacks.len()
    }

    /// Occupied hexes with their stacks, sorted by hex
    pub fn stacks(&self) -> Vec<(Hex, &[TileId])> {
        let mut stacks: Vec<_> = self
            .stacks
            .iter()
            .map(|(pos, stack)| (*pos, stack.as_slice()))
            .collect();
        stacks.sort_unstable_by_key(|(pos, _)| *pos);
        stacks
    }

    /// Number of occupied hexes around `pos`
    pub fn neighbors_occupied(&self, pos: Hex) -> usize {
        pos.neighbors().iter().filter(|n| self.is_occupied(**n)).count()
    }

    /// Hex the tile sits on, `None` while in hand
    pub fn location(&self, tile: TileId) -> Option<Hex> {
        self.locations[tile.slot()]
    }

    pub fn in_hand(&self, tile: TileId) -> bool {
        self.hands[tile.owner().index()].contains(tile.index())
    }

    /// Unplaced tiles of `player` as action indices
    pub fn hand(&self, player: Player) -> ActionMask {
        self.hands[player.index()]
    }

    /// Tiles `player` has on the board
    pub fn placed_count(&self, player: Player) -> usize {
        TileId::all_for(player).filter(|t| !self.in_hand(*t)).count()
    }

    /// Completed turns (placements, moves and passes) of `player`
    pub fn turns(&self, player: Player) -> u16 {
        self.turns[player.index()]
    }

    /// Player to act: player one when the counters are equal
    pub fn current_player(&self) -> Player {
        Player::to_act(self.turns)
    }

    pub fn queen_position(&self, player: Player) -> Option<Hex> {
        self.queens[player.index()]
    }

    pub fn queen_placed(&self, player: Player) -> bool {
        self.queens[player.index()].is_some()
    }

    /// True when the tile is on the board under another tile
    pub fn is_covered(&self, tile: TileId) -> bool {
        match self.location(tile) {
            Some(pos) => self.top(pos) != Some(tile),
            None => false,
        }
    }

    /// Hash over every (tile, hex, level) triple
    pub fn contents_hash(&self) -> u64 {
        self.hash
    }

    /// Contents hash plus both turn counters
    pub fn canonical_hash(&self) -> u64 {
        let turns = (self.turns[0] as u64) << 16 | self.turns[1] as u64;
        self.hash ^ splitmix64(TURN_SALT ^ turns)
    }

    /// Contents hash the board would have after `relocation`
    pub fn hash_after(&self, relocation: &Relocation) -> u64 {
        let Relocation { tile, from, to } = *relocation;
        let mut hash = self.hash ^ tile_key(tile, from, self.height(from) - 1);
        if let Some(to) = to {
            hash ^= tile_key(tile, to, self.height(to));
        }
        hash
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Put a tile from hand onto `pos` and count the turn
    pub fn place(&mut self, tile: TileId, pos: Hex) {
        assert!(self.in_hand(tile), "{tile} is not in hand");
        self.hands[tile.owner().index()].remove(tile.index());
        self.push(tile, pos);
        self.turns[tile.owner().index()] += 1;
    }

    /// Move a top tile to `to` and count the turn
    pub fn move_tile(&mut self, tile: TileId, to: Hex) {
        let from = self
            .location(tile)
            .unwrap_or_else(|| panic!("cannot move {tile}: tile is in hand"));
        assert!(!self.is_covered(tile), "cannot move {tile}: covered tile");
        self.pop(from);
        self.push(tile, to);
        self.turns[tile.owner().index()] += 1;
    }

    /// Reverse the most recent `place` of `tile`
    pub fn undo_place(&mut self, tile: TileId) {
        let pos = self
            .location(tile)
            .unwrap_or_else(|| panic!("cannot undo placement of {tile}: tile is in hand"));
        assert!(!self.is_covered(tile), "cannot undo placement of {tile}: covered tile");
        self.pop(pos);
        self.hands[tile.owner().index()].insert(tile.index());
        self.turns[tile.owner().index()] -= 1;
    }

    /// Reverse the most recent `move_tile` of `tile`
    pub fn undo_move(&mut self, tile: TileId, from: Hex) {
        let pos = self
            .location(tile)
            .unwrap_or_else(|| panic!("cannot undo move of {tile}: tile is in hand"));
        assert!(!self.is_covered(tile), "cannot undo move of {tile}: covered tile");
        self.pop(pos);
        self.push(tile, from);
        self.turns[tile.owner().index()] -= 1;
    }

    /// Current player gives up the turn; returns who passed
    pub fn pass_turn(&mut self) -> Player {
        let player = self.current_player();
        self.turns[player.index()] += 1;
        player
    }

    pub fn undo_pass(&mut self, player: Player) {
        assert!(self.turns[player.index()] > 0, "player {player} has no turn to undo");
        self.turns[player.index()] -= 1;
    }

    /// Stack `tile` on `pos` without touching hands or turns
    pub(crate) fn push(&mut self, tile: TileId, pos: Hex) {
        let stack = self.stacks.entry(pos).or_default();
        self.hash ^= tile_key(tile, pos, stack.len());
        stack.push(tile);
        self.locations[tile.slot()] = Some(pos);
        if tile.index() == 0 {
            self.queens[tile.owner().index()] = Some(pos);
        }
    }

    fn pop(&mut self, pos: Hex) -> TileId {
        let stack = self
            .stacks
            .get_mut(&pos)
            .unwrap_or_else(|| panic!("no tile at {pos}"));
        let tile = stack.pop().unwrap_or_else(|| panic!("empty stack at {pos}"));
        self.hash ^= tile_key(tile, pos, stack.len());
        if stack.is_empty() {
            self.stacks.remove(&pos);
        }
        self.locations[tile.slot()] = None;
        if tile.index() == 0 {
            self.queens[tile.owner().index()] = None;
        }
        tile
    }

    /// Restore hand and counters while rebuilding a board from outside data
    pub(crate) fn restore_bookkeeping(&mut self, hands: [ActionMask; 2], turns: [u16; 2]) {
        self.hands = hands;
        self.turns = turns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::ORIGIN;
    use crate::tile::Insect;

    fn tile(owner: Player, insect: Insect, n: u8) -> TileId {
        TileId::new(owner, insect, n).unwrap()
    }

    #[test]
    fn test_place_and_undo() {
        let mut board = Board::new();
        let start = board.canonical_hash();
        let queen = TileId::queen(Player::One);

        board.place(queen, ORIGIN);
        assert_eq!(board.location(queen), Some(ORIGIN));
        assert_eq!(board.queen_position(Player::One), Some(ORIGIN));
        assert!(!board.in_hand(queen));
        assert_eq!(board.turns(Player::One), 1);
        assert_eq!(board.current_player(), Player::Two);

        board.undo_place(queen);
        assert!(board.is_empty());
        assert!(board.in_hand(queen));
        assert_eq!(board.queen_position(Player::One), None);
        assert_eq!(board.canonical_hash(), start);
        assert_eq!(board.contents_hash(), 0);
    }

    #[test]
    fn test_stacking() {
        let mut board = Board::new();
        let queen = TileId::queen(Player::One);
        let beetle = tile(Player::Two, Insect::Beetle, 1);
        board.place(queen, ORIGIN);
        board.place(beetle, Hex::new(0, 1));
        board.move_tile(beetle, ORIGIN);

        assert_eq!(board.stack_at(ORIGIN), &[queen, beetle]);
        assert_eq!(board.height(ORIGIN), 2);
        assert_eq!(board.top(ORIGIN), Some(beetle));
        assert!(board.is_covered(queen));
        assert!(!board.is_occupied(Hex::new(0, 1)));
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    #[should_panic(expected = "covered tile")]
    fn test_moving_covered_tile_panics() {
        let mut board = Board::new();
        let queen = TileId::queen(Player::One);
        let beetle = tile(Player::Two, Insect::Beetle, 1);
        board.place(queen, ORIGIN);
        board.place(beetle, Hex::new(0, 1));
        board.move_tile(beetle, ORIGIN);
        board.move_tile(queen, Hex::new(1, 0));
    }

    #[test]
    #[should_panic(expected = "not in hand")]
    fn test_placing_twice_panics() {
        let mut board = Board::new();
        let ant = tile(Player::One, Insect::Ant, 1);
        board.place(ant, ORIGIN);
        board.place(ant, Hex::new(0, 1));
    }

    #[test]
    fn test_hash_is_order_independent() {
        let a = tile(Player::One, Insect::Ant, 1);
        let b = tile(Player::Two, Insect::Spider, 2);

        let mut first = Board::new();
        first.place(a, ORIGIN);
        first.place(b, Hex::new(1, 0));

        let mut second = Board::new();
        second.place(b, Hex::new(1, 0));
        second.place(a, ORIGIN);

        assert_eq!(first.contents_hash(), second.contents_hash());
        assert_ne!(first.contents_hash(), 0);
    }

    #[test]
    fn test_move_undo_restores_hash() {
        let mut board = Board::new();
        let queen = TileId::queen(Player::One);
        let ant = tile(Player::Two, Insect::Ant, 2);
        board.place(queen, ORIGIN);
        board.place(ant, Hex::new(0, 1));
        let before = board.canonical_hash();

        let predicted = board.hash_after(&Relocation::step(ant, Hex::new(0, 1), Hex::new(1, 0)));
        board.move_tile(ant, Hex::new(1, 0));
        assert_eq!(board.contents_hash(), predicted);
        assert_ne!(board.canonical_hash(), before);

        board.undo_move(ant, Hex::new(0, 1));
        assert_eq!(board.canonical_hash(), before);
    }

    #[test]
    fn test_pass_changes_turn_only() {
        let mut board = Board::new();
        board.place(TileId::queen(Player::One), ORIGIN);
        let contents = board.contents_hash();
        let canonical = board.canonical_hash();

        let passed = board.pass_turn();
        assert_eq!(passed, Player::Two);
        assert_eq!(board.current_player(), Player::One);
        assert_eq!(board.contents_hash(), contents);
        assert_ne!(board.canonical_hash(), canonical);

        board.undo_pass(passed);
        assert_eq!(board.canonical_hash(), canonical);
    }
}
