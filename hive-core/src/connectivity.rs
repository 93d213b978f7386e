//! One-hive connectivity checks
//!
//! Questions are asked about the live board or about the board as it would
//! look after a [`Relocation`]. The relocation is applied as a read-only
//! overlay, so checking a candidate never mutates the board.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::board::{Board, Relocation};
use crate::hex::Hex;
use crate::tile::TileId;

/// Source of one-hive answers for hypothetical boards
pub trait HiveCheck {
    fn is_connected_after(&mut self, board: &Board, relocation: &Relocation) -> bool;
}

/// Uncached connectivity checks
#[derive(Clone, Copy, Debug, Default)]
pub struct ConnectivityChecker;

impl HiveCheck for ConnectivityChecker {
    fn is_connected_after(&mut self, board: &Board, relocation: &Relocation) -> bool {
        connected_with(board, Some(relocation))
    }
}

/// Connectivity answers memoized by the contents hash of the hypothetical board
pub struct CachedHive<'a> {
    pub(crate) results: &'a mut FxHashMap<u64, bool>,
    pub(crate) hits: &'a mut u64,
    pub(crate) misses: &'a mut u64,
}

impl HiveCheck for CachedHive<'_> {
    fn is_connected_after(&mut self, board: &Board, relocation: &Relocation) -> bool {
        let key = board.hash_after(relocation);
        if let Some(&connected) = self.results.get(&key) {
            *self.hits += 1;
            return connected;
        }
        *self.misses += 1;
        let connected = connected_with(board, Some(relocation));
        self.results.insert(key, connected);
        connected
    }
}

/// True when the occupied hexes form a single group
pub fn is_connected(board: &Board) -> bool {
    connected_with(board, None)
}

/// Connectivity with `tile` lifted off `pos`
pub fn is_connected_excluding(board: &Board, tile: TileId, pos: Hex) -> bool {
    connected_with(board, Some(&Relocation::lift(tile, pos)))
}

/// Connectivity with `tile` moved from `from` to `to`
pub fn is_connected_after_move(
    board: &Board,
    tile: TileId,
    from: Hex,
    to: Hex,
) -> bool {
    connected_with(board, Some(&Relocation::step(tile, from, to)))
}

/// Occupancy of `pos` with the relocation applied
fn occupied_after(board: &Board, relocation: Option<&Relocation>, pos: Hex) -> bool {
    match relocation {
        Some(r) if r.to == Some(pos) => true,
        Some(r) if r.from == pos => board.height(pos) > 1,
        _ => board.is_occupied(pos),
    }
}

fn connected_with(board: &Board, relocation: Option<&Relocation>) -> bool {
    let mut occupied: FxHashSet<Hex> = board
        .occupied()
        .filter(|pos| occupied_after(board, relocation, *pos))
        .collect();
    if let Some(to) = relocation.and_then(|r| r.to) {
        occupied.insert(to);
    }
    if occupied.len() <= 1 {
        return true;
    }

    let Some(&start) = occupied.iter().next() else {
        return true;
    };
    let mut seen = FxHashSet::default();
    seen.insert(start);
    let mut stack = vec![start];
    while let Some(pos) = stack.pop() {
        for next in pos.neighbors() {
            if occupied.contains(&next) && seen.insert(next) {
                stack.push(next);
            }
        }
    }
    seen.len() == occupied.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::ORIGIN;
    use crate::tile::{Insect, Player, TileId};

    fn line_board() -> (Board, TileId, TileId, TileId) {
        // Three tiles in a line along direction 1
        let mut board = Board::new();
        let a = TileId::queen(Player::One);
        let b = TileId::queen(Player::Two);
        let c = TileId::new(Player::One, Insect::Ant, 1).unwrap();
        board.place(a, ORIGIN);
        board.place(b, Hex::new(1, 0));
        board.place(c, Hex::new(2, 0));
        (board, a, b, c)
    }

    #[test]
    fn test_trivial_boards_are_connected() {
        let mut board = Board::new();
        assert!(is_connected(&board));
        let queen = TileId::queen(Player::One);
        board.place(queen, ORIGIN);
        assert!(is_connected(&board));
        assert!(is_connected_excluding(&board, queen, ORIGIN));
    }

    #[test]
    fn test_lifting_middle_tile_splits_hive() {
        let (board, a, b, _) = line_board();
        assert!(is_connected(&board));
        assert!(!is_connected_excluding(&board, b, Hex::new(1, 0)));
        assert!(is_connected_excluding(&board, a, ORIGIN));
    }

    #[test]
    fn test_move_overlay() {
        let (board, a, _, c) = line_board();
        // End tile walks around to a hex still touching the line
        assert!(is_connected_after_move(&board, c, Hex::new(2, 0), Hex::new(1, 1)));
        // Detached destination
        assert!(!is_connected_after_move(&board, c, Hex::new(2, 0), Hex::new(5, 5)));
        // The overlay never touches the board
        assert_eq!(board.location(a), Some(ORIGIN));
        assert_eq!(board.occupied_count(), 3);
    }

    #[test]
    fn test_lifting_from_stack_keeps_hex_occupied() {
        let (mut board, _, _, _) = line_board();
        let beetle = TileId::new(Player::Two, Insect::Beetle, 1).unwrap();
        board.place(beetle, Hex::new(1, -1));
        board.move_tile(beetle, Hex::new(1, 0));
        assert!(is_connected_excluding(&board, beetle, Hex::new(1, 0)));
    }

    #[test]
    fn test_cached_check_matches_plain() {
        let (board, _, b, c) = line_board();
        let mut results = FxHashMap::default();
        let (mut hits, mut misses) = (0, 0);
        let mut cached = CachedHive {
            results: &mut results,
            hits: &mut hits,
            misses: &mut misses,
        };
        let split = Relocation::lift(b, Hex::new(1, 0));
        let fine = Relocation::step(c, Hex::new(2, 0), Hex::new(1, 1));
        for _ in 0..2 {
            assert!(!cached.is_connected_after(&board, &split));
            assert!(cached.is_connected_after(&board, &fine));
        }
        assert_eq!((hits, misses), (2, 2));
    }
}
