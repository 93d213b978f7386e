//! Transposition cache for move generation and connectivity
//!
//! Keys are contents hashes, so an entry stays valid for any board with the
//! same tiles in the same places. The cache is owned by one
//! [`Searcher`](crate::search::Searcher) and cleared around every top-level
//! search call.

use rustc_hash::FxHashMap;

use crate::board::Board;
use crate::connectivity::CachedHive;
use crate::movegen::{destinations, HexSet};
use crate::tile::TileId;

/// Hit/miss counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub move_hits: u64,
    pub move_misses: u64,
    pub hive_hits: u64,
    pub hive_misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let hits = self.move_hits + self.hive_hits;
        let total = hits + self.move_misses + self.hive_misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct TranspositionCache {
    moves: FxHashMap<(u64, TileId), HexSet>,
    connectivity: FxHashMap<u64, bool>,
    stats: CacheStats,
}

impl TranspositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destinations of `tile`, computed once per board contents
    pub fn valid_moves(&mut self, board: &Board, tile: TileId) -> HexSet {
        let key = (board.contents_hash(), tile);
        if let Some(moves) = self.moves.get(&key) {
            self.stats.move_hits += 1;
            return moves.clone();
        }
        self.stats.move_misses += 1;

        let mut hive = CachedHive {
            results: &mut self.connectivity,
            hits: &mut self.stats.hive_hits,
            misses: &mut self.stats.hive_misses,
        };
        let moves = destinations(board, tile, &mut hive);
        self.moves.insert(key, moves.clone());
        moves
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.moves.len() + self.connectivity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset the counters
    pub fn clear(&mut self) {
        self.moves.clear();
        self.connectivity.clear();
        self.stats = CacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{Hex, ORIGIN};
    use crate::movegen::valid_moves;
    use crate::tile::{Insect, Player};

    fn board() -> (Board, TileId) {
        let mut board = Board::new();
        let ant = TileId::new(Player::One, Insect::Ant, 1).unwrap();
        board.place(TileId::queen(Player::One), ORIGIN);
        board.place(TileId::queen(Player::Two), Hex::new(0, 1));
        board.place(ant, Hex::new(0, -1));
        (board, ant)
    }

    #[test]
    fn test_cached_moves_match_uncached() {
        let (board, ant) = board();
        let mut cache = TranspositionCache::new();
        let first = cache.valid_moves(&board, ant);
        let second = cache.valid_moves(&board, ant);
        assert_eq!(first, valid_moves(&board, ant));
        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!((stats.move_hits, stats.move_misses), (1, 1));
        assert!(stats.hive_misses > 0);
    }

    #[test]
    fn test_key_follows_board_contents() {
        let (mut board, ant) = board();
        let mut cache = TranspositionCache::new();
        let before = cache.valid_moves(&board, ant);

        board.move_tile(ant, Hex::new(1, -1));
        let after = cache.valid_moves(&board, ant);
        assert_eq!(after, valid_moves(&board, ant));
        assert_ne!(before, after);
        assert_eq!(cache.stats().move_misses, 2);
    }

    #[test]
    fn test_clear() {
        let (board, ant) = board();
        let mut cache = TranspositionCache::new();
        cache.valid_moves(&board, ant);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
