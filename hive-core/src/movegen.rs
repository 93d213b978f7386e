//! Per-insect movement rules
//!
//! Every generator works on the live board with the moving tile treated as
//! lifted; candidates are checked against the one-hive rule through a
//! [`HiveCheck`] so the search can plug in its cache.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::board::{Board, Relocation};
use crate::connectivity::{ConnectivityChecker, HiveCheck};
use crate::hex::{flanks, Hex};
use crate::tile::{Insect, TileId};

/// Destination set; order is not meaningful
pub type HexSet = FxHashSet<Hex>;

/// Spider walks exactly this many steps
const SPIDER_STEPS: u8 = 3;

/// Where `tile` can move to, using uncached connectivity checks
pub fn valid_moves(board: &Board, tile: TileId) -> HexSet {
    destinations(board, tile, &mut ConnectivityChecker)
}

/// Where `tile` can move to.
///
/// Empty when the tile is in hand, covered, pinned, or its owner has not
/// placed the queen yet.
pub fn destinations<H: HiveCheck>(board: &Board, tile: TileId, hive: &mut H) -> HexSet {
    let Some(from) = board.location(tile) else {
        return HexSet::default();
    };
    if board.is_covered(tile) || !board.queen_placed(tile.owner()) {
        return HexSet::default();
    }
    if board.height(from) == 1
        && board.occupied_count() >= 2
        && !hive.is_connected_after(board, &Relocation::lift(tile, from))
    {
        return HexSet::default();
    }

    let mut walker = Walker { board, tile, from, hive };
    match tile.insect() {
        Insect::Queen => walker.queen(),
        Insect::Spider => walker.spider(),
        Insect::Beetle => walker.beetle(),
        Insect::Ant => walker.ant(),
        Insect::Grasshopper => walker.grasshopper(),
    }
}

// ============================================================================
// WALKER
// ============================================================================

struct Walker<'a, H> {
    board: &'a Board,
    tile: TileId,
    from: Hex,
    hive: &'a mut H,
}

impl<H: HiveCheck> Walker<'_, H> {
    /// Occupancy with the moving tile lifted off its origin
    fn occupied(&self, pos: Hex) -> bool {
        if pos == self.from {
            self.board.height(pos) > 1
        } else {
            self.board.is_occupied(pos)
        }
    }

    /// Freedom to move: at least one flank of the step is open
    fn can_slide(&self, pos: Hex, direction: usize) -> bool {
        let (left, right) = flanks(direction);
        !self.occupied(pos.neighbor(left)) || !self.occupied(pos.neighbor(right))
    }

    /// The step runs along the hive: not both flanks bare
    fn has_contact(&self, pos: Hex, direction: usize) -> bool {
        let (left, right) = flanks(direction);
        self.board.is_occupied(pos.neighbor(left)) || self.board.is_occupied(pos.neighbor(right))
    }

    fn keeps_hive(&mut self, to: Hex) -> bool {
        let relocation = Relocation::step(self.tile, self.from, to);
        self.hive.is_connected_after(self.board, &relocation)
    }

    /// One ground-level slide from `pos`, if legal
    fn slide(&mut self, pos: Hex, direction: usize) -> Option<Hex> {
        let dest = pos.neighbor(direction);
        if self.occupied(dest)
            || !self.can_slide(pos, direction)
            || !self.has_contact(pos, direction)
            || !self.keeps_hive(dest)
        {
            return None;
        }
        Some(dest)
    }

    fn queen(&mut self) -> HexSet {
        (0..6).filter_map(|d| self.slide(self.from, d)).collect()
    }

    fn ant(&mut self) -> HexSet {
        let mut out = HexSet::default();
        let mut seen = HexSet::default();
        seen.insert(self.from);
        let mut queue = VecDeque::from([self.from]);

        while let Some(pos) = queue.pop_front() {
            for d in 0..6 {
                if seen.contains(&pos.neighbor(d)) {
                    continue;
                }
                if let Some(dest) = self.slide(pos, d) {
                    seen.insert(dest);
                    out.insert(dest);
                    queue.push_back(dest);
                }
            }
        }
        out
    }

    fn spider(&mut self) -> HexSet {
        let mut out = HexSet::default();
        let mut seen = HexSet::default();
        seen.insert(self.from);
        let mut queue = VecDeque::from([(self.from, 0u8)]);

        while let Some((pos, depth)) = queue.pop_front() {
            for d in 0..6 {
                if seen.contains(&pos.neighbor(d)) {
                    continue;
                }
                let Some(dest) = self.slide(pos, d) else {
                    continue;
                };
                if depth + 1 == SPIDER_STEPS {
                    out.insert(dest);
                } else {
                    seen.insert(dest);
                    queue.push_back((dest, depth + 1));
                }
            }
        }
        out
    }

    fn grasshopper(&mut self) -> HexSet {
        let mut out = HexSet::default();
        for d in 0..6 {
            let mut pos = self.from.neighbor(d);
            if !self.board.is_occupied(pos) {
                continue;
            }
            while self.board.is_occupied(pos) {
                pos = pos.neighbor(d);
            }
            if self.keeps_hive(pos) {
                out.insert(pos);
            }
        }
        out
    }

    fn beetle(&mut self) -> HexSet {
        let level = self.board.height(self.from) - 1;
        let mut out = HexSet::default();
        for d in 0..6 {
            let dest = self.from.neighbor(d);
            let target = self.board.height(dest);
            let allowed = if target == 0 {
                level > 0 || (self.can_slide(self.from, d) && self.has_contact(self.from, d))
            } else if target != level {
                true
            } else {
                // Gate on top of the hive
                let (left, right) = flanks(d);
                let l = self.board.height(self.from.neighbor(left));
                let r = self.board.height(self.from.neighbor(right));
                !(l > level && r > level)
            };
            if allowed && self.keeps_hive(dest) {
                out.insert(dest);
            }
        }
        out
    }
}
