//! Action space: fixed bijection between piece identities and indices 0-10
//!
//! A full action is a (position, index) pair; the acting player turns the
//! index back into a concrete tile. The same 11-slot encoding is used for
//! legal-action masks handed to the search and to external consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::tile::{Insect, Player, TileId};

/// Piece identities per player
pub const ACTION_SPACE_SIZE: usize = 11;

/// Index order: Queen, Spider 1-2, Beetle 1-2, Ant 1-3, Grasshopper 1-3
const ACTION_SPACE: [(Insect, u8); ACTION_SPACE_SIZE] = [
    (Insect::Queen, 1),
    (Insect::Spider, 1),
    (Insect::Spider, 2),
    (Insect::Beetle, 1),
    (Insect::Beetle, 2),
    (Insect::Ant, 1),
    (Insect::Ant, 2),
    (Insect::Ant, 3),
    (Insect::Grasshopper, 1),
    (Insect::Grasshopper, 2),
    (Insect::Grasshopper, 3),
];

/// Index of a piece identity
pub fn action_index(insect: Insect, instance: u8) -> Option<u8> {
    ACTION_SPACE
        .iter()
        .position(|&(i, n)| i == insect && n == instance)
        .map(|i| i as u8)
}

/// Piece identity at an index. Panics on an index outside 0-10.
pub fn identity(index: u8) -> (Insect, u8) {
    ACTION_SPACE[index as usize]
}

/// Decode an index into the acting player's tile
pub fn tile_for(player: Player, index: u8) -> Option<TileId> {
    TileId::from_index(player, index)
}

/// A placement or movement target for one of the acting player's tiles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action {
    pub pos: Hex,
    pub index: u8,
}

impl Action {
    pub fn new(pos: Hex, index: u8) -> Self {
        Self { pos, index }
    }

    /// Tile this action refers to when `player` acts
    pub fn tile(&self, player: Player) -> Option<TileId> {
        tile_for(player, self.index)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (insect, instance) = identity(self.index);
        write!(f, "{}{} -> {}", insect.name(), instance, self.pos)
    }
}

/// Set of action indices (one bit per piece identity)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMask(u16);

impl ActionMask {
    pub const EMPTY: ActionMask = ActionMask(0);

    /// Every piece identity
    pub const FULL: ActionMask = ActionMask((1 << ACTION_SPACE_SIZE) - 1);

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn insert(&mut self, index: u8) {
        debug_assert!((index as usize) < ACTION_SPACE_SIZE, "action index {index} out of range");
        self.0 |= 1 << index;
    }

    pub fn remove(&mut self, index: u8) {
        debug_assert!((index as usize) < ACTION_SPACE_SIZE, "action index {index} out of range");
        self.0 &= !(1 << index);
    }

    pub fn contains(&self, index: u8) -> bool {
        debug_assert!((index as usize) < ACTION_SPACE_SIZE, "action index {index} out of range");
        self.0 & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn union(self, other: ActionMask) -> ActionMask {
        ActionMask(self.0 | other.0)
    }

    /// Set indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = u8> {
        let bits = self.0;
        (0..ACTION_SPACE_SIZE as u8).filter(move |i| bits & (1 << i) != 0)
    }

    /// Boolean form, one entry per index
    pub fn to_bools(&self) -> [bool; ACTION_SPACE_SIZE] {
        std::array::from_fn(|i| self.contains(i as u8))
    }
}

impl FromIterator<u8> for ActionMask {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut mask = ActionMask::EMPTY;
        for index in iter {
            mask.insert(index);
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bijection() {
        for index in 0..ACTION_SPACE_SIZE as u8 {
            let (insect, instance) = identity(index);
            assert_eq!(action_index(insect, instance), Some(index));
        }
        assert_eq!(action_index(Insect::Queen, 1), Some(0));
        assert_eq!(action_index(Insect::Beetle, 2), Some(4));
        assert_eq!(action_index(Insect::Grasshopper, 3), Some(10));
        assert_eq!(action_index(Insect::Queen, 2), None);
    }

    #[test]
    fn test_decode_uses_acting_player() {
        let action = Action::new(Hex::new(1, 0), 5);
        let tile = action.tile(Player::Two).unwrap();
        assert_eq!(tile.owner(), Player::Two);
        assert_eq!(tile.insect(), Insect::Ant);
        assert_eq!(tile.instance(), 1);
        assert!(Action::new(Hex::new(0, 0), 11).tile(Player::One).is_none());
    }

    #[test]
    fn test_mask_ops() {
        let mut mask: ActionMask = [0u8, 3, 10].into_iter().collect();
        assert_eq!(mask.count(), 3);
        assert!(mask.contains(3));
        assert!(!mask.contains(4));
        mask.remove(3);
        assert_eq!(mask.indices().collect::<Vec<_>>(), vec![0, 10]);
        let bools = mask.to_bools();
        assert!(bools[0] && bools[10] && !bools[3]);
        assert_eq!(ActionMask::FULL.count(), ACTION_SPACE_SIZE as u32);
    }
}
