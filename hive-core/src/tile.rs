//! Tile identities
//!
//! A tile is one physical piece: owner, insect kind and instance number.
//! Identity never changes during a game; where the tile currently sits is
//! tracked by the [`Board`](crate::board::Board).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::action_space::{self, ACTION_SPACE_SIZE};
use crate::error::ParseError;

/// Tiles each player owns
pub const TILES_PER_PLAYER: usize = ACTION_SPACE_SIZE;

/// Tiles in a full game
pub const TOTAL_TILES: usize = TILES_PER_PLAYER * 2;

/// Player (1 moves first)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// 0 for player 1, 1 for player 2
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Player to act given both turn counters: player one when they are equal
    pub fn to_act(turns: [u16; 2]) -> Self {
        if turns[0] <= turns[1] {
            Player::One
        } else {
            Player::Two
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Insect kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Insect {
    Queen,
    Spider,
    Beetle,
    Ant,
    Grasshopper,
}

impl Insect {
    pub const ALL: [Insect; 5] = [
        Insect::Queen,
        Insect::Spider,
        Insect::Beetle,
        Insect::Ant,
        Insect::Grasshopper,
    ];

    /// Copies of this insect each player owns
    pub fn count(self) -> u8 {
        match self {
            Insect::Queen => 1,
            Insect::Spider | Insect::Beetle => 2,
            Insect::Ant | Insect::Grasshopper => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Insect::Queen => "queen",
            Insect::Spider => "spider",
            Insect::Beetle => "beetle",
            Insect::Ant => "ant",
            Insect::Grasshopper => "grasshopper",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Insect::ALL.into_iter().find(|i| i.name() == name)
    }
}

/// One physical tile: owner plus its action-space slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TileId {
    owner: Player,
    index: u8,
}

impl TileId {
    /// Build a tile from insect and 1-based instance; `None` if the player
    /// has no such copy (e.g. a fourth ant)
    pub fn new(owner: Player, insect: Insect, instance: u8) -> Option<Self> {
        action_space::action_index(insect, instance).map(|index| Self { owner, index })
    }

    /// Tile at an action-space index (0-10)
    pub fn from_index(owner: Player, index: u8) -> Option<Self> {
        ((index as usize) < ACTION_SPACE_SIZE).then_some(Self { owner, index })
    }

    pub fn queen(owner: Player) -> Self {
        Self { owner, index: 0 }
    }

    pub fn owner(&self) -> Player {
        self.owner
    }

    /// Action-space index (0-10)
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn insect(&self) -> Insect {
        action_space::identity(self.index).0
    }

    pub fn instance(&self) -> u8 {
        action_space::identity(self.index).1
    }

    /// Dense index over all 22 tiles
    pub fn slot(&self) -> usize {
        self.owner.index() * TILES_PER_PLAYER + self.index as usize
    }

    /// All tiles owned by `owner`, in action-space order
    pub fn all_for(owner: Player) -> impl Iterator<Item = TileId> {
        (0..ACTION_SPACE_SIZE as u8).map(move |index| TileId { owner, index })
    }

    /// All 22 tiles
    pub fn all() -> impl Iterator<Item = TileId> {
        Player::BOTH.into_iter().flat_map(TileId::all_for)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}_p{}", self.insect().name(), self.instance(), self.owner)
    }
}

impl FromStr for TileId {
    type Err = ParseError;

    /// Parse names like `queen1_p1` or `ant3_p2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseError::TileName(s.to_string());
        let (piece, player) = s.trim().split_once("_p").ok_or_else(bad)?;
        let owner = player
            .parse::<u8>()
            .ok()
            .and_then(Player::from_number)
            .ok_or_else(bad)?;
        let digits = piece.find(|c: char| c.is_ascii_digit()).ok_or_else(bad)?;
        let (name, instance) = piece.split_at(digits);
        let insect = Insect::from_name(name).ok_or_else(bad)?;
        let instance = instance.parse::<u8>().map_err(|_| bad())?;
        TileId::new(owner, insect, instance).ok_or_else(bad)
    }
}

impl From<TileId> for String {
    fn from(tile: TileId) -> Self {
        tile.to_string()
    }
}

impl TryFrom<String> for TileId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_counts() {
        let tiles: Vec<_> = TileId::all().collect();
        assert_eq!(tiles.len(), TOTAL_TILES);
        for player in Player::BOTH {
            for insect in Insect::ALL {
                let n = TileId::all_for(player).filter(|t| t.insect() == insect).count();
                assert_eq!(n, insect.count() as usize);
            }
        }
    }

    #[test]
    fn test_player_to_act() {
        assert_eq!(Player::to_act([0, 0]), Player::One);
        assert_eq!(Player::to_act([1, 0]), Player::Two);
        assert_eq!(Player::to_act([3, 3]), Player::One);
    }

    #[test]
    fn test_slots_are_dense() {
        let mut slots: Vec<_> = TileId::all().map(|t| t.slot()).collect();
        slots.sort_unstable();
        assert_eq!(slots, (0..TOTAL_TILES).collect::<Vec<_>>());
    }

    #[test]
    fn test_name_round_trip() {
        for tile in TileId::all() {
            assert_eq!(tile.to_string().parse::<TileId>(), Ok(tile));
        }
        assert_eq!(TileId::queen(Player::Two).to_string(), "queen1_p2");
    }

    #[test]
    fn test_bad_names() {
        assert!("ant4_p1".parse::<TileId>().is_err());
        assert!("queen1_p3".parse::<TileId>().is_err());
        assert!("ladybug1_p1".parse::<TileId>().is_err());
        assert!("queen_p1".parse::<TileId>().is_err());
        assert!(TileId::new(Player::One, Insect::Beetle, 3).is_none());
    }

    #[test]
    fn test_serde_uses_names() {
        let tile = TileId::new(Player::One, Insect::Grasshopper, 2).unwrap();
        let json = serde_json::to_string(&tile).unwrap();
        assert_eq!(json, "\"grasshopper2_p1\"");
        let back: TileId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tile);
    }
}
