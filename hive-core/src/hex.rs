//! Hex grid geometry with axial coordinates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

/// Where the first tile of a game is placed
pub const ORIGIN: Hex = Hex::new(0, 0);

/// Direction vectors in axial coordinates (dq, dr), clockwise from 12 o'clock.
/// Index: 0=N, 1=NE, 2=SE, 3=S, 4=SW, 5=NW
pub const DIRECTIONS: [(i32, i32); 6] = [
    (0, 1),   // N
    (1, 0),   // NE
    (1, -1),  // SE
    (0, -1),  // S
    (-1, 0),  // SW
    (-1, 1),  // NW
];

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All six neighbors, in direction order
    pub fn neighbors(&self) -> [Hex; 6] {
        std::array::from_fn(|d| self.neighbor(d))
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = ((self.q + self.r) - (other.q + other.r)).abs();
        (dq + dr + ds) / 2
    }

    /// Direction from this hex to an adjacent one
    pub fn direction_to(&self, other: Hex) -> Option<usize> {
        (0..6).find(|&d| self.neighbor(d) == other)
    }
}

/// The two directions flanking `direction` (counter-clockwise, clockwise).
///
/// A piece stepping from `p` towards `p.neighbor(d)` squeezes between
/// `p.neighbor(left)` and `p.neighbor(right)`.
pub fn flanks(direction: usize) -> (usize, usize) {
    ((direction + 5) % 6, (direction + 1) % 6)
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for Hex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseError::Coordinate(s.to_string());
        let inner = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (q, r) = inner.split_once(',').ok_or_else(bad)?;
        let q = q.trim().parse::<i32>().map_err(|_| bad())?;
        let r = r.trim().parse::<i32>().map_err(|_| bad())?;
        Ok(Hex::new(q, r))
    }
}
