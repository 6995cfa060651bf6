// The six edge directions of a pointy-top hexagon.
//
// Directions are ordered clockwise starting at north-east. The ordering is
// load-bearing: the triangulator emits each inter-cell connection exactly
// once by only building bridges toward `NE..=SE` and corners toward
// `NE..=E`, so `HexDirection` is `Ord` and those comparisons appear all
// over `triangulate.rs`.
//
// See also: `metrics.rs` for the corner table this indexes into.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HexDirection {
    NE,
    E,
    SE,
    SW,
    W,
    NW,
}

impl HexDirection {
    /// All six directions in clockwise order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NE,
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
    ];

    /// Position in the clockwise order; also the neighbor/road array index.
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> HexDirection {
        Self::ALL[(self.idx() + 3) % 6]
    }

    pub fn next(self) -> HexDirection {
        Self::ALL[(self.idx() + 1) % 6]
    }

    pub fn previous(self) -> HexDirection {
        Self::ALL[(self.idx() + 5) % 6]
    }

    pub fn next2(self) -> HexDirection {
        Self::ALL[(self.idx() + 2) % 6]
    }

    pub fn previous2(self) -> HexDirection {
        Self::ALL[(self.idx() + 4) % 6]
    }
}
