// Cube coordinates for hex cells, plus conversions from offset storage
// order and from world positions.
//
// Cells are stored row-major in offset coordinates (x column, z row), but
// all distance and direction reasoning uses cube coordinates, where the
// three axes sum to zero and each hex direction is a fixed delta. Only X
// and Z are stored; Y is always derived, so the invariant cannot drift.
//
// World-position conversion inverts the pointy-top layout projection. The
// fractional cube triple is rounded per-axis; when rounding breaks the
// zero-sum invariant, the axis with the largest rounding error is
// recomputed from the other two.
//
// See also: `grid.rs` for the offset-indexed cell arena these address.

use crate::metrics;
use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoordinates {
    x: i32,
    z: i32,
}

impl HexCoordinates {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn x(self) -> i32 {
        self.x
    }

    /// Derived third axis: the three cube axes always sum to zero.
    pub fn y(self) -> i32 {
        -self.x - self.z
    }

    pub fn z(self) -> i32 {
        self.z
    }

    /// Convert from offset (storage) coordinates. Every other row shifts
    /// half a cell, which the truncating `z / 2` undoes.
    pub fn from_offset(x: i32, z: i32) -> Self {
        Self::new(x - z / 2, z)
    }

    pub fn to_offset_x(self) -> i32 {
        self.x + self.z / 2
    }

    pub fn to_offset_z(self) -> i32 {
        self.z
    }

    /// Find the coordinates of the cell containing a world position.
    ///
    /// Inverse of the grid layout projection. The rounded triple can
    /// violate the zero-sum invariant near cell boundaries; the axis with
    /// the largest rounding error is then rebuilt from the other two. If
    /// that largest error sits on the derived Y axis there is nothing to
    /// rebuild — the stored pair is already the best available answer, and
    /// a warning is logged.
    pub fn from_position(position: Vec3) -> Self {
        let x = position.x / (metrics::INNER_RADIUS * 2.0);
        let y = -x;
        let offset = position.z / (metrics::OUTER_RADIUS * 3.0);
        let x = x - offset;
        let y = y - offset;

        let mut ix = x.round() as i32;
        let iy = y.round() as i32;
        let mut iz = (-x - y).round() as i32;

        if ix + iy + iz != 0 {
            let dx = (x - ix as f32).abs();
            let dy = (y - iy as f32).abs();
            let dz = (-x - y - iz as f32).abs();
            if dx > dy && dx > dz {
                ix = -iy - iz;
            } else if dz > dy {
                iz = -ix - iy;
            } else {
                warn!(
                    "cube rounding failed on the derived axis at {position}; \
                     keeping ({ix}, {iz})"
                );
            }
        }
        Self::new(ix, iz)
    }

    /// Distance in cells: half the cube-axis deltas' magnitude sum.
    pub fn distance_to(self, other: HexCoordinates) -> i32 {
        ((self.x - other.x).abs()
            + (self.y() - other.y()).abs()
            + (self.z - other.z).abs())
            / 2
    }
}

impl fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// World position of a cell center in offset coordinates, matching the
    /// grid layout.
    fn center(x: i32, z: i32) -> Vec3 {
        Vec3::new(
            (x as f32 + 0.5 * z as f32 - (z / 2) as f32) * (metrics::INNER_RADIUS * 2.0),
            0.0,
            z as f32 * (metrics::OUTER_RADIUS * 1.5),
        )
    }

    #[test]
    fn offset_roundtrip_preserves_storage_order() {
        for z in -8..8 {
            for x in -8..8 {
                let c = HexCoordinates::from_offset(x, z);
                assert_eq!(c.to_offset_x(), x);
                assert_eq!(c.to_offset_z(), z);
            }
        }
    }

    #[test]
    fn cube_axes_always_sum_to_zero() {
        for z in -8..8 {
            for x in -8..8 {
                let c = HexCoordinates::from_offset(x, z);
                assert_eq!(c.x() + c.y() + c.z(), 0, "violated at {c}");
            }
        }
    }

    #[test]
    fn cell_centers_project_back_to_their_coordinates() {
        for z in 0..12 {
            for x in 0..12 {
                let expected = HexCoordinates::from_offset(x, z);
                assert_eq!(
                    HexCoordinates::from_position(center(x, z)),
                    expected,
                    "offset ({x}, {z})"
                );
            }
        }
    }

    #[test]
    fn positions_near_a_center_still_resolve_to_it() {
        // Well inside the cell: the inner radius is ~8.66, so +-2 world
        // units cannot reach a boundary.
        for z in 0..6 {
            for x in 0..6 {
                let expected = HexCoordinates::from_offset(x, z);
                for (dx, dz) in [(2.0, 0.0), (-2.0, 1.5), (0.0, -2.0), (1.3, 1.3)] {
                    let p = center(x, z) + Vec3::new(dx, 0.0, dz);
                    assert_eq!(HexCoordinates::from_position(p), expected);
                }
            }
        }
    }

    #[test]
    fn height_does_not_affect_projection() {
        let p = center(3, 4) + Vec3::new(0.0, 25.0, 0.0);
        assert_eq!(
            HexCoordinates::from_position(p),
            HexCoordinates::from_offset(3, 4)
        );
    }

    #[test]
    fn distances_count_cells_not_axes() {
        let origin = HexCoordinates::new(0, 0);
        assert_eq!(origin.distance_to(origin), 0);
        // Straight along +x: one cell per step.
        assert_eq!(origin.distance_to(HexCoordinates::new(3, 0)), 3);
        // A diagonal that moves two axes at once.
        assert_eq!(origin.distance_to(HexCoordinates::new(2, -1)), 2);
        // Symmetric.
        let a = HexCoordinates::new(-2, 5);
        let b = HexCoordinates::new(4, -1);
        assert_eq!(a.distance_to(b), b.distance_to(a));
    }

    #[test]
    fn display_shows_all_three_axes() {
        let c = HexCoordinates::new(2, -5);
        assert_eq!(format!("{c}"), "(2, 3, -5)");
    }
}
