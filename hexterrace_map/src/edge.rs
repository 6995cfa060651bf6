// A cell edge subdivided into four segments.
//
// Terrain is never built from whole hexagons: each of a cell's six sectors
// is an edge fan or strip over five points spanning the solid corners.
// Subdividing lets vertex perturbation bend the surface without tearing it,
// and gives rivers and roads interior lines (`v2..v4`) to run along.
//
// See also: `triangulate.rs` for the fan/strip emitters consuming this.

use crate::metrics;
use glam::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct EdgeVertices {
    pub v1: Vec3,
    pub v2: Vec3,
    pub v3: Vec3,
    pub v4: Vec3,
    pub v5: Vec3,
}

impl EdgeVertices {
    /// Evenly subdivided edge from `corner1` to `corner2`.
    pub fn new(corner1: Vec3, corner2: Vec3) -> Self {
        Self::with_outer_step(corner1, corner2, 0.25)
    }

    /// Edge whose outer points sit `outer_step` in from the corners. River
    /// channels use `1/6` so the midline section (`v2..v4`) widens to match
    /// the channel.
    pub fn with_outer_step(corner1: Vec3, corner2: Vec3, outer_step: f32) -> Self {
        Self {
            v1: corner1,
            v2: corner1.lerp(corner2, outer_step),
            v3: corner1.lerp(corner2, 0.5),
            v4: corner1.lerp(corner2, 1.0 - outer_step),
            v5: corner2,
        }
    }

    /// Terrace-interpolate every point between two edges.
    pub fn terrace_lerp(a: EdgeVertices, b: EdgeVertices, step: usize) -> EdgeVertices {
        EdgeVertices {
            v1: metrics::terrace_lerp(a.v1, b.v1, step),
            v2: metrics::terrace_lerp(a.v2, b.v2, step),
            v3: metrics::terrace_lerp(a.v3, b.v3, step),
            v4: metrics::terrace_lerp(a.v4, b.v4, step),
            v5: metrics::terrace_lerp(a.v5, b.v5, step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TERRACE_STEPS;

    #[test]
    fn even_subdivision_lands_on_quarters() {
        let e = EdgeVertices::new(Vec3::ZERO, Vec3::new(8.0, 0.0, 4.0));
        assert_eq!(e.v1, Vec3::ZERO);
        assert_eq!(e.v2, Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(e.v3, Vec3::new(4.0, 0.0, 2.0));
        assert_eq!(e.v4, Vec3::new(6.0, 0.0, 3.0));
        assert_eq!(e.v5, Vec3::new(8.0, 0.0, 4.0));
    }

    #[test]
    fn outer_step_widens_the_middle_section() {
        let e = EdgeVertices::with_outer_step(Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0), 1.0 / 6.0);
        assert!((e.v2.x - 1.0).abs() < 1e-5);
        assert_eq!(e.v3.x, 3.0);
        assert!((e.v4.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn terrace_lerp_applies_to_every_point() {
        let a = EdgeVertices::new(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0));
        let b = EdgeVertices::new(Vec3::new(0.0, 3.0, 10.0), Vec3::new(4.0, 3.0, 10.0));
        let start = EdgeVertices::terrace_lerp(a, b, 0);
        let end = EdgeVertices::terrace_lerp(a, b, TERRACE_STEPS);
        assert_eq!(start.v1, a.v1);
        assert_eq!(start.v5, a.v5);
        assert!((end.v1 - b.v1).length() < 1e-5);
        assert!((end.v5 - b.v5).length() < 1e-5);
        // Flat tread: steps 1 and 2 share their height on every point.
        let s1 = EdgeVertices::terrace_lerp(a, b, 1);
        let s2 = EdgeVertices::terrace_lerp(a, b, 2);
        assert_eq!(s1.v3.y, s2.v3.y);
    }
}
