// Geometry constants and the stateless functions derived from them.
//
// Everything about the shape of a cell lives here: the hexagon corner
// table, the solid/blend split that leaves room for inter-cell bridges,
// terrace interpolation, slope classification, and the noise perturbation
// applied to vertices and cell heights. All functions are pure; the only
// external input is a `NoiseSource` passed by reference.
//
// The constants are deliberately compile-time rather than configuration:
// the corner table, the bridge widths, and the terrace step sizes are all
// derived from each other, and changing one without the others produces
// meshes with holes.
//
// See also: `edge.rs` for the edge-strip type layered on the corner table,
// `triangulate.rs` for the consumer of nearly everything here.

use crate::direction::HexDirection;
use crate::types::Color;
use glam::Vec3;
use hexterrace_noise::{NoiseSample, NoiseSource};

/// Center-to-corner distance of a cell.
pub const OUTER_RADIUS: f32 = 10.0;

/// sqrt(3)/2: the ratio between a hexagon's inner and outer radii.
pub const OUTER_TO_INNER: f32 = 0.866025404;
pub const INNER_TO_OUTER: f32 = 1.0 / OUTER_TO_INNER;

/// Center-to-edge-midpoint distance of a cell.
pub const INNER_RADIUS: f32 = OUTER_RADIUS * OUTER_TO_INNER;

/// Fraction of the cell that is solid (single-colored); the rest blends
/// toward neighbors through bridges and corners.
pub const SOLID_FACTOR: f32 = 0.8;
pub const BLEND_FACTOR: f32 = 1.0 - SOLID_FACTOR;

/// World-space height of one elevation level.
pub const ELEVATION_STEP: f32 = 3.0;

/// Flat treads carved into a slope of one elevation level.
pub const TERRACES_PER_SLOPE: usize = 2;
/// Interpolation steps across a terraced slope: one per tread plus one per
/// connecting riser.
pub const TERRACE_STEPS: usize = TERRACES_PER_SLOPE * 2 + 1;
pub const HORIZONTAL_TERRACE_STEP_SIZE: f32 = 1.0 / TERRACE_STEPS as f32;
pub const VERTICAL_TERRACE_STEP_SIZE: f32 = 1.0 / (TERRACES_PER_SLOPE + 1) as f32;

/// Maximum XZ displacement applied to each mesh vertex.
pub const CELL_PERTURB_STRENGTH: f32 = 4.0;
/// Maximum Y displacement applied to each cell center.
pub const ELEVATION_PERTURB_STRENGTH: f32 = 1.5;
/// World-to-noise coordinate scale for all perturbation sampling.
pub const NOISE_SCALE: f32 = 0.003;

/// River beds sit below their cell's surface by this many elevation levels.
pub const STREAM_BED_ELEVATION_OFFSET: f32 = -1.75;
/// River and open-water surfaces sit below their level by this much.
pub const WATER_ELEVATION_OFFSET: f32 = -0.5;

/// Water hexagons are narrower than land ones, so shorelines get a wide
/// blend region.
pub const WATER_FACTOR: f32 = 0.6;
pub const WATER_BLEND_FACTOR: f32 = 1.0 - WATER_FACTOR;

/// Cells per chunk along each axis.
pub const CHUNK_SIZE_X: usize = 5;
pub const CHUNK_SIZE_Z: usize = 5;

/// Corner positions relative to a cell center, clockwise from due north,
/// with the first corner repeated so `corner(d)`/`corner(d + 1)` pairs never
/// wrap.
pub const CORNERS: [Vec3; 7] = [
    Vec3::new(0.0, 0.0, OUTER_RADIUS),
    Vec3::new(INNER_RADIUS, 0.0, 0.5 * OUTER_RADIUS),
    Vec3::new(INNER_RADIUS, 0.0, -0.5 * OUTER_RADIUS),
    Vec3::new(0.0, 0.0, -OUTER_RADIUS),
    Vec3::new(-INNER_RADIUS, 0.0, -0.5 * OUTER_RADIUS),
    Vec3::new(-INNER_RADIUS, 0.0, 0.5 * OUTER_RADIUS),
    Vec3::new(0.0, 0.0, OUTER_RADIUS),
];

/// How one cell edge relates to its neighbor's elevation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HexEdgeType {
    Flat,
    Slope,
    Cliff,
}

pub fn first_corner(d: HexDirection) -> Vec3 {
    CORNERS[d.idx()]
}

pub fn second_corner(d: HexDirection) -> Vec3 {
    CORNERS[d.idx() + 1]
}

pub fn first_solid_corner(d: HexDirection) -> Vec3 {
    CORNERS[d.idx()] * SOLID_FACTOR
}

pub fn second_solid_corner(d: HexDirection) -> Vec3 {
    CORNERS[d.idx() + 1] * SOLID_FACTOR
}

pub fn first_water_corner(d: HexDirection) -> Vec3 {
    CORNERS[d.idx()] * WATER_FACTOR
}

pub fn second_water_corner(d: HexDirection) -> Vec3 {
    CORNERS[d.idx() + 1] * WATER_FACTOR
}

/// Offset from a cell's solid edge to its neighbor's solid edge.
pub fn bridge(d: HexDirection) -> Vec3 {
    (CORNERS[d.idx()] + CORNERS[d.idx() + 1]) * BLEND_FACTOR
}

pub fn water_bridge(d: HexDirection) -> Vec3 {
    (CORNERS[d.idx()] + CORNERS[d.idx() + 1]) * WATER_BLEND_FACTOR
}

/// Midpoint of a solid edge, relative to the cell center.
pub fn solid_edge_middle(d: HexDirection) -> Vec3 {
    (CORNERS[d.idx()] + CORNERS[d.idx() + 1]) * (0.5 * SOLID_FACTOR)
}

/// Interpolate along a terraced slope.
///
/// X and Z advance a little every step; Y advances only on odd steps, which
/// is what turns a straight ramp into flat treads joined by risers. Step 0
/// returns `a`, step `TERRACE_STEPS` returns `b`.
pub fn terrace_lerp(a: Vec3, b: Vec3, step: usize) -> Vec3 {
    let h = step as f32 * HORIZONTAL_TERRACE_STEP_SIZE;
    let v = ((step + 1) / 2) as f32 * VERTICAL_TERRACE_STEP_SIZE;
    Vec3::new(
        a.x + (b.x - a.x) * h,
        a.y + (b.y - a.y) * v,
        a.z + (b.z - a.z) * h,
    )
}

/// Color interpolation across a terraced slope follows the horizontal
/// fraction only; treads and risers share the gradient.
pub fn terrace_color_lerp(a: Color, b: Color, step: usize) -> Color {
    let h = step as f32 * HORIZONTAL_TERRACE_STEP_SIZE;
    a.lerp(b, h)
}

/// Classify the transition between two elevations. Symmetric.
pub fn edge_type(elevation1: i32, elevation2: i32) -> HexEdgeType {
    if elevation1 == elevation2 {
        HexEdgeType::Flat
    } else if (elevation1 - elevation2).abs() == 1 {
        HexEdgeType::Slope
    } else {
        HexEdgeType::Cliff
    }
}

/// Sample the noise field at a world position's XZ, pre-scaled by
/// `NOISE_SCALE`.
pub fn sample_noise(noise: &dyn NoiseSource, position: Vec3) -> NoiseSample {
    noise.sample(position.x * NOISE_SCALE, position.z * NOISE_SCALE)
}

/// Displace a vertex horizontally by the noise field. Y is never perturbed
/// here; cell heights get their own offset via `elevation_perturb_offset`.
pub fn perturb(noise: &dyn NoiseSource, position: Vec3) -> Vec3 {
    let sample = sample_noise(noise, position);
    Vec3::new(
        position.x + (sample[0] * 2.0 - 1.0) * CELL_PERTURB_STRENGTH,
        position.y,
        position.z + (sample[2] * 2.0 - 1.0) * CELL_PERTURB_STRENGTH,
    )
}

/// The Y offset a cell center gets from the noise field. Depends only on
/// the cell's XZ position, so it is stable across elevation changes.
pub fn elevation_perturb_offset(noise: &dyn NoiseSource, position: Vec3) -> f32 {
    let sample = sample_noise(noise, position);
    (sample[1] * 2.0 - 1.0) * ELEVATION_PERTURB_STRENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexterrace_noise::FlatNoise;

    #[test]
    fn corner_table_wraps_cleanly() {
        assert_eq!(CORNERS[0], CORNERS[6]);
        for d in HexDirection::ALL {
            assert_eq!(second_corner(d), first_corner(d.next()));
        }
    }

    #[test]
    fn corners_lie_on_the_outer_radius() {
        for corner in &CORNERS {
            assert!((corner.length() - OUTER_RADIUS).abs() < 1e-4);
        }
    }

    #[test]
    fn adjacent_corners_are_one_edge_apart() {
        // A regular hexagon's edge length equals its outer radius.
        for i in 0..6 {
            let edge = (CORNERS[i + 1] - CORNERS[i]).length();
            assert!((edge - OUTER_RADIUS).abs() < 1e-4, "edge {i} was {edge}");
        }
    }

    #[test]
    fn terrace_lerp_hits_both_endpoints() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 3.0, -5.0);
        assert_eq!(terrace_lerp(a, b, 0), a);
        let end = terrace_lerp(a, b, TERRACE_STEPS);
        assert!((end - b).length() < 1e-5);
    }

    #[test]
    fn terrace_treads_are_flat() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 3.0, 0.0);
        // Y advances on odd steps only, so steps (1,2) and (3,4) pair up.
        assert_eq!(terrace_lerp(a, b, 1).y, terrace_lerp(a, b, 2).y);
        assert_eq!(terrace_lerp(a, b, 3).y, terrace_lerp(a, b, 4).y);
        assert!(terrace_lerp(a, b, 2).y < terrace_lerp(a, b, 3).y);
        assert!(terrace_lerp(a, b, 1).x < terrace_lerp(a, b, 2).x);
    }

    #[test]
    fn terrace_color_lerp_tracks_horizontal_fraction() {
        let a = Color::rgb(0.0, 0.0, 0.0);
        let b = Color::WHITE;
        assert_eq!(terrace_color_lerp(a, b, 0), a);
        let end = terrace_color_lerp(a, b, TERRACE_STEPS);
        assert!((end.r - 1.0).abs() < 1e-5);
        let one = terrace_color_lerp(a, b, 1);
        assert!((one.r - HORIZONTAL_TERRACE_STEP_SIZE).abs() < 1e-5);
    }

    #[test]
    fn edge_type_classification_is_symmetric() {
        assert_eq!(edge_type(2, 2), HexEdgeType::Flat);
        assert_eq!(edge_type(2, 3), HexEdgeType::Slope);
        assert_eq!(edge_type(3, 2), HexEdgeType::Slope);
        assert_eq!(edge_type(0, 2), HexEdgeType::Cliff);
        assert_eq!(edge_type(5, 1), HexEdgeType::Cliff);
        for a in -3..=3 {
            for b in -3..=3 {
                assert_eq!(edge_type(a, b), edge_type(b, a));
            }
        }
    }

    #[test]
    fn centered_noise_perturbs_nothing() {
        let p = Vec3::new(12.0, 7.0, -4.0);
        assert_eq!(perturb(&FlatNoise::CENTERED, p), p);
        assert_eq!(elevation_perturb_offset(&FlatNoise::CENTERED, p), 0.0);
    }

    #[test]
    fn perturb_moves_xz_but_never_y() {
        let extreme = FlatNoise(1.0);
        let p = Vec3::new(1.0, 2.0, 3.0);
        let q = perturb(&extreme, p);
        assert_eq!(q.y, p.y);
        assert!((q.x - (p.x + CELL_PERTURB_STRENGTH)).abs() < 1e-5);
        assert!((q.z - (p.z + CELL_PERTURB_STRENGTH)).abs() < 1e-5);
    }

    #[test]
    fn solid_edge_middle_sits_between_solid_corners() {
        for d in HexDirection::ALL {
            let mid = (first_solid_corner(d) + second_solid_corner(d)) * 0.5;
            assert!((solid_edge_middle(d) - mid).length() < 1e-5);
        }
    }
}
