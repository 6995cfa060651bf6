// Mesh buffer accumulation.
//
// `HexMesh` is the transient builder a chunk rebuild writes into: it owns
// pooled working lists, applies vertex perturbation on the way in, and is
// consumed by `apply`, which copies the results into a persistent
// `MeshData` (the flat buffers a host uploads) and recomputes normals.
// Terrain meshes also produce `ColliderData`: the same triangles with
// duplicate vertices welded, which is what physics wants.
//
// Primitives come in perturbed and unperturbed flavors. Almost everything
// is perturbed; the exceptions are cliff boundary geometry (where the
// boundary point is interpolated between already-perturbed corners) and
// waterfall quads (clamped against the water surface after perturbing).
//
// Index winding: a triangle is `[0, 1, 2]`; a quad `(v1, v2, v3, v4)` is
// two triangles `[0, 2, 1]` and `[1, 2, 3]`, with v1/v2 the near edge and
// v3/v4 the far edge.
//
// See also: `pool.rs` for the working lists, `triangulate.rs` for the
// emitters, `chunk.rs` for where the applied buffers live.

use crate::metrics;
use crate::pool::{BufferPool, PooledList};
use crate::types::Color;
use glam::{Vec2, Vec3};
use hexterrace_noise::NoiseSource;
use rustc_hash::FxHashMap;

/// Flat mesh buffers ready for host upload. Channels a mesh kind does not
/// use stay empty.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub uvs: Vec<[f32; 2]>,
    pub uv2s: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Welded triangle soup for physics.
#[derive(Clone, Debug, Default)]
pub struct ColliderData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ColliderData {
    /// Weld vertices that coincide (to a 1e-3 world-unit quantum) and remap
    /// the indices. Insertion order assigns welded indices, so output is
    /// deterministic for a given input order.
    fn weld(positions: &[Vec3], indices: &[u32]) -> ColliderData {
        const INV_QUANTUM: f32 = 1.0e3;
        let mut welded: FxHashMap<[i32; 3], u32> = FxHashMap::default();
        let mut out_positions: Vec<[f32; 3]> = Vec::new();
        let mut remap: Vec<u32> = Vec::with_capacity(positions.len());
        for p in positions {
            let key = [
                (p.x * INV_QUANTUM).round() as i32,
                (p.y * INV_QUANTUM).round() as i32,
                (p.z * INV_QUANTUM).round() as i32,
            ];
            let next = out_positions.len() as u32;
            let idx = *welded.entry(key).or_insert(next);
            if idx == next {
                out_positions.push(p.to_array());
            }
            remap.push(idx);
        }
        ColliderData {
            positions: out_positions,
            indices: indices.iter().map(|&i| remap[i as usize]).collect(),
        }
    }
}

/// Which output channels a mesh fills.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshChannels {
    pub colors: bool,
    pub uvs: bool,
    pub uv2s: bool,
    pub collider: bool,
}

/// Transient mesh accumulator over pooled buffers.
pub struct HexMesh<'a> {
    noise: &'a dyn NoiseSource,
    channels: MeshChannels,
    positions: PooledList<'a, Vec3>,
    colors: PooledList<'a, Color>,
    uvs: PooledList<'a, Vec2>,
    uv2s: PooledList<'a, Vec2>,
    indices: PooledList<'a, u32>,
}

impl<'a> HexMesh<'a> {
    pub fn new(pool: &'a BufferPool, noise: &'a dyn NoiseSource, channels: MeshChannels) -> Self {
        Self {
            noise,
            channels,
            positions: pool.positions.acquire(),
            colors: pool.colors.acquire(),
            uvs: pool.uvs.acquire(),
            uv2s: pool.uvs.acquire(),
            indices: pool.indices.acquire(),
        }
    }

    pub fn add_triangle(&mut self, v1: Vec3, v2: Vec3, v3: Vec3) {
        self.add_triangle_unperturbed(
            metrics::perturb(self.noise, v1),
            metrics::perturb(self.noise, v2),
            metrics::perturb(self.noise, v3),
        );
    }

    pub fn add_triangle_unperturbed(&mut self, v1: Vec3, v2: Vec3, v3: Vec3) {
        let base = self.positions.len() as u32;
        self.positions.push(v1);
        self.positions.push(v2);
        self.positions.push(v3);
        self.indices.push(base);
        self.indices.push(base + 1);
        self.indices.push(base + 2);
    }

    pub fn add_quad(&mut self, v1: Vec3, v2: Vec3, v3: Vec3, v4: Vec3) {
        self.add_quad_unperturbed(
            metrics::perturb(self.noise, v1),
            metrics::perturb(self.noise, v2),
            metrics::perturb(self.noise, v3),
            metrics::perturb(self.noise, v4),
        );
    }

    pub fn add_quad_unperturbed(&mut self, v1: Vec3, v2: Vec3, v3: Vec3, v4: Vec3) {
        let base = self.positions.len() as u32;
        self.positions.push(v1);
        self.positions.push(v2);
        self.positions.push(v3);
        self.positions.push(v4);
        self.indices.push(base);
        self.indices.push(base + 2);
        self.indices.push(base + 1);
        self.indices.push(base + 1);
        self.indices.push(base + 2);
        self.indices.push(base + 3);
    }

    pub fn add_triangle_color(&mut self, c: Color) {
        self.add_triangle_colors(c, c, c);
    }

    pub fn add_triangle_colors(&mut self, c1: Color, c2: Color, c3: Color) {
        self.colors.push(c1);
        self.colors.push(c2);
        self.colors.push(c3);
    }

    pub fn add_quad_color(&mut self, c: Color) {
        self.add_quad_colors(c, c, c, c);
    }

    /// Near edge one color, far edge another.
    pub fn add_quad_color_pair(&mut self, c1: Color, c2: Color) {
        self.add_quad_colors(c1, c1, c2, c2);
    }

    pub fn add_quad_colors(&mut self, c1: Color, c2: Color, c3: Color, c4: Color) {
        self.colors.push(c1);
        self.colors.push(c2);
        self.colors.push(c3);
        self.colors.push(c4);
    }

    pub fn add_triangle_uv(&mut self, uv1: Vec2, uv2: Vec2, uv3: Vec2) {
        self.uvs.push(uv1);
        self.uvs.push(uv2);
        self.uvs.push(uv3);
    }

    pub fn add_quad_uv(&mut self, uv1: Vec2, uv2: Vec2, uv3: Vec2, uv4: Vec2) {
        self.uvs.push(uv1);
        self.uvs.push(uv2);
        self.uvs.push(uv3);
        self.uvs.push(uv4);
    }

    /// Axis-aligned UV rectangle over a quad: near edge gets `v_min`, far
    /// edge `v_max`.
    pub fn add_quad_uv_rect(&mut self, u_min: f32, u_max: f32, v_min: f32, v_max: f32) {
        self.add_quad_uv(
            Vec2::new(u_min, v_min),
            Vec2::new(u_max, v_min),
            Vec2::new(u_min, v_max),
            Vec2::new(u_max, v_max),
        );
    }

    pub fn add_triangle_uv2(&mut self, uv1: Vec2, uv2: Vec2, uv3: Vec2) {
        self.uv2s.push(uv1);
        self.uv2s.push(uv2);
        self.uv2s.push(uv3);
    }

    pub fn add_quad_uv2(&mut self, uv1: Vec2, uv2: Vec2, uv3: Vec2, uv4: Vec2) {
        self.uv2s.push(uv1);
        self.uv2s.push(uv2);
        self.uv2s.push(uv3);
        self.uv2s.push(uv4);
    }

    pub fn add_quad_uv2_rect(&mut self, u_min: f32, u_max: f32, v_min: f32, v_max: f32) {
        self.add_quad_uv2(
            Vec2::new(u_min, v_min),
            Vec2::new(u_max, v_min),
            Vec2::new(u_min, v_max),
            Vec2::new(u_max, v_max),
        );
    }

    /// Copy the accumulated buffers into `target`, recomputing normals.
    /// Returns welded collider data when the collider channel is on. The
    /// working lists go back to their pool as `self` drops.
    pub fn apply(self, target: &mut MeshData) -> Option<ColliderData> {
        target.positions.clear();
        target.positions.extend(self.positions.iter().map(|p| p.to_array()));
        target.indices.clear();
        target.indices.extend_from_slice(&self.indices);
        target.colors.clear();
        if self.channels.colors {
            target.colors.extend(self.colors.iter().map(|c| c.to_array()));
        }
        target.uvs.clear();
        if self.channels.uvs {
            target.uvs.extend(self.uvs.iter().map(|uv| uv.to_array()));
        }
        target.uv2s.clear();
        if self.channels.uv2s {
            target.uv2s.extend(self.uv2s.iter().map(|uv| uv.to_array()));
        }
        target.normals = compute_normals(&self.positions, &self.indices);
        self.channels
            .collider
            .then(|| ColliderData::weld(&self.positions, &self.indices))
    }
}

/// Per-vertex normals from accumulated face normals. The cross product's
/// length is twice the triangle area, so summing unnormalized face normals
/// area-weights the result.
fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let a = positions[tri[0] as usize];
        let b = positions[tri[1] as usize];
        let c = positions[tri[2] as usize];
        let face = (b - a).cross(c - a);
        normals[tri[0] as usize] += face;
        normals[tri[1] as usize] += face;
        normals[tri[2] as usize] += face;
    }
    normals
        .iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexterrace_noise::FlatNoise;

    const NO_CHANNELS: MeshChannels = MeshChannels {
        colors: false,
        uvs: false,
        uv2s: false,
        collider: false,
    };

    #[test]
    fn triangle_emits_three_vertices_in_order() {
        let pool = BufferPool::new();
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
        mesh.add_triangle(Vec3::ZERO, Vec3::new(0.0, 0.0, 8.0), Vec3::new(7.0, 0.0, 4.0));
        let mut data = MeshData::default();
        mesh.apply(&mut data);
        assert_eq!(data.positions.len(), 3);
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert_eq!(data.triangle_count(), 1);
    }

    #[test]
    fn quad_winding_splits_into_two_triangles() {
        let pool = BufferPool::new();
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
        mesh.add_quad_unperturbed(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        );
        let mut data = MeshData::default();
        mesh.apply(&mut data);
        assert_eq!(data.positions.len(), 4);
        assert_eq!(data.indices, vec![0, 2, 1, 1, 2, 3]);
    }

    #[test]
    fn centered_noise_leaves_vertices_in_place() {
        let pool = BufferPool::new();
        let v = [
            Vec3::new(3.0, 1.0, -2.0),
            Vec3::new(5.0, 1.0, 0.0),
            Vec3::new(4.0, 1.0, 2.0),
        ];
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
        mesh.add_triangle(v[0], v[1], v[2]);
        let mut data = MeshData::default();
        mesh.apply(&mut data);
        for (got, want) in data.positions.iter().zip(&v) {
            assert_eq!(*got, want.to_array());
        }
    }

    #[test]
    fn perturbation_shifts_xz_only() {
        let pool = BufferPool::new();
        let strong = FlatNoise(1.0);
        let mut mesh = HexMesh::new(&pool, &strong, NO_CHANNELS);
        mesh.add_triangle(Vec3::ZERO, Vec3::new(0.0, 2.0, 8.0), Vec3::new(7.0, 4.0, 4.0));
        let mut data = MeshData::default();
        mesh.apply(&mut data);
        // Y untouched, X and Z pushed by the full perturb strength.
        assert_eq!(data.positions[1][1], 2.0);
        assert!((data.positions[0][0] - metrics::CELL_PERTURB_STRENGTH).abs() < 1e-5);
        assert!((data.positions[1][2] - (8.0 + metrics::CELL_PERTURB_STRENGTH)).abs() < 1e-5);
    }

    #[test]
    fn flat_ground_normals_point_up() {
        let pool = BufferPool::new();
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
        // Matches the fan emission order: center, then the edge left to
        // right.
        mesh.add_triangle(Vec3::ZERO, Vec3::new(0.0, 0.0, 8.0), Vec3::new(7.0, 0.0, 4.0));
        let mut data = MeshData::default();
        mesh.apply(&mut data);
        for n in &data.normals {
            assert!((n[1] - 1.0).abs() < 1e-5, "normal was {n:?}");
        }
    }

    #[test]
    fn disabled_channels_stay_empty() {
        let pool = BufferPool::new();
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
        mesh.add_quad_unperturbed(
            Vec3::ZERO,
            Vec3::X,
            Vec3::Z,
            Vec3::new(1.0, 0.0, 1.0),
        );
        let mut data = MeshData::default();
        mesh.apply(&mut data);
        assert!(data.colors.is_empty());
        assert!(data.uvs.is_empty());
        assert!(data.uv2s.is_empty());
    }

    #[test]
    fn color_and_uv_channels_fill_per_vertex() {
        let pool = BufferPool::new();
        let channels = MeshChannels {
            colors: true,
            uvs: true,
            ..NO_CHANNELS
        };
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, channels);
        mesh.add_quad_unperturbed(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::new(1.0, 0.0, 1.0));
        mesh.add_quad_color_pair(Color::GREEN, Color::BLUE);
        mesh.add_quad_uv_rect(0.0, 1.0, 0.3, 0.5);
        let mut data = MeshData::default();
        mesh.apply(&mut data);
        assert_eq!(data.colors.len(), 4);
        assert_eq!(data.colors[0], Color::GREEN.to_array());
        assert_eq!(data.colors[1], Color::GREEN.to_array());
        assert_eq!(data.colors[2], Color::BLUE.to_array());
        assert_eq!(
            data.uvs,
            vec![[0.0, 0.3], [1.0, 0.3], [0.0, 0.5], [1.0, 0.5]]
        );
    }

    #[test]
    fn collider_welds_shared_edge_vertices() {
        let pool = BufferPool::new();
        let channels = MeshChannels {
            collider: true,
            ..NO_CHANNELS
        };
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, channels);
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 0.0, 1.0);
        let d = Vec3::new(1.0, 0.0, 1.0);
        let e = Vec3::new(0.0, 0.0, 2.0);
        let f = Vec3::new(1.0, 0.0, 2.0);
        mesh.add_quad_unperturbed(a, b, c, d);
        mesh.add_quad_unperturbed(c, d, e, f);
        let mut data = MeshData::default();
        let collider = mesh.apply(&mut data).expect("collider channel was on");
        // Eight buffered vertices, six distinct points.
        assert_eq!(data.positions.len(), 8);
        assert_eq!(collider.positions.len(), 6);
        assert_eq!(collider.indices.len(), 12);
        assert!(collider.indices.iter().all(|&i| i < 6));
    }

    #[test]
    fn apply_replaces_previous_contents() {
        let pool = BufferPool::new();
        let mut data = MeshData::default();
        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
        mesh.add_quad_unperturbed(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::ONE);
        mesh.apply(&mut data);
        assert_eq!(data.positions.len(), 4);

        let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
        mesh.add_triangle_unperturbed(Vec3::ZERO, Vec3::X, Vec3::Z);
        mesh.apply(&mut data);
        assert_eq!(data.positions.len(), 3);
        assert_eq!(data.indices.len(), 3);
    }

    #[test]
    fn working_lists_cycle_back_to_the_pool() {
        let pool = BufferPool::new();
        {
            let mut mesh = HexMesh::new(&pool, &FlatNoise::CENTERED, NO_CHANNELS);
            mesh.add_triangle_unperturbed(Vec3::ZERO, Vec3::X, Vec3::Z);
            let mut data = MeshData::default();
            mesh.apply(&mut data);
        }
        assert_eq!(pool.positions.idle(), 1);
        assert_eq!(pool.colors.idle(), 1);
        assert_eq!(pool.uvs.idle(), 2);
        assert_eq!(pool.indices.idle(), 1);
    }
}
