// hexterrace_map — hexagonal terrain mesh generation library.
//
// This crate turns an editable grid of hexagonal cells (elevation, color,
// water level, rivers, roads) into renderable triangle meshes plus a
// welded physics collider. It has zero engine dependencies and can be
// tested, benchmarked, and run headless; a renderer consumes the raw
// vertex buffers in `MeshData` however it likes.
//
// Module overview:
// - `grid.rs`:        HexGrid — cell storage, edit operations, rule
//                     enforcement, and the dirty-chunk flush that drives
//                     rebuilds (serial or rayon-parallel).
// - `triangulate.rs`: Per-chunk geometry emission: fans, bridge strips,
//                     terraces, rivers, roads, water, shores, estuaries.
// - `mesh.rs`:        HexMesh accumulator + MeshData/ColliderData outputs
//                     (normals, vertex welding).
// - `chunk.rs`:       HexGridChunk — cell membership, dirty flag, and the
//                     per-layer MeshSet it owns.
// - `cell.rs`:        HexCell state and the derived surface heights.
// - `coords.rs`:      Cube coordinates and offset/world conversions.
// - `direction.rs`:   The six edge directions and their rotations.
// - `edge.rs`:        EdgeVertices — the five-point subdivided cell edge.
// - `metrics.rs`:     Every geometric constant, corner table, and the
//                     noise-driven vertex perturbation.
// - `pool.rs`:        Reusable vertex/index buffer pools for rebuilds.
// - `config.rs`:      MapConfig — map dimensions, default color, noise
//                     parameters; JSON-loadable.
// - `noise`:          Re-exported from `hexterrace_noise` — seeded fBm
//                     sampling behind the `NoiseSource` trait.
// - `types.rs`:       CellId, ChunkId, Color.
//
// **Critical constraint: determinism.** Mesh generation is a pure function
// of cell state and the noise seed: the same edits in the same order
// produce byte-identical vertex buffers, on any thread count. All
// randomness comes from the seeded noise field; no `HashMap` iteration
// order, no system time, no OS entropy reaches the geometry.

pub mod cell;
pub mod chunk;
pub mod config;
pub mod coords;
pub mod direction;
pub mod edge;
pub mod grid;
pub mod mesh;
pub mod metrics;
pub use hexterrace_noise as noise;
pub mod pool;
mod triangulate;
pub mod types;
