// Grid state and the mutation API.
//
// `HexGrid` owns every cell, the chunk table, the noise field, and the
// buffer pool. All edits go through grid methods rather than through cells
// because a change rarely stays local: elevation shifts can invalidate
// rivers and tear down roads, river endpoints live on two cells at once,
// and any of it can dirty a neighboring chunk. Each mutator applies the
// full consequence chain and marks exactly the chunks whose geometry went
// stale.
//
// Edits are lazy: nothing is rebuilt until `flush` (serial) or
// `flush_parallel` (rayon, one job per dirty chunk) hands the stale chunks
// to the triangulator.
//
// Mutators are forgiving at the boundary. An unknown id, a transition the
// terrain rules forbid (an uphill river, a road across a cliff), or a
// value a cell already has are all quiet no-ops, so hosts can forward raw
// editing input without pre-validating it.
//
// **Critical constraint: determinism.** Chunks are independent given the
// shared cell slice, which is what makes the parallel flush safe, and both
// flush paths emit identical buffers for identical state. Anything that
// varied per-rebuild here would show up as seams or flicker after edits.
//
// See also: `cell.rs` for per-cell state, `chunk.rs` for dirty tracking,
// `triangulate.rs` for the rebuild.

use crate::cell::HexCell;
use crate::chunk::HexGridChunk;
use crate::config::MapConfig;
use crate::coords::HexCoordinates;
use crate::direction::HexDirection;
use crate::metrics;
use crate::pool::BufferPool;
use crate::triangulate;
use crate::types::{CellId, ChunkId, Color};
use glam::Vec3;
use hexterrace_noise::NoiseField;
use log::debug;
use rayon::prelude::*;

pub struct HexGrid {
    cell_count_x: u32,
    cell_count_z: u32,
    cells: Vec<HexCell>,
    chunks: Vec<HexGridChunk>,
    noise: NoiseField,
    pool: BufferPool,
}

/// Wire two cells as neighbors in both directions.
fn link(cells: &mut [HexCell], from: usize, to: usize, d: HexDirection) {
    cells[from].neighbors[d.idx()] = Some(CellId(to as u32));
    cells[to].neighbors[d.opposite().idx()] = Some(CellId(from as u32));
}

impl HexGrid {
    /// Build a grid of `chunk_count_x * chunk_count_z` chunks of flat,
    /// dry cells. Every chunk starts dirty, so the first flush builds the
    /// whole map.
    ///
    /// Panics if either chunk count is zero.
    pub fn new(config: &MapConfig) -> Self {
        assert!(
            config.chunk_count_x > 0 && config.chunk_count_z > 0,
            "grid needs at least one chunk on each axis"
        );
        let cell_count_x = config.chunk_count_x * metrics::CHUNK_SIZE_X as u32;
        let cell_count_z = config.chunk_count_z * metrics::CHUNK_SIZE_Z as u32;
        let noise = NoiseField::new(config.noise);

        let chunk_capacity = metrics::CHUNK_SIZE_X * metrics::CHUNK_SIZE_Z;
        let mut chunks: Vec<HexGridChunk> = (0..config.chunk_count_x * config.chunk_count_z)
            .map(|_| HexGridChunk::new(chunk_capacity))
            .collect();

        let mut cells = Vec::with_capacity((cell_count_x * cell_count_z) as usize);
        for z in 0..cell_count_z {
            for x in 0..cell_count_x {
                let i = cells.len();
                // Odd rows shift east by half a cell, which is what packs
                // hexagons tightly.
                let mut position = Vec3::new(
                    (x as f32 + 0.5 * z as f32 - (z / 2) as f32) * (metrics::INNER_RADIUS * 2.0),
                    0.0,
                    z as f32 * (metrics::OUTER_RADIUS * 1.5),
                );
                let y_perturb = metrics::elevation_perturb_offset(&noise, position);
                position.y = y_perturb;

                let chunk_x = x as usize / metrics::CHUNK_SIZE_X;
                let chunk_z = z as usize / metrics::CHUNK_SIZE_Z;
                let chunk = ChunkId((chunk_x + chunk_z * config.chunk_count_x as usize) as u32);

                cells.push(HexCell::new(
                    HexCoordinates::from_offset(x as i32, z as i32),
                    position,
                    config.default_color,
                    chunk,
                    y_perturb,
                ));
                chunks[chunk.idx()].add_cell(CellId(i as u32));

                let width = cell_count_x as usize;
                if x > 0 {
                    link(&mut cells, i, i - 1, HexDirection::W);
                }
                if z > 0 {
                    if z % 2 == 0 {
                        link(&mut cells, i, i - width, HexDirection::SE);
                        if x > 0 {
                            link(&mut cells, i, i - width - 1, HexDirection::SW);
                        }
                    } else {
                        link(&mut cells, i, i - width, HexDirection::SW);
                        if x + 1 < cell_count_x {
                            link(&mut cells, i, i - width + 1, HexDirection::SE);
                        }
                    }
                }
            }
        }

        debug!(
            "built {cell_count_x}x{cell_count_z} cell grid across {} chunks",
            chunks.len()
        );
        Self {
            cell_count_x,
            cell_count_z,
            cells,
            chunks,
            noise,
            pool: BufferPool::new(),
        }
    }

    pub fn cell_count_x(&self) -> u32 {
        self.cell_count_x
    }

    pub fn cell_count_z(&self) -> u32 {
        self.cell_count_z
    }

    pub fn cell(&self, id: CellId) -> Option<&HexCell> {
        self.cells.get(id.idx())
    }

    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.iter()
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + use<> {
        (0..self.cells.len() as u32).map(CellId)
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&HexGridChunk> {
        self.chunks.get(id.idx())
    }

    pub fn chunks(&self) -> &[HexGridChunk] {
        &self.chunks
    }

    /// Look a cell up by hex coordinates. `None` when the coordinates fall
    /// off the map.
    pub fn cell_at(&self, coordinates: HexCoordinates) -> Option<CellId> {
        let z = coordinates.to_offset_z();
        if z < 0 || z >= self.cell_count_z as i32 {
            return None;
        }
        let x = coordinates.to_offset_x();
        if x < 0 || x >= self.cell_count_x as i32 {
            return None;
        }
        Some(CellId((x + z * self.cell_count_x as i32) as u32))
    }

    /// Look a cell up by world position, e.g. from a pointer raycast.
    pub fn cell_at_position(&self, position: Vec3) -> Option<CellId> {
        self.cell_at(HexCoordinates::from_position(position))
    }

    /// Absolute elevation difference toward a neighbor, `None` off the map
    /// edge.
    pub fn elevation_difference(&self, id: CellId, direction: HexDirection) -> Option<i32> {
        let cell = self.cells.get(id.idx())?;
        let neighbor = cell.neighbors[direction.idx()]?;
        Some((cell.elevation - self.cells[neighbor.idx()].elevation).abs())
    }

    pub fn set_color(&mut self, id: CellId, color: Color) {
        let Some(cell) = self.cells.get_mut(id.idx()) else {
            return;
        };
        if cell.color == color {
            return;
        }
        cell.color = color;
        self.refresh(id);
    }

    /// Raise or lower a cell. Beyond moving the surface this re-checks the
    /// rules that depend on height: rivers that would now flow uphill are
    /// removed, and roads over what became a cliff are torn down.
    pub fn set_elevation(&mut self, id: CellId, elevation: i32) {
        let Some(cell) = self.cells.get_mut(id.idx()) else {
            return;
        };
        if cell.elevation == elevation {
            return;
        }
        cell.elevation = elevation;
        cell.position.y = elevation as f32 * metrics::ELEVATION_STEP + cell.y_perturb;

        self.validate_rivers(id);
        for d in HexDirection::ALL {
            let steep = self.cells[id.idx()].roads[d.idx()]
                && self.elevation_difference(id, d).is_some_and(|diff| diff > 1);
            if steep {
                self.set_road_state(id, d, false);
            }
        }
        self.refresh(id);
    }

    /// Change the water surface level. Rivers touching this cell are
    /// re-validated, since submerging or draining a cell changes what
    /// counts as downhill.
    pub fn set_water_level(&mut self, id: CellId, water_level: i32) {
        let Some(cell) = self.cells.get_mut(id.idx()) else {
            return;
        };
        if cell.water_level == water_level {
            return;
        }
        cell.water_level = water_level;
        self.validate_rivers(id);
        self.refresh(id);
    }

    /// Start or redirect a river flowing out of `id` toward `direction`.
    ///
    /// No-op unless the neighbor exists and is a valid destination: rivers
    /// flow level or downhill, except that a cell drains into any neighbor
    /// whose elevation matches the cell's water level. A river claims its
    /// edge exclusively, so any road there is removed.
    pub fn set_outgoing_river(&mut self, id: CellId, direction: HexDirection) {
        let Some(cell) = self.cells.get(id.idx()) else {
            return;
        };
        if cell.outgoing_river == Some(direction) {
            return;
        }
        let Some(neighbor) = cell.neighbors[direction.idx()] else {
            return;
        };
        if !self.is_valid_river_destination(id, neighbor) {
            return;
        }

        self.remove_outgoing_river(id);
        if self.cells[id.idx()].incoming_river == Some(direction) {
            self.remove_incoming_river(id);
        }
        self.cells[id.idx()].outgoing_river = Some(direction);

        self.remove_incoming_river(neighbor);
        self.cells[neighbor.idx()].incoming_river = Some(direction.opposite());

        // Clears any road on the river's edge and refreshes both cells.
        self.set_road_state(id, direction, false);
    }

    pub fn remove_outgoing_river(&mut self, id: CellId) {
        let Some(cell) = self.cells.get_mut(id.idx()) else {
            return;
        };
        let Some(direction) = cell.outgoing_river.take() else {
            return;
        };
        self.refresh_self_only(id);
        if let Some(neighbor) = self.cells[id.idx()].neighbors[direction.idx()] {
            self.cells[neighbor.idx()].incoming_river = None;
            self.refresh_self_only(neighbor);
        }
    }

    pub fn remove_incoming_river(&mut self, id: CellId) {
        let Some(cell) = self.cells.get_mut(id.idx()) else {
            return;
        };
        let Some(direction) = cell.incoming_river.take() else {
            return;
        };
        self.refresh_self_only(id);
        if let Some(neighbor) = self.cells[id.idx()].neighbors[direction.idx()] {
            self.cells[neighbor.idx()].outgoing_river = None;
            self.refresh_self_only(neighbor);
        }
    }

    pub fn remove_river(&mut self, id: CellId) {
        self.remove_outgoing_river(id);
        self.remove_incoming_river(id);
    }

    /// Lay a road across the edge toward `direction`. Roads refuse edges
    /// that carry a river, cross more than one elevation level, or lead
    /// off the map.
    pub fn add_road(&mut self, id: CellId, direction: HexDirection) {
        let Some(cell) = self.cells.get(id.idx()) else {
            return;
        };
        if cell.roads[direction.idx()] || cell.has_river_through_edge(direction) {
            return;
        }
        let Some(difference) = self.elevation_difference(id, direction) else {
            return;
        };
        if difference > 1 {
            return;
        }
        self.set_road_state(id, direction, true);
    }

    pub fn remove_roads(&mut self, id: CellId) {
        let Some(cell) = self.cells.get(id.idx()) else {
            return;
        };
        let roads = cell.roads;
        for d in HexDirection::ALL {
            if roads[d.idx()] {
                self.set_road_state(id, d, false);
            }
        }
    }

    /// Rivers flow level or downhill; a cell may also drain into a
    /// neighbor whose surface its own water reaches.
    fn is_valid_river_destination(&self, source: CellId, destination: CellId) -> bool {
        let source = &self.cells[source.idx()];
        let destination = &self.cells[destination.idx()];
        source.elevation >= destination.elevation || source.water_level == destination.elevation
    }

    /// Drop whichever of the cell's river endpoints the current elevations
    /// no longer permit.
    fn validate_rivers(&mut self, id: CellId) {
        let cell = &self.cells[id.idx()];
        if let Some(direction) = cell.outgoing_river {
            let destination = cell.neighbors[direction.idx()];
            if !destination.is_some_and(|n| self.is_valid_river_destination(id, n)) {
                self.remove_outgoing_river(id);
            }
        }
        let cell = &self.cells[id.idx()];
        if let Some(direction) = cell.incoming_river {
            let source = cell.neighbors[direction.idx()];
            if !source.is_some_and(|n| self.is_valid_river_destination(n, id)) {
                self.remove_incoming_river(id);
            }
        }
    }

    /// Roads live on both sides of an edge at once.
    fn set_road_state(&mut self, id: CellId, direction: HexDirection, state: bool) {
        self.cells[id.idx()].roads[direction.idx()] = state;
        if let Some(neighbor) = self.cells[id.idx()].neighbors[direction.idx()] {
            self.cells[neighbor.idx()].roads[direction.opposite().idx()] = state;
            self.refresh_self_only(neighbor);
        }
        self.refresh_self_only(id);
    }

    /// Mark the cell's chunk stale, plus any neighboring chunk whose
    /// border geometry blends with this cell.
    fn refresh(&mut self, id: CellId) {
        let cell = &self.cells[id.idx()];
        let chunk = cell.chunk;
        let neighbors = cell.neighbors;
        self.chunks[chunk.idx()].mark_dirty();
        for neighbor in neighbors.into_iter().flatten() {
            let neighbor_chunk = self.cells[neighbor.idx()].chunk;
            if neighbor_chunk != chunk {
                self.chunks[neighbor_chunk.idx()].mark_dirty();
            }
        }
    }

    fn refresh_self_only(&mut self, id: CellId) {
        let chunk = self.cells[id.idx()].chunk;
        self.chunks[chunk.idx()].mark_dirty();
    }

    /// Rebuild every dirty chunk in index order. Returns how many were
    /// rebuilt.
    pub fn flush(&mut self) -> usize {
        let Self {
            ref cells,
            ref mut chunks,
            ref noise,
            ref pool,
            ..
        } = *self;
        let mut rebuilt = 0;
        for chunk in chunks.iter_mut() {
            if chunk.take_dirty() {
                triangulate::rebuild(cells, noise, pool, chunk);
                rebuilt += 1;
            }
        }
        debug!("flush rebuilt {rebuilt} of {} chunks", chunks.len());
        rebuilt
    }

    /// Rebuild every dirty chunk, one rayon job per chunk. Produces the
    /// same buffers as `flush`.
    pub fn flush_parallel(&mut self) -> usize {
        let Self {
            ref cells,
            ref mut chunks,
            ref noise,
            ref pool,
            ..
        } = *self;
        let rebuilt = chunks
            .par_iter_mut()
            .map(|chunk| {
                if chunk.take_dirty() {
                    triangulate::rebuild(cells, noise, pool, chunk);
                    1
                } else {
                    0
                }
            })
            .sum();
        debug!("parallel flush rebuilt {rebuilt} of {} chunks", chunks.len());
        rebuilt
    }
}
