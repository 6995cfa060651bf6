// Per-cell state.
//
// A `HexCell` is plain data in the grid's arena: terrain attributes, river
// endpoints, road flags, and neighbor links by id. Cells expose read-only
// accessors; every mutation goes through `HexGrid`, which is what enforces
// the cross-cell invariants (river flow rules, road/river exclusion,
// symmetric links) and marks chunks dirty.
//
// Heights are derived, not stored: the stream bed, river surface, and water
// surface are fixed offsets from the cell's elevation or water level, so
// they can never fall out of sync with it.
//
// See also: `grid.rs` for the mutation API, `triangulate.rs` for the
// consumer of the derived heights.

use crate::coords::HexCoordinates;
use crate::direction::HexDirection;
use crate::metrics;
use crate::types::{CellId, ChunkId, Color};
use glam::Vec3;

#[derive(Clone, Debug)]
pub struct HexCell {
    pub(crate) coordinates: HexCoordinates,
    /// World center. X and Z come straight from the layout; Y is
    /// `elevation * ELEVATION_STEP + y_perturb`.
    pub(crate) position: Vec3,
    pub(crate) color: Color,
    pub(crate) elevation: i32,
    pub(crate) water_level: i32,
    pub(crate) incoming_river: Option<HexDirection>,
    pub(crate) outgoing_river: Option<HexDirection>,
    pub(crate) roads: [bool; 6],
    pub(crate) neighbors: [Option<CellId>; 6],
    pub(crate) chunk: ChunkId,
    /// Noise-derived Y offset, fixed at construction (it depends only on
    /// the cell's XZ position).
    pub(crate) y_perturb: f32,
}

impl HexCell {
    pub(crate) fn new(
        coordinates: HexCoordinates,
        position: Vec3,
        color: Color,
        chunk: ChunkId,
        y_perturb: f32,
    ) -> Self {
        Self {
            coordinates,
            position,
            color,
            elevation: 0,
            water_level: 0,
            incoming_river: None,
            outgoing_river: None,
            roads: [false; 6],
            neighbors: [None; 6],
            chunk,
            y_perturb,
        }
    }

    pub fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    pub fn water_level(&self) -> i32 {
        self.water_level
    }

    pub fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    pub fn neighbor(&self, d: HexDirection) -> Option<CellId> {
        self.neighbors[d.idx()]
    }

    pub fn chunk(&self) -> ChunkId {
        self.chunk
    }

    pub fn incoming_river(&self) -> Option<HexDirection> {
        self.incoming_river
    }

    pub fn outgoing_river(&self) -> Option<HexDirection> {
        self.outgoing_river
    }

    pub fn has_river(&self) -> bool {
        self.incoming_river.is_some() || self.outgoing_river.is_some()
    }

    /// True when a river starts or ends here (exactly one endpoint set).
    pub fn has_river_begin_or_end(&self) -> bool {
        self.incoming_river.is_some() != self.outgoing_river.is_some()
    }

    /// The sole river direction of a begin/end cell; `None` when the cell
    /// has no river or the river passes through.
    pub fn river_begin_or_end_direction(&self) -> Option<HexDirection> {
        if self.has_river_begin_or_end() {
            self.incoming_river.or(self.outgoing_river)
        } else {
            None
        }
    }

    pub fn has_river_through_edge(&self, d: HexDirection) -> bool {
        self.incoming_river == Some(d) || self.outgoing_river == Some(d)
    }

    pub fn has_roads(&self) -> bool {
        self.roads.iter().any(|&road| road)
    }

    pub fn has_road_through_edge(&self, d: HexDirection) -> bool {
        self.roads[d.idx()]
    }

    /// Y of the channel floor a river carves through this cell.
    pub fn stream_bed_y(&self) -> f32 {
        (self.elevation as f32 + metrics::STREAM_BED_ELEVATION_OFFSET) * metrics::ELEVATION_STEP
    }

    /// Y of a river's surface while crossing this cell.
    pub fn river_surface_y(&self) -> f32 {
        (self.elevation as f32 + metrics::WATER_ELEVATION_OFFSET) * metrics::ELEVATION_STEP
    }

    /// Y of standing water over this cell.
    pub fn water_surface_y(&self) -> f32 {
        (self.water_level as f32 + metrics::WATER_ELEVATION_OFFSET) * metrics::ELEVATION_STEP
    }
}
