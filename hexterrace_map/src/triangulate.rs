// Chunk triangulation.
//
// One rebuild walks every cell of a chunk and, for each of its six
// directions, emits a sector of geometry into the layer meshes: the inner
// hexagon fan, the bridge strip and corner shared with neighbors (owned by
// one side only so seams are stitched exactly once), river channels and
// surfaces, road overlays, and the water surface with its shore and
// estuary trim. Which shape a sector takes is decided entirely by the
// local cell state: rivers bend the cell center and carve the edge middle
// down to the stream bed, roads pull toward their edges, terraced slopes
// subdivide, cliffs meet terraces along an interpolated boundary.
//
// Ownership rule for shared geometry: a cell emits the bridge toward NE,
// E and SE, and the corner triangle touching its NE and E neighbors. The
// opposite directions are the neighbors' responsibility.
//
// **Critical constraint: determinism.** Sector order, emission order
// within a sector, and every interpolation here must depend only on cell
// state, never on rebuild order or thread, so a chunk rebuilt for the
// same state always produces byte-identical buffers.
//
// See also: `mesh.rs` for the buffer accumulator, `metrics.rs` for the
// geometry constants, `grid.rs` for when rebuilds happen.

use crate::cell::HexCell;
use crate::chunk::{HexGridChunk, MeshSet};
use crate::direction::HexDirection;
use crate::edge::EdgeVertices;
use crate::mesh::{HexMesh, MeshChannels};
use crate::metrics::{self, HexEdgeType};
use crate::pool::BufferPool;
use crate::types::Color;
use glam::{Vec2, Vec3};
use hexterrace_noise::NoiseSource;

const TERRAIN_CHANNELS: MeshChannels = MeshChannels {
    colors: true,
    uvs: false,
    uv2s: false,
    collider: true,
};
const UV_CHANNELS: MeshChannels = MeshChannels {
    colors: false,
    uvs: true,
    uv2s: false,
    collider: false,
};
const PLAIN_CHANNELS: MeshChannels = MeshChannels {
    colors: false,
    uvs: false,
    uv2s: false,
    collider: false,
};
const ESTUARY_CHANNELS: MeshChannels = MeshChannels {
    colors: false,
    uvs: true,
    uv2s: true,
    collider: false,
};

/// Rebuild a chunk's meshes from current cell state.
pub(crate) fn rebuild(
    cells: &[HexCell],
    noise: &dyn NoiseSource,
    pool: &BufferPool,
    chunk: &mut HexGridChunk,
) {
    let mut triangulator = Triangulator::new(cells, noise, pool);
    for &id in chunk.cells() {
        triangulator.triangulate_cell(&cells[id.idx()]);
    }
    triangulator.apply(chunk.meshes_mut());
}

/// Road widths inside a sector: half the edge when the road crosses it,
/// narrower when the road only brushes past toward an adjacent sector.
fn road_interpolators(direction: HexDirection, cell: &HexCell) -> Vec2 {
    if cell.has_road_through_edge(direction) {
        Vec2::splat(0.5)
    } else {
        Vec2::new(
            if cell.has_road_through_edge(direction.previous()) {
                0.5
            } else {
                0.25
            },
            if cell.has_road_through_edge(direction.next()) {
                0.5
            } else {
                0.25
            },
        )
    }
}

struct Triangulator<'a> {
    cells: &'a [HexCell],
    noise: &'a dyn NoiseSource,
    terrain: HexMesh<'a>,
    rivers: HexMesh<'a>,
    roads: HexMesh<'a>,
    water: HexMesh<'a>,
    water_shore: HexMesh<'a>,
    estuaries: HexMesh<'a>,
}

impl<'a> Triangulator<'a> {
    fn new(cells: &'a [HexCell], noise: &'a dyn NoiseSource, pool: &'a BufferPool) -> Self {
        Self {
            cells,
            noise,
            terrain: HexMesh::new(pool, noise, TERRAIN_CHANNELS),
            rivers: HexMesh::new(pool, noise, UV_CHANNELS),
            roads: HexMesh::new(pool, noise, UV_CHANNELS),
            water: HexMesh::new(pool, noise, PLAIN_CHANNELS),
            water_shore: HexMesh::new(pool, noise, UV_CHANNELS),
            estuaries: HexMesh::new(pool, noise, ESTUARY_CHANNELS),
        }
    }

    /// Borrow a cell for the full rebuild, independent of `&mut self`.
    fn cell(&self, id: crate::types::CellId) -> &'a HexCell {
        &self.cells[id.idx()]
    }

    fn apply(self, meshes: &mut MeshSet) {
        let Triangulator {
            terrain,
            rivers,
            roads,
            water,
            water_shore,
            estuaries,
            ..
        } = self;
        meshes.terrain_collider = terrain.apply(&mut meshes.terrain).unwrap_or_default();
        rivers.apply(&mut meshes.rivers);
        roads.apply(&mut meshes.roads);
        water.apply(&mut meshes.water);
        water_shore.apply(&mut meshes.water_shore);
        estuaries.apply(&mut meshes.estuaries);
    }

    fn triangulate_cell(&mut self, cell: &HexCell) {
        for direction in HexDirection::ALL {
            self.triangulate_sector(direction, cell);
        }
    }

    fn triangulate_sector(&mut self, direction: HexDirection, cell: &HexCell) {
        let center = cell.position();
        let mut e = EdgeVertices::new(
            center + metrics::first_solid_corner(direction),
            center + metrics::second_solid_corner(direction),
        );

        if cell.has_river() {
            if cell.has_river_through_edge(direction) {
                e.v3.y = cell.stream_bed_y();
                if cell.has_river_begin_or_end() {
                    self.triangulate_with_river_begin_or_end(cell, center, e);
                } else {
                    self.triangulate_with_river(direction, cell, center, e);
                }
            } else {
                self.triangulate_adjacent_to_river(direction, cell, center, e);
            }
        } else {
            self.triangulate_without_river(direction, cell, center, e);
        }

        if direction <= HexDirection::SE {
            self.triangulate_connection(direction, cell, e);
        }

        if cell.is_underwater() {
            self.triangulate_water(direction, cell, center);
        }
    }

    /// Plain sector: a fan to the solid edge, plus the road overlay when
    /// the cell has roads.
    fn triangulate_without_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        center: Vec3,
        e: EdgeVertices,
    ) {
        self.triangulate_edge_fan(center, e, cell.color());
        if cell.has_roads() {
            let interpolators = road_interpolators(direction, cell);
            self.triangulate_road(
                center,
                center.lerp(e.v1, interpolators.x),
                center.lerp(e.v5, interpolators.y),
                e,
                cell.has_road_through_edge(direction),
            );
        }
    }

    /// Sector the river crosses, in a cell the river passes through. The
    /// center stretches into a line perpendicular to the flow so the
    /// channel keeps its width while turning.
    fn triangulate_with_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        mut center: Vec3,
        e: EdgeVertices,
    ) {
        let (center_l, center_r) = if cell.has_river_through_edge(direction.opposite()) {
            (
                center + metrics::first_solid_corner(direction.previous()) * 0.25,
                center + metrics::second_solid_corner(direction.next()) * 0.25,
            )
        } else if cell.has_river_through_edge(direction.next()) {
            (center, center.lerp(e.v5, 2.0 / 3.0))
        } else if cell.has_river_through_edge(direction.previous()) {
            (center.lerp(e.v1, 2.0 / 3.0), center)
        } else if cell.has_river_through_edge(direction.next2()) {
            (
                center,
                center
                    + metrics::solid_edge_middle(direction.next())
                        * (0.5 * metrics::INNER_TO_OUTER),
            )
        } else {
            (
                center
                    + metrics::solid_edge_middle(direction.previous())
                        * (0.5 * metrics::INNER_TO_OUTER),
                center,
            )
        };
        center = center_l.lerp(center_r, 0.5);

        let mut m = EdgeVertices::with_outer_step(
            center_l.lerp(e.v1, 0.5),
            center_r.lerp(e.v5, 0.5),
            1.0 / 6.0,
        );
        m.v3.y = e.v3.y;
        center.y = e.v3.y;

        self.triangulate_edge_strip(m, cell.color(), e, cell.color(), false);

        self.terrain.add_triangle(center_l, m.v1, m.v2);
        self.terrain.add_triangle_color(cell.color());
        self.terrain.add_quad(center_l, center, m.v2, m.v3);
        self.terrain.add_quad_color(cell.color());
        self.terrain.add_quad(center, center_r, m.v3, m.v4);
        self.terrain.add_quad_color(cell.color());
        self.terrain.add_triangle(center_r, m.v4, m.v5);
        self.terrain.add_triangle_color(cell.color());

        if !cell.is_underwater() {
            let reversed = cell.incoming_river() == Some(direction);
            let y = cell.river_surface_y();
            self.triangulate_river_quad(center_l, center_r, m.v2, m.v4, y, y, 0.4, reversed);
            self.triangulate_river_quad(m.v2, m.v4, e.v2, e.v4, y, y, 0.6, reversed);
        }
    }

    /// Sector where a river begins or ends: a shortened channel capped by
    /// a triangle at the cell center.
    fn triangulate_with_river_begin_or_end(
        &mut self,
        cell: &HexCell,
        mut center: Vec3,
        e: EdgeVertices,
    ) {
        let mut m = EdgeVertices::new(center.lerp(e.v1, 0.5), center.lerp(e.v5, 0.5));
        m.v3.y = e.v3.y;
        self.triangulate_edge_strip(m, cell.color(), e, cell.color(), false);
        self.triangulate_edge_fan(center, m, cell.color());

        if !cell.is_underwater() {
            let reversed = cell.incoming_river().is_some();
            let y = cell.river_surface_y();
            self.triangulate_river_quad(m.v2, m.v4, e.v2, e.v4, y, y, 0.6, reversed);
            center.y = y;
            m.v2.y = y;
            m.v4.y = y;
            self.rivers.add_triangle(center, m.v2, m.v4);
            if reversed {
                self.rivers.add_triangle_uv(
                    Vec2::new(0.5, 0.4),
                    Vec2::new(1.0, 0.2),
                    Vec2::new(0.0, 0.2),
                );
            } else {
                self.rivers.add_triangle_uv(
                    Vec2::new(0.5, 0.4),
                    Vec2::new(0.0, 0.6),
                    Vec2::new(1.0, 0.6),
                );
            }
        }
    }

    /// Sector of a river cell the river does not cross. The center shifts
    /// away from the channel so the fan does not poke into it.
    fn triangulate_adjacent_to_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        mut center: Vec3,
        e: EdgeVertices,
    ) {
        if cell.has_roads() {
            self.triangulate_road_adjacent_to_river(direction, cell, center, e);
        }

        if cell.has_river_through_edge(direction.next()) {
            if cell.has_river_through_edge(direction.previous()) {
                center +=
                    metrics::solid_edge_middle(direction) * (metrics::INNER_TO_OUTER * 0.5);
            } else if cell.has_river_through_edge(direction.previous2()) {
                center += metrics::first_solid_corner(direction) * 0.25;
            }
        } else if cell.has_river_through_edge(direction.previous())
            && cell.has_river_through_edge(direction.next2())
        {
            center += metrics::second_solid_corner(direction) * 0.25;
        }

        let m = EdgeVertices::new(center.lerp(e.v1, 0.5), center.lerp(e.v5, 0.5));
        self.triangulate_edge_strip(m, cell.color(), e, cell.color(), false);
        self.triangulate_edge_fan(center, m, cell.color());
    }

    /// Road overlay in a sector of a river cell. The road center dodges
    /// the channel, and sectors the road never reaches are pruned rather
    /// than drawn into the water.
    fn triangulate_road_adjacent_to_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        mut center: Vec3,
        e: EdgeVertices,
    ) {
        let has_road_through_edge = cell.has_road_through_edge(direction);
        let previous_has_river = cell.has_river_through_edge(direction.previous());
        let next_has_river = cell.has_river_through_edge(direction.next());
        let interpolators = road_interpolators(direction, cell);
        let mut road_center = center;

        if let Some(end_direction) = cell.river_begin_or_end_direction() {
            road_center += metrics::solid_edge_middle(end_direction.opposite()) * (1.0 / 3.0);
        } else if let (Some(incoming), Some(outgoing)) =
            (cell.incoming_river(), cell.outgoing_river())
        {
            if incoming == outgoing.opposite() {
                // Straight channel; hug whichever bank this sector is on.
                let corner = if previous_has_river {
                    if !has_road_through_edge
                        && !cell.has_road_through_edge(direction.next())
                    {
                        return;
                    }
                    metrics::second_solid_corner(direction)
                } else {
                    if !has_road_through_edge
                        && !cell.has_road_through_edge(direction.previous())
                    {
                        return;
                    }
                    metrics::first_solid_corner(direction)
                };
                road_center += corner * 0.5;
                center += corner * 0.25;
            } else if incoming == outgoing.previous() {
                road_center -= metrics::second_corner(incoming) * 0.2;
            } else if incoming == outgoing.next() {
                road_center -= metrics::first_corner(incoming) * 0.2;
            } else if previous_has_river && next_has_river {
                // Inside of a curved channel.
                if !has_road_through_edge {
                    return;
                }
                let offset = metrics::solid_edge_middle(direction) * metrics::INNER_TO_OUTER;
                road_center += offset * 0.7;
                center += offset * 0.5;
            } else {
                // Outside of the curve.
                let middle = if previous_has_river {
                    direction.next()
                } else if next_has_river {
                    direction.previous()
                } else {
                    direction
                };
                if !cell.has_road_through_edge(middle)
                    && !cell.has_road_through_edge(middle.previous())
                    && !cell.has_road_through_edge(middle.next())
                {
                    return;
                }
                road_center += metrics::solid_edge_middle(middle) * 0.25;
            }
        }

        let ml = road_center.lerp(e.v1, interpolators.x);
        let mr = road_center.lerp(e.v5, interpolators.y);
        self.triangulate_road(road_center, ml, mr, e, has_road_through_edge);
        if previous_has_river {
            self.triangulate_road_edge(road_center, center, ml);
        }
        if next_has_river {
            self.triangulate_road_edge(road_center, mr, center);
        }
    }

    /// Bridge strip, river/waterfall surface, and owned corner toward one
    /// forward neighbor.
    fn triangulate_connection(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        e1: EdgeVertices,
    ) {
        let Some(neighbor_id) = cell.neighbor(direction) else {
            return;
        };
        let neighbor = self.cell(neighbor_id);

        let mut bridge = metrics::bridge(direction);
        bridge.y = neighbor.position().y - cell.position().y;
        let mut e2 = EdgeVertices::new(e1.v1 + bridge, e1.v5 + bridge);

        if cell.has_river_through_edge(direction) {
            e2.v3.y = neighbor.stream_bed_y();
            if !cell.is_underwater() {
                if !neighbor.is_underwater() {
                    self.triangulate_river_quad(
                        e1.v2,
                        e1.v4,
                        e2.v2,
                        e2.v4,
                        cell.river_surface_y(),
                        neighbor.river_surface_y(),
                        0.8,
                        cell.incoming_river() == Some(direction),
                    );
                } else if cell.elevation() > neighbor.water_level() {
                    self.triangulate_waterfall_in_water(
                        e1.v2,
                        e1.v4,
                        e2.v2,
                        e2.v4,
                        cell.river_surface_y(),
                        neighbor.river_surface_y(),
                        neighbor.water_surface_y(),
                    );
                }
            } else if !neighbor.is_underwater() && neighbor.elevation() > cell.water_level() {
                self.triangulate_waterfall_in_water(
                    e2.v4,
                    e2.v2,
                    e1.v4,
                    e1.v2,
                    neighbor.river_surface_y(),
                    cell.river_surface_y(),
                    cell.water_surface_y(),
                );
            }
        }

        if metrics::edge_type(cell.elevation(), neighbor.elevation()) == HexEdgeType::Slope {
            self.triangulate_edge_terraces(
                e1,
                cell,
                e2,
                neighbor,
                cell.has_road_through_edge(direction),
            );
        } else {
            self.triangulate_edge_strip(
                e1,
                cell.color(),
                e2,
                neighbor.color(),
                cell.has_road_through_edge(direction),
            );
        }

        if direction <= HexDirection::E {
            if let Some(next_id) = cell.neighbor(direction.next()) {
                let next_neighbor = self.cell(next_id);
                let mut v5 = e1.v5 + metrics::bridge(direction.next());
                v5.y = next_neighbor.position().y;

                // Rotate so the lowest cell sits at the bottom of the
                // corner; ties go to the cell itself, then the neighbor.
                if cell.elevation() <= neighbor.elevation() {
                    if cell.elevation() <= next_neighbor.elevation() {
                        self.triangulate_corner(e1.v5, cell, e2.v5, neighbor, v5, next_neighbor);
                    } else {
                        self.triangulate_corner(v5, next_neighbor, e1.v5, cell, e2.v5, neighbor);
                    }
                } else if neighbor.elevation() <= next_neighbor.elevation() {
                    self.triangulate_corner(e2.v5, neighbor, v5, next_neighbor, e1.v5, cell);
                } else {
                    self.triangulate_corner(v5, next_neighbor, e1.v5, cell, e2.v5, neighbor);
                }
            }
        }
    }

    /// A sloped bridge becomes a run of terrace strips.
    fn triangulate_edge_terraces(
        &mut self,
        begin: EdgeVertices,
        begin_cell: &HexCell,
        end: EdgeVertices,
        end_cell: &HexCell,
        has_road: bool,
    ) {
        let mut e2 = EdgeVertices::terrace_lerp(begin, end, 1);
        let mut c2 = metrics::terrace_color_lerp(begin_cell.color(), end_cell.color(), 1);
        self.triangulate_edge_strip(begin, begin_cell.color(), e2, c2, has_road);
        for step in 2..metrics::TERRACE_STEPS {
            let e1 = e2;
            let c1 = c2;
            e2 = EdgeVertices::terrace_lerp(begin, end, step);
            c2 = metrics::terrace_color_lerp(begin_cell.color(), end_cell.color(), step);
            self.triangulate_edge_strip(e1, c1, e2, c2, has_road);
        }
        self.triangulate_edge_strip(e2, c2, end, end_cell.color(), has_road);
    }

    /// The triangle where three cells meet, dispatched on how the two
    /// upper cells relate to the bottom one.
    fn triangulate_corner(
        &mut self,
        bottom: Vec3,
        bottom_cell: &HexCell,
        left: Vec3,
        left_cell: &HexCell,
        right: Vec3,
        right_cell: &HexCell,
    ) {
        let left_edge = metrics::edge_type(bottom_cell.elevation(), left_cell.elevation());
        let right_edge = metrics::edge_type(bottom_cell.elevation(), right_cell.elevation());

        if left_edge == HexEdgeType::Slope {
            if right_edge == HexEdgeType::Slope {
                self.triangulate_corner_terraces(
                    bottom,
                    bottom_cell,
                    left,
                    left_cell,
                    right,
                    right_cell,
                );
            } else if right_edge == HexEdgeType::Flat {
                self.triangulate_corner_terraces(
                    left, left_cell, right, right_cell, bottom, bottom_cell,
                );
            } else {
                self.triangulate_corner_terraces_cliff(
                    bottom,
                    bottom_cell,
                    left,
                    left_cell,
                    right,
                    right_cell,
                );
            }
        } else if right_edge == HexEdgeType::Slope {
            if left_edge == HexEdgeType::Flat {
                self.triangulate_corner_terraces(
                    right, right_cell, bottom, bottom_cell, left, left_cell,
                );
            } else {
                self.triangulate_corner_cliff_terraces(
                    bottom,
                    bottom_cell,
                    left,
                    left_cell,
                    right,
                    right_cell,
                );
            }
        } else if metrics::edge_type(left_cell.elevation(), right_cell.elevation())
            == HexEdgeType::Slope
        {
            // Cliffs below, a slope bridging the two upper cells.
            if left_cell.elevation() < right_cell.elevation() {
                self.triangulate_corner_cliff_terraces(
                    right, right_cell, bottom, bottom_cell, left, left_cell,
                );
            } else {
                self.triangulate_corner_terraces_cliff(
                    left, left_cell, right, right_cell, bottom, bottom_cell,
                );
            }
        } else {
            self.terrain.add_triangle(bottom, left, right);
            self.terrain.add_triangle_colors(
                bottom_cell.color(),
                left_cell.color(),
                right_cell.color(),
            );
        }
    }

    /// Corner where both upper edges terrace: a triangle at the bottom,
    /// then widening quads.
    fn triangulate_corner_terraces(
        &mut self,
        begin: Vec3,
        begin_cell: &HexCell,
        left: Vec3,
        left_cell: &HexCell,
        right: Vec3,
        right_cell: &HexCell,
    ) {
        let mut v3 = metrics::terrace_lerp(begin, left, 1);
        let mut v4 = metrics::terrace_lerp(begin, right, 1);
        let mut c3 = metrics::terrace_color_lerp(begin_cell.color(), left_cell.color(), 1);
        let mut c4 = metrics::terrace_color_lerp(begin_cell.color(), right_cell.color(), 1);

        self.terrain.add_triangle(begin, v3, v4);
        self.terrain.add_triangle_colors(begin_cell.color(), c3, c4);

        for step in 2..metrics::TERRACE_STEPS {
            let v1 = v3;
            let v2 = v4;
            let c1 = c3;
            let c2 = c4;
            v3 = metrics::terrace_lerp(begin, left, step);
            v4 = metrics::terrace_lerp(begin, right, step);
            c3 = metrics::terrace_color_lerp(begin_cell.color(), left_cell.color(), step);
            c4 = metrics::terrace_color_lerp(begin_cell.color(), right_cell.color(), step);
            self.terrain.add_quad(v1, v2, v3, v4);
            self.terrain.add_quad_colors(c1, c2, c3, c4);
        }

        self.terrain.add_quad(v3, v4, left, right);
        self.terrain
            .add_quad_colors(c3, c4, left_cell.color(), right_cell.color());
    }

    /// Corner where terraces on the left meet a cliff on the right. The
    /// terraces collapse onto a boundary point partway up the cliff.
    fn triangulate_corner_terraces_cliff(
        &mut self,
        begin: Vec3,
        begin_cell: &HexCell,
        left: Vec3,
        left_cell: &HexCell,
        right: Vec3,
        right_cell: &HexCell,
    ) {
        let mut b = 1.0 / (right_cell.elevation() - begin_cell.elevation()) as f32;
        if b < 0.0 {
            b = -b;
        }
        let boundary = metrics::perturb(self.noise, begin)
            .lerp(metrics::perturb(self.noise, right), b);
        let boundary_color = begin_cell.color().lerp(right_cell.color(), b);

        self.triangulate_boundary_triangle(
            begin,
            begin_cell,
            left,
            left_cell,
            boundary,
            boundary_color,
        );

        if metrics::edge_type(left_cell.elevation(), right_cell.elevation()) == HexEdgeType::Slope
        {
            self.triangulate_boundary_triangle(
                left,
                left_cell,
                right,
                right_cell,
                boundary,
                boundary_color,
            );
        } else {
            self.terrain.add_triangle_unperturbed(
                metrics::perturb(self.noise, left),
                metrics::perturb(self.noise, right),
                boundary,
            );
            self.terrain.add_triangle_colors(
                left_cell.color(),
                right_cell.color(),
                boundary_color,
            );
        }
    }

    /// Mirror case: cliff on the left, terraces on the right.
    fn triangulate_corner_cliff_terraces(
        &mut self,
        begin: Vec3,
        begin_cell: &HexCell,
        left: Vec3,
        left_cell: &HexCell,
        right: Vec3,
        right_cell: &HexCell,
    ) {
        let mut b = 1.0 / (left_cell.elevation() - begin_cell.elevation()) as f32;
        if b < 0.0 {
            b = -b;
        }
        let boundary = metrics::perturb(self.noise, begin)
            .lerp(metrics::perturb(self.noise, left), b);
        let boundary_color = begin_cell.color().lerp(left_cell.color(), b);

        self.triangulate_boundary_triangle(
            right,
            right_cell,
            begin,
            begin_cell,
            boundary,
            boundary_color,
        );

        if metrics::edge_type(left_cell.elevation(), right_cell.elevation()) == HexEdgeType::Slope
        {
            self.triangulate_boundary_triangle(
                left,
                left_cell,
                right,
                right_cell,
                boundary,
                boundary_color,
            );
        } else {
            self.terrain.add_triangle_unperturbed(
                metrics::perturb(self.noise, left),
                metrics::perturb(self.noise, right),
                boundary,
            );
            self.terrain.add_triangle_colors(
                left_cell.color(),
                right_cell.color(),
                boundary_color,
            );
        }
    }

    /// Terrace fan against a fixed boundary point. The boundary is already
    /// perturbed, so every triangle goes in unperturbed with explicitly
    /// perturbed terrace points; otherwise the cliff face would tear.
    fn triangulate_boundary_triangle(
        &mut self,
        begin: Vec3,
        begin_cell: &HexCell,
        left: Vec3,
        left_cell: &HexCell,
        boundary: Vec3,
        boundary_color: Color,
    ) {
        let mut v2 = metrics::perturb(self.noise, metrics::terrace_lerp(begin, left, 1));
        let mut c2 = metrics::terrace_color_lerp(begin_cell.color(), left_cell.color(), 1);

        self.terrain
            .add_triangle_unperturbed(metrics::perturb(self.noise, begin), v2, boundary);
        self.terrain
            .add_triangle_colors(begin_cell.color(), c2, boundary_color);

        for step in 2..metrics::TERRACE_STEPS {
            let v1 = v2;
            let c1 = c2;
            v2 = metrics::perturb(self.noise, metrics::terrace_lerp(begin, left, step));
            c2 = metrics::terrace_color_lerp(begin_cell.color(), left_cell.color(), step);
            self.terrain.add_triangle_unperturbed(v1, v2, boundary);
            self.terrain.add_triangle_colors(c1, c2, boundary_color);
        }

        self.terrain.add_triangle_unperturbed(
            v2,
            metrics::perturb(self.noise, left),
            boundary,
        );
        self.terrain
            .add_triangle_colors(c2, left_cell.color(), boundary_color);
    }

    fn triangulate_edge_fan(&mut self, center: Vec3, edge: EdgeVertices, color: Color) {
        self.terrain.add_triangle(center, edge.v1, edge.v2);
        self.terrain.add_triangle_color(color);
        self.terrain.add_triangle(center, edge.v2, edge.v3);
        self.terrain.add_triangle_color(color);
        self.terrain.add_triangle(center, edge.v3, edge.v4);
        self.terrain.add_triangle_color(color);
        self.terrain.add_triangle(center, edge.v4, edge.v5);
        self.terrain.add_triangle_color(color);
    }

    fn triangulate_edge_strip(
        &mut self,
        e1: EdgeVertices,
        c1: Color,
        e2: EdgeVertices,
        c2: Color,
        has_road: bool,
    ) {
        self.terrain.add_quad(e1.v1, e1.v2, e2.v1, e2.v2);
        self.terrain.add_quad_color_pair(c1, c2);
        self.terrain.add_quad(e1.v2, e1.v3, e2.v2, e2.v3);
        self.terrain.add_quad_color_pair(c1, c2);
        self.terrain.add_quad(e1.v3, e1.v4, e2.v3, e2.v4);
        self.terrain.add_quad_color_pair(c1, c2);
        self.terrain.add_quad(e1.v4, e1.v5, e2.v4, e2.v5);
        self.terrain.add_quad_color_pair(c1, c2);

        if has_road {
            self.triangulate_road_segment(e1.v2, e1.v3, e1.v4, e2.v2, e2.v3, e2.v4);
        }
    }

    /// Two road quads straddling the edge middle, shaded out toward the
    /// sides through the U coordinate.
    fn triangulate_road_segment(
        &mut self,
        v1: Vec3,
        v2: Vec3,
        v3: Vec3,
        v4: Vec3,
        v5: Vec3,
        v6: Vec3,
    ) {
        self.roads.add_quad(v1, v2, v4, v5);
        self.roads.add_quad(v2, v3, v5, v6);
        self.roads.add_quad_uv_rect(0.0, 1.0, 0.0, 0.0);
        self.roads.add_quad_uv_rect(1.0, 0.0, 0.0, 0.0);
    }

    fn triangulate_road(
        &mut self,
        center: Vec3,
        ml: Vec3,
        mr: Vec3,
        e: EdgeVertices,
        has_road_through_cell_edge: bool,
    ) {
        if has_road_through_cell_edge {
            let mc = ml.lerp(mr, 0.5);
            self.triangulate_road_segment(ml, mc, mr, e.v2, e.v3, e.v4);
            self.roads.add_triangle(center, ml, mc);
            self.roads.add_triangle(center, mc, mr);
            self.roads.add_triangle_uv(
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
            );
            self.roads.add_triangle_uv(
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
            );
        } else {
            self.triangulate_road_edge(center, ml, mr);
        }
    }

    fn triangulate_road_edge(&mut self, center: Vec3, ml: Vec3, mr: Vec3) {
        self.roads.add_triangle(center, ml, mr);
        self.roads.add_triangle_uv(
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
        );
    }

    /// River surface quad between two bed heights. V coordinates run with
    /// the flow and flip when the river enters from this side.
    #[allow(clippy::too_many_arguments)]
    fn triangulate_river_quad(
        &mut self,
        mut v1: Vec3,
        mut v2: Vec3,
        mut v3: Vec3,
        mut v4: Vec3,
        y1: f32,
        y2: f32,
        v: f32,
        reversed: bool,
    ) {
        v1.y = y1;
        v2.y = y1;
        v3.y = y2;
        v4.y = y2;
        self.rivers.add_quad(v1, v2, v3, v4);
        if reversed {
            self.rivers.add_quad_uv_rect(1.0, 0.0, 0.8 - v, 0.6 - v);
        } else {
            self.rivers.add_quad_uv_rect(0.0, 1.0, v, v + 0.2);
        }
    }

    /// River dropping into standing water: the far edge is pulled up to
    /// where the surface meets the fall, after perturbation, so the quad
    /// visually dives under the water plane.
    #[allow(clippy::too_many_arguments)]
    fn triangulate_waterfall_in_water(
        &mut self,
        mut v1: Vec3,
        mut v2: Vec3,
        mut v3: Vec3,
        mut v4: Vec3,
        y1: f32,
        y2: f32,
        water_y: f32,
    ) {
        v1.y = y1;
        v2.y = y1;
        v3.y = y2;
        v4.y = y2;
        let v1 = metrics::perturb(self.noise, v1);
        let v2 = metrics::perturb(self.noise, v2);
        let v3 = metrics::perturb(self.noise, v3);
        let v4 = metrics::perturb(self.noise, v4);
        let t = (water_y - y2) / (y1 - y2);
        let v3 = v3.lerp(v1, t);
        let v4 = v4.lerp(v2, t);
        self.rivers.add_quad_unperturbed(v1, v2, v3, v4);
        self.rivers.add_quad_uv_rect(0.0, 1.0, 0.8, 1.0);
    }

    fn triangulate_water(&mut self, direction: HexDirection, cell: &HexCell, mut center: Vec3) {
        center.y = cell.water_surface_y();
        let neighbor = cell.neighbor(direction).map(|id| self.cell(id));
        match neighbor {
            Some(n) if !n.is_underwater() => {
                self.triangulate_water_shore(direction, cell, n, center);
            }
            _ => self.triangulate_open_water(direction, cell, neighbor, center),
        }
    }

    /// Water over water: a single wedge, the bridge quad toward forward
    /// neighbors, and the owned corner triangle.
    fn triangulate_open_water(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        neighbor: Option<&HexCell>,
        center: Vec3,
    ) {
        let c1 = center + metrics::first_water_corner(direction);
        let c2 = center + metrics::second_water_corner(direction);
        self.water.add_triangle(center, c1, c2);

        if direction <= HexDirection::SE && neighbor.is_some() {
            let bridge = metrics::water_bridge(direction);
            let e1 = c1 + bridge;
            let e2 = c2 + bridge;
            self.water.add_quad(c1, c2, e1, e2);

            if direction <= HexDirection::E {
                let Some(next_id) = cell.neighbor(direction.next()) else {
                    return;
                };
                if !self.cell(next_id).is_underwater() {
                    return;
                }
                self.water
                    .add_triangle(c2, e2, c2 + metrics::water_bridge(direction.next()));
            }
        }
    }

    /// Water meeting land: a full fan on the water side and a shore strip
    /// out to the neighbor's solid edge, with V rising toward land to
    /// drive foam shading. Rivers crossing the shore become estuaries.
    fn triangulate_water_shore(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        neighbor: &HexCell,
        center: Vec3,
    ) {
        let e1 = EdgeVertices::new(
            center + metrics::first_water_corner(direction),
            center + metrics::second_water_corner(direction),
        );
        self.water.add_triangle(center, e1.v1, e1.v2);
        self.water.add_triangle(center, e1.v2, e1.v3);
        self.water.add_triangle(center, e1.v3, e1.v4);
        self.water.add_triangle(center, e1.v4, e1.v5);

        // The far edge tracks the land cell's solid edge, rebuilt from its
        // center and flattened to the water surface.
        let mut center2 = neighbor.position();
        center2.y = center.y;
        let opposite = direction.opposite();
        let e2 = EdgeVertices::new(
            center2 + metrics::second_solid_corner(opposite),
            center2 + metrics::first_solid_corner(opposite),
        );

        if cell.has_river_through_edge(direction) {
            self.triangulate_estuary(e1, e2, cell.incoming_river() == Some(direction));
        } else {
            let spans = [
                (e1.v1, e1.v2, e2.v1, e2.v2),
                (e1.v2, e1.v3, e2.v2, e2.v3),
                (e1.v3, e1.v4, e2.v3, e2.v4),
                (e1.v4, e1.v5, e2.v4, e2.v5),
            ];
            for (a, b, c, d) in spans {
                self.water_shore.add_quad(a, b, c, d);
                self.water_shore.add_quad_uv_rect(0.0, 0.0, 0.0, 1.0);
            }
        }

        if let Some(next_id) = cell.neighbor(direction.next()) {
            let next_neighbor = self.cell(next_id);
            let corner = if next_neighbor.is_underwater() {
                metrics::first_water_corner(direction.previous())
            } else {
                metrics::first_solid_corner(direction.previous())
            };
            let mut v3 = next_neighbor.position() + corner;
            v3.y = center.y;
            self.water_shore.add_triangle(e1.v5, e2.v5, v3);
            self.water_shore.add_triangle_uv(
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(0.0, if next_neighbor.is_underwater() { 0.0 } else { 1.0 }),
            );
        }
    }

    /// Where a river crosses the shoreline. Two shore triangles flank a
    /// three-piece estuary patch whose second UV channel carries flow
    /// coordinates, mirrored for inflow versus outflow.
    fn triangulate_estuary(&mut self, e1: EdgeVertices, e2: EdgeVertices, incoming: bool) {
        self.water_shore.add_triangle(e2.v1, e1.v2, e1.v1);
        self.water_shore.add_triangle(e2.v5, e1.v5, e1.v4);
        self.water_shore.add_triangle_uv(
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
        );
        self.water_shore.add_triangle_uv(
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
        );

        self.estuaries.add_quad(e2.v1, e1.v2, e2.v2, e1.v3);
        self.estuaries.add_triangle(e1.v3, e2.v2, e2.v4);
        self.estuaries.add_quad(e1.v3, e1.v4, e2.v4, e2.v5);

        self.estuaries.add_quad_uv(
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 0.0),
        );
        self.estuaries.add_triangle_uv(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 1.0),
        );
        self.estuaries.add_quad_uv(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        );

        if incoming {
            self.estuaries.add_quad_uv2(
                Vec2::new(1.5, 1.0),
                Vec2::new(0.7, 1.15),
                Vec2::new(1.0, 0.8),
                Vec2::new(0.5, 1.1),
            );
            self.estuaries.add_triangle_uv2(
                Vec2::new(0.5, 1.1),
                Vec2::new(1.0, 0.8),
                Vec2::new(0.0, 0.8),
            );
            self.estuaries.add_quad_uv2(
                Vec2::new(0.5, 1.1),
                Vec2::new(0.3, 1.15),
                Vec2::new(0.0, 0.8),
                Vec2::new(-0.5, 1.0),
            );
        } else {
            self.estuaries.add_quad_uv2(
                Vec2::new(-0.5, -0.2),
                Vec2::new(0.3, -0.35),
                Vec2::new(0.0, 0.0),
                Vec2::new(0.5, -0.3),
            );
            self.estuaries.add_triangle_uv2(
                Vec2::new(0.5, -0.3),
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
            );
            self.estuaries.add_quad_uv2(
                Vec2::new(0.5, -0.3),
                Vec2::new(0.7, -0.35),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.5, -0.2),
            );
        }
    }
}
