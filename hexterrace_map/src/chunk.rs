// Chunk bookkeeping.
//
// The grid is carved into fixed-size chunks so edits rebuild only the
// geometry they touch. A chunk owns the membership list of its cells (in
// local row-major order, which fixes emission order) and the persistent
// mesh buffers the last rebuild produced. A dirty flag marks chunks whose
// buffers are stale; `HexGrid::flush` clears it as it rebuilds.
//
// See also: `grid.rs` for chunk assignment and flushing, `triangulate.rs`
// for the rebuild itself.

use crate::mesh::{ColliderData, MeshData};
use crate::types::CellId;

/// The per-chunk output buffers, one mesh per material layer.
#[derive(Clone, Debug, Default)]
pub struct MeshSet {
    pub terrain: MeshData,
    pub terrain_collider: ColliderData,
    pub rivers: MeshData,
    pub roads: MeshData,
    pub water: MeshData,
    pub water_shore: MeshData,
    pub estuaries: MeshData,
}

/// One rectangular patch of the grid and its built geometry.
#[derive(Clone, Debug)]
pub struct HexGridChunk {
    cells: Vec<CellId>,
    dirty: bool,
    meshes: MeshSet,
}

impl HexGridChunk {
    /// New chunks start dirty so the first flush builds everything.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            dirty: true,
            meshes: MeshSet::default(),
        }
    }

    /// Membership is filled during grid construction in local row-major
    /// order, which the construction sweep produces naturally.
    pub(crate) fn add_cell(&mut self, cell: CellId) {
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn meshes(&self) -> &MeshSet {
        &self.meshes
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn meshes_mut(&mut self) -> &mut MeshSet {
        &mut self.meshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_start_dirty_and_take_clears() {
        let mut chunk = HexGridChunk::new(25);
        assert!(chunk.is_dirty());
        assert!(chunk.take_dirty());
        assert!(!chunk.is_dirty());
        assert!(!chunk.take_dirty());
        chunk.mark_dirty();
        assert!(chunk.is_dirty());
    }

    #[test]
    fn membership_preserves_insertion_order() {
        let mut chunk = HexGridChunk::new(3);
        for raw in [4u32, 9, 2] {
            chunk.add_cell(CellId(raw));
        }
        assert_eq!(chunk.cells(), &[CellId(4), CellId(9), CellId(2)]);
    }
}
