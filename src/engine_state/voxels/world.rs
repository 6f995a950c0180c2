//! # World Module
//!
//! This module provides the `VoxelWorld` struct which owns the block grid and the face slot
//! allocator. Everything that changes the visible world (editing, streaming) goes through a
//! `VoxelWorld` together with a `FaceSink` that receives the resulting face quads.
//!
//! ## Architecture
//!
//! The world is a fixed window of `render_distance x world_height x render_distance` cells
//! that slides over an unbounded integer lattice. Storage is toroidal, so sliding the window
//! only touches the cells that enter or leave it.

use cgmath::{Point3, Vector3};

use super::{
    face_slots::FaceSlotAllocator,
    grid::VoxelGrid,
};
use crate::engine_state::rendering::vertex::VERTICES_PER_FACE;

/// Number of faces per block; each block can expose at most this many quads.
pub const FACES_PER_BLOCK: usize = 6;

/// The grid window plus the face slot bookkeeping that mirrors it in the vertex buffer.
pub struct VoxelWorld {
    pub(super) grid: VoxelGrid,
    pub(super) slots: FaceSlotAllocator,
    pub(super) block_size: f32,
}

impl VoxelWorld {
    /// Creates an empty world window.
    ///
    /// The face slot capacity is `cell_count * 6`, enough for every cell of the window to
    /// be an isolated block.
    ///
    /// # Arguments
    ///
    /// * `extent` - Cells per axis
    /// * `offset` - World coordinate of the window's lowest corner
    /// * `block_size` - Edge length of one block in world units
    pub fn new(extent: Vector3<i32>, offset: Point3<i32>, block_size: f32) -> Self {
        let grid = VoxelGrid::new(extent, offset);
        let slots = FaceSlotAllocator::new(grid.cell_count() * FACES_PER_BLOCK);
        VoxelWorld {
            grid,
            slots,
            block_size,
        }
    }

    /// Read access to the block grid.
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Read access to the face slot allocator.
    pub fn slots(&self) -> &FaceSlotAllocator {
        &self.slots
    }

    /// Edge length of one block in world units.
    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Number of vertices the block vertex buffer must be able to hold.
    pub fn vertex_capacity(&self) -> usize {
        self.slots.capacity() * VERTICES_PER_FACE
    }

    /// Number of vertices the draw call covers.
    pub fn draw_vertex_count(&self) -> u32 {
        self.slots.draw_vertex_count()
    }

    /// Total number of exposed faces over all blocks.
    pub fn exposed_face_count(&self) -> usize {
        self.grid
            .iter_blocks()
            .map(|(_, block)| block.exposed_faces())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_capacity_fits_an_isolated_block_in_every_cell() {
        let world = VoxelWorld::new(Vector3::new(2, 3, 2), Point3::new(-1, 0, -1), 0.5);
        assert_eq!(world.slots().capacity(), 2 * 3 * 2 * FACES_PER_BLOCK);
        assert_eq!(world.vertex_capacity(), 2 * 3 * 2 * FACES_PER_BLOCK * VERTICES_PER_FACE);
        assert_eq!(world.draw_vertex_count(), 0);
    }
}
