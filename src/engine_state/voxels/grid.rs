//! Block storage for the sliding window.

use cgmath::{Point3, Vector3};

use super::{
    addressing::{Cell, WindowAddressing},
    block::Block,
};

/// Fixed-size block array addressed through a movable toroidal window.
///
/// Cells outside the window are never dereferenced: every lookup goes through
/// `WindowAddressing` and answers `None` for out-of-window coordinates.
pub struct VoxelGrid {
    addressing: WindowAddressing,
    cells: Vec<Option<Block>>,
    block_count: usize,
}

impl VoxelGrid {
    /// Creates an empty grid of `extent` cells whose window starts at `offset`.
    pub fn new(extent: Vector3<i32>, offset: Point3<i32>) -> Self {
        let addressing = WindowAddressing::new(extent, offset);
        VoxelGrid {
            cells: vec![None; addressing.cell_count()],
            addressing,
            block_count: 0,
        }
    }

    /// Number of cells per axis.
    pub fn extent(&self) -> Vector3<i32> {
        self.addressing.extent()
    }

    /// World coordinate of the window's lowest corner.
    pub fn offset(&self) -> Point3<i32> {
        self.addressing.offset()
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of existing blocks in the window.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Maps a world coordinate to its cell.
    pub fn to_cell(&self, world: Point3<i32>) -> Cell {
        self.addressing.to_cell(world)
    }

    /// The existing block at `world`, if it is inside the window.
    pub fn block_at(&self, world: Point3<i32>) -> Option<&Block> {
        let index = self.addressing.index_of(world)?;
        self.cells[index].as_ref()
    }

    /// Mutable access to the existing block at `world`, if it is inside the window.
    pub fn block_at_mut(&mut self, world: Point3<i32>) -> Option<&mut Block> {
        let index = self.addressing.index_of(world)?;
        self.cells[index].as_mut()
    }

    /// Whether an existing block occupies `world`.
    pub fn exists(&self, world: Point3<i32>) -> bool {
        self.block_at(world).is_some()
    }

    /// Whether `world` is inside the window and free for a new block.
    pub fn is_vacant(&self, world: Point3<i32>) -> bool {
        match self.addressing.index_of(world) {
            Some(index) => self.cells[index].is_none(),
            None => false,
        }
    }

    /// Stores `block` at `world`.
    ///
    /// # Panics
    /// Panics if `world` is outside the window or already occupied.
    pub(super) fn insert(&mut self, world: Point3<i32>, block: Block) -> &mut Block {
        let index = self
            .addressing
            .index_of(world)
            .unwrap_or_else(|| panic!("cannot place a block at {:?}: outside the window", world));
        let cell = &mut self.cells[index];
        assert!(
            cell.is_none(),
            "cannot place a block at {:?}: cell already occupied",
            world
        );
        self.block_count += 1;
        cell.insert(block)
    }

    /// Takes the block out of `world`, leaving the cell empty.
    ///
    /// # Panics
    /// Panics if no block exists at `world`.
    pub(super) fn remove(&mut self, world: Point3<i32>) -> Block {
        let block = self
            .addressing
            .index_of(world)
            .and_then(|index| self.cells[index].take())
            .unwrap_or_else(|| panic!("cannot destroy the block at {:?}: no block exists", world));
        self.block_count -= 1;
        block
    }

    /// Moves the window by `delta` without touching any cell.
    pub(super) fn translate(&mut self, delta: Vector3<i32>) {
        self.addressing.translate(delta);
    }

    /// World coordinates and blocks of every existing block in the window.
    pub fn iter_blocks(&self) -> impl Iterator<Item = (Point3<i32>, &Block)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            cell.as_ref()
                .map(|block| (self.addressing.world_of_cell(index), block))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn grid() -> VoxelGrid {
        VoxelGrid::new(Vector3::new(4, 4, 4), Point3::new(-2, 0, -2))
    }

    #[test]
    fn out_of_window_lookups_answer_nothing() {
        let mut grid = grid();
        grid.insert(Point3::new(-2, 0, -2), Block::new(BlockType::GRASS));

        // (2, 0, 2) shares the storage cell but lies outside the window
        assert!(!grid.exists(Point3::new(2, 0, 2)));
        assert!(grid.block_at_mut(Point3::new(2, 0, 2)).is_none());
        assert!(!grid.is_vacant(Point3::new(2, 0, 2)));
        assert!(grid.exists(Point3::new(-2, 0, -2)));
    }

    #[test]
    fn insert_and_remove_track_the_block_count() {
        let mut grid = grid();
        grid.insert(Point3::new(0, 1, 0), Block::new(BlockType::DIRT));
        grid.insert(Point3::new(1, 1, 0), Block::new(BlockType::STONE));
        assert_eq!(grid.block_count(), 2);

        let removed = grid.remove(Point3::new(0, 1, 0));
        assert_eq!(removed.block_type, BlockType::DIRT);
        assert_eq!(grid.block_count(), 1);
        assert!(grid.is_vacant(Point3::new(0, 1, 0)));

        let listed: Vec<_> = grid.iter_blocks().map(|(world, _)| world).collect();
        assert_eq!(listed, vec![Point3::new(1, 1, 0)]);
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn inserting_twice_panics() {
        let mut grid = grid();
        grid.insert(Point3::new(0, 0, 0), Block::new(BlockType::GRASS));
        grid.insert(Point3::new(0, 0, 0), Block::new(BlockType::GRASS));
    }

    #[test]
    #[should_panic(expected = "no block exists")]
    fn removing_an_empty_cell_panics() {
        grid().remove(Point3::new(0, 0, 0));
    }
}
