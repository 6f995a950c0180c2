//! # Streaming Module
//!
//! Slides the block window over the unbounded world. A shift by `delta` destroys the blocks
//! that leave the window and generates the coordinates that enter it from the terrain
//! field. Cells in the overlap of the old and new window are never visited, so the cost
//! of a shift is proportional to the volume of the slices that change.

use cgmath::{Point3, Vector3, Zero};
use log::{debug, info};

use super::{face_slots::FaceSink, terrain::TerrainField, world::VoxelWorld};

/// An axis-aligned, half-open box of block coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockRegion {
    /// Inclusive lower corner
    pub min: Point3<i32>,
    /// Exclusive upper corner
    pub max: Point3<i32>,
}

impl BlockRegion {
    /// The region covered by the window of `world`.
    pub fn of_window(world: &VoxelWorld) -> Self {
        let offset = world.grid().offset();
        BlockRegion {
            min: offset,
            max: offset + world.grid().extent(),
        }
    }

    /// This region moved by `delta`.
    pub fn translated(&self, delta: Vector3<i32>) -> Self {
        BlockRegion {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Whether the region contains no coordinate.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] >= self.max[axis])
    }

    /// Number of coordinates in the region.
    pub fn volume(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (0..3)
            .map(|axis| (self.max[axis] - self.min[axis]) as usize)
            .product()
    }

    /// Every coordinate of the region, x outermost.
    pub fn points(&self) -> impl Iterator<Item = Point3<i32>> {
        let BlockRegion { min, max } = *self;
        (min.x..max.x).flat_map(move |x| {
            (min.y..max.y).flat_map(move |y| (min.z..max.z).map(move |z| Point3::new(x, y, z)))
        })
    }

    /// Splits `self \ other` into disjoint slabs.
    ///
    /// Each axis in turn cuts off the part of the remaining box below and above `other`;
    /// what is left after all three axes is the intersection, which is dropped.
    pub fn difference(&self, other: &BlockRegion) -> Vec<BlockRegion> {
        let mut slabs = Vec::new();
        let mut remaining = *self;

        for axis in 0..3 {
            if remaining.is_empty() {
                break;
            }
            if remaining.min[axis] < other.min[axis] {
                let mut below = remaining;
                below.max[axis] = remaining.max[axis].min(other.min[axis]);
                slabs.push(below);
            }
            if remaining.max[axis] > other.max[axis] {
                let mut above = remaining;
                above.min[axis] = remaining.min[axis].max(other.max[axis]);
                slabs.push(above);
            }
            remaining.min[axis] = remaining.min[axis].max(other.min[axis]);
            remaining.max[axis] = remaining.max[axis].min(other.max[axis]);
        }

        slabs.retain(|slab| !slab.is_empty());
        slabs
    }
}

/// Work done by one shift.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShiftReport {
    /// Blocks destroyed because they left the window
    pub evicted: usize,
    /// Blocks placed because the terrain is solid where the window grew
    pub generated: usize,
}

/// Fills and slides the block window from a terrain field.
pub struct WorldStreamer {
    terrain: Box<dyn TerrainField>,
}

impl WorldStreamer {
    /// Creates a streamer generating from `terrain`.
    pub fn new(terrain: Box<dyn TerrainField>) -> Self {
        WorldStreamer { terrain }
    }

    /// Generates every vacant coordinate of the current window.
    ///
    /// # Returns
    /// The number of blocks placed
    pub fn populate(&self, world: &mut VoxelWorld, sink: &mut impl FaceSink) -> usize {
        let region = BlockRegion::of_window(world);
        let generated = self.generate(world, &region, sink);
        info!(
            "Populated window at {:?} with {} blocks ({} faces)",
            region.min,
            generated,
            world.slots().in_use()
        );
        generated
    }

    /// Moves the window by `delta`.
    ///
    /// Blocks in the part of the old window outside the new one are destroyed under the
    /// old offset, then the offset moves and the part of the new window outside the old
    /// one is generated. A delta of at least the extent on any axis replaces the whole
    /// window. A zero delta does nothing.
    pub fn shift(
        &self,
        world: &mut VoxelWorld,
        delta: Vector3<i32>,
        sink: &mut impl FaceSink,
    ) -> ShiftReport {
        if delta.is_zero() {
            return ShiftReport::default();
        }

        let old = BlockRegion::of_window(world);
        let new = old.translated(delta);

        let mut evicted = 0;
        for slab in old.difference(&new) {
            for position in slab.points() {
                if world.grid().exists(position) {
                    world.destroy(position, sink);
                    evicted += 1;
                }
            }
        }

        world.grid.translate(delta);

        let generated = new
            .difference(&old)
            .iter()
            .map(|slab| self.generate(world, slab, sink))
            .sum();

        let report = ShiftReport { evicted, generated };
        debug!(
            "Shifted window by {:?} to {:?}: {:?}",
            delta,
            world.grid().offset(),
            report
        );
        report
    }

    /// Shifts the window so `viewer_block` sits in its horizontal centre.
    ///
    /// The vertical offset never changes. Returns `None` when the window is already
    /// centred on the viewer.
    pub fn recenter(
        &self,
        world: &mut VoxelWorld,
        viewer_block: Point3<i32>,
        sink: &mut impl FaceSink,
    ) -> Option<ShiftReport> {
        let delta = Self::recenter_delta(world, viewer_block);
        (!delta.is_zero()).then(|| self.shift(world, delta, sink))
    }

    /// Offset change that centres the window horizontally on `viewer_block`.
    pub fn recenter_delta(world: &VoxelWorld, viewer_block: Point3<i32>) -> Vector3<i32> {
        let extent = world.grid().extent();
        let offset = world.grid().offset();
        Vector3::new(
            viewer_block.x - extent.x / 2 - offset.x,
            0,
            viewer_block.z - extent.z / 2 - offset.z,
        )
    }

    fn generate(
        &self,
        world: &mut VoxelWorld,
        region: &BlockRegion,
        sink: &mut impl FaceSink,
    ) -> usize {
        let mut generated = 0;
        for position in region.points() {
            if !world.grid().is_vacant(position) {
                continue;
            }
            if let Some(block_type) = self.terrain.generate(position) {
                world.place(position, block_type, sink);
                generated += 1;
            }
        }
        generated
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        config::TerrainConfig,
        engine_state::voxels::{
            assert_consistent,
            block::block_type::BlockType,
            terrain::{FlatTerrain, PerlinTerrain},
            MemoryFaceBuffer,
        },
    };

    fn snapshot(world: &VoxelWorld) -> HashMap<Point3<i32>, BlockType> {
        world
            .grid()
            .iter_blocks()
            .map(|(position, block)| (position, block.block_type))
            .collect()
    }

    fn perlin_streamer() -> WorldStreamer {
        WorldStreamer::new(Box::new(PerlinTerrain::new(&TerrainConfig::default())))
    }

    fn populated(
        streamer: &WorldStreamer,
        offset: Point3<i32>,
    ) -> (VoxelWorld, MemoryFaceBuffer) {
        let mut world = VoxelWorld::new(Vector3::new(8, 8, 8), offset, 0.1);
        let mut sink = MemoryFaceBuffer::for_world(&world);
        streamer.populate(&mut world, &mut sink);
        (world, sink)
    }

    #[test]
    fn difference_slabs_are_disjoint_and_exact() {
        let a = BlockRegion {
            min: Point3::new(0, 0, 0),
            max: Point3::new(4, 3, 5),
        };
        let b = a.translated(Vector3::new(2, -1, 3));
        let slabs = a.difference(&b);

        let mut covered = HashMap::new();
        for slab in &slabs {
            for point in slab.points() {
                *covered.entry(point).or_insert(0) += 1;
            }
        }
        for point in a.points() {
            let inside_b = (0..3).all(|axis| b.min[axis] <= point[axis] && point[axis] < b.max[axis]);
            let expected = if inside_b { 0 } else { 1 };
            assert_eq!(covered.get(&point).copied().unwrap_or(0), expected, "{:?}", point);
        }
        assert_eq!(covered.len(), slabs.iter().map(BlockRegion::volume).sum::<usize>());
    }

    #[test]
    fn unit_shift_replaces_exactly_the_trailing_and_leading_slices() {
        let streamer = WorldStreamer::new(Box::new(FlatTerrain { surface: 2 }));
        let (mut world, mut sink) = populated(&streamer, Point3::new(0, 0, 0));
        let before = snapshot(&world);

        let report = streamer.shift(&mut world, Vector3::new(1, 0, 0), &mut sink);
        let after = snapshot(&world);

        assert_eq!(world.grid().offset(), Point3::new(1, 0, 0));
        // flat ground of 3 layers over an 8x8 footprint slice
        assert_eq!(report.evicted, 3 * 8);
        assert_eq!(report.generated, 3 * 8);
        assert!(after.keys().all(|p| p.x != 0), "trailing slice survived");
        assert_eq!(after.keys().filter(|p| p.x == 8).count(), 3 * 8);
        for (position, block_type) in &before {
            if position.x != 0 {
                assert_eq!(after.get(position), Some(block_type));
            }
        }
        assert_consistent(&world, &sink);
    }

    #[test]
    fn shifted_window_matches_a_fresh_population() {
        let streamer = perlin_streamer();
        for delta in [
            Vector3::new(1, 0, 0),
            Vector3::new(-1, 0, 2),
            Vector3::new(3, -1, -2),
            Vector3::new(0, 2, 0),
            Vector3::new(20, 0, -9),
        ] {
            let origin = Point3::new(-4, 8, -4);
            let (mut world, mut sink) = populated(&streamer, origin);
            streamer.shift(&mut world, delta, &mut sink);

            let (fresh, _) = populated(&streamer, origin + delta);
            assert_eq!(snapshot(&world), snapshot(&fresh), "delta {:?}", delta);
            assert_eq!(world.exposed_face_count(), fresh.exposed_face_count());
            assert_consistent(&world, &sink);
        }
    }

    #[test]
    fn zero_shift_is_a_no_op() {
        let streamer = perlin_streamer();
        let (mut world, mut sink) = populated(&streamer, Point3::new(0, 8, 0));
        let before = snapshot(&world);
        let in_use = world.slots().in_use();

        let report = streamer.shift(&mut world, Vector3::zero(), &mut sink);
        assert_eq!(report, ShiftReport::default());
        assert_eq!(snapshot(&world), before);
        assert_eq!(world.slots().in_use(), in_use);
    }

    #[test]
    fn surviving_blocks_keep_their_cells() {
        let streamer = perlin_streamer();
        let (mut world, mut sink) = populated(&streamer, Point3::new(0, 8, 0));
        let kept: Vec<_> = world
            .grid()
            .iter_blocks()
            .map(|(position, _)| position)
            .filter(|position| position.x >= 2 && position.z < 7)
            .map(|position| (position, world.grid().to_cell(position).index))
            .collect();

        streamer.shift(&mut world, Vector3::new(2, 0, -1), &mut sink);
        for (position, index) in kept {
            let cell = world.grid().to_cell(position);
            assert!(cell.in_window);
            assert_eq!(cell.index, index);
            assert!(world.grid().exists(position));
        }
    }

    #[test]
    fn recenter_follows_the_viewer_horizontally() {
        let streamer = WorldStreamer::new(Box::new(FlatTerrain { surface: 1 }));
        let (mut world, mut sink) = populated(&streamer, Point3::new(-4, 0, -4));

        assert_eq!(streamer.recenter(&mut world, Point3::new(0, 5, 0), &mut sink), None);

        let report = streamer.recenter(&mut world, Point3::new(3, 40, -1), &mut sink);
        assert!(report.is_some());
        assert_eq!(world.grid().offset(), Point3::new(-1, 0, -5));
        assert_consistent(&world, &sink);
    }
}
