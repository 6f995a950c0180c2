//! Incremental synchronisation between the block grid and the face quads in the vertex buffer.
//!
//! A face owns a slot exactly while it is exposed, meaning no existing block sits in the
//! adjacent cell inside the window. `place` and `destroy` keep that true for the edited
//! block and its six neighbours and write only the quads that changed.

use cgmath::Point3;
use log::debug;

use super::{
    block::{block_side::BlockSide, block_type::BlockType, Block, ATLAS_ROWS},
    face_slots::FaceSink,
    world::VoxelWorld,
};
use crate::engine_state::rendering::vertex::{BlockVertex, FaceQuad};

/// Opacity of a regular, fully visible block face.
pub const SOLID_OPACITY: f32 = 1.0;

/// Builds the quad of one block face.
///
/// # Arguments
///
/// * `world` - Block coordinate; the quad spans `world * block_size` to `(world + 1) * block_size`
/// * `block_type` - Selects the atlas row
/// * `side` - Which face to build
/// * `block_size` - Edge length of a block in world units
/// * `opacity` - Written to every vertex
pub fn face_quad(
    world: Point3<i32>,
    block_type: BlockType,
    side: BlockSide,
    block_size: f32,
    opacity: f32,
) -> FaceQuad {
    let row_height = 1.0 / ATLAS_ROWS as f32;
    let row = Block::texture_row(block_type, side) as f32;
    let v_top = row * row_height;
    let v_bottom = v_top + row_height;
    let uvs = [[0.0, v_bottom], [1.0, v_bottom], [1.0, v_top], [0.0, v_top]];

    let corners = side.corners();
    let vertex = |i: usize| {
        let corner = corners[i];
        let position = Point3::new(
            (world.x + corner[0] as i32) as f32 * block_size,
            (world.y + corner[1] as i32) as f32 * block_size,
            (world.z + corner[2] as i32) as f32 * block_size,
        );
        BlockVertex::new(position, uvs[i][0], uvs[i][1], opacity)
    };

    [vertex(0), vertex(1), vertex(2), vertex(2), vertex(3), vertex(0)]
}

/// All six face quads of a block, in `BlockSide::all()` order.
pub fn block_quads(
    world: Point3<i32>,
    block_type: BlockType,
    block_size: f32,
    opacity: f32,
) -> [FaceQuad; 6] {
    BlockSide::all().map(|side| face_quad(world, block_type, side, block_size, opacity))
}

impl VoxelWorld {
    /// Places a block and updates the exposure of its faces and its neighbours' faces.
    ///
    /// Neighbour faces that become hidden are tombstoned and released. Every face of the
    /// new block whose neighbour is absent or outside the window gets a slot and a quad.
    ///
    /// # Panics
    /// Panics if `world` is outside the window or already occupied.
    pub fn place(&mut self, world: Point3<i32>, block_type: BlockType, sink: &mut impl FaceSink) {
        assert!(
            self.grid.is_vacant(world),
            "cannot place a block at {:?}: outside the window or already occupied",
            world
        );

        let mut block = Block::new(block_type);
        for side in BlockSide::all() {
            match self.grid.block_at_mut(world + side.offset()) {
                Some(neighbour) => {
                    if let Some(slot) = neighbour.faces[side.opposite().index()].take() {
                        self.slots.release(slot, sink);
                    }
                }
                None => block.faces[side.index()] = Some(self.slots.acquire()),
            }
        }

        write_block(world, &block, self.block_size, sink);
        self.grid.insert(world, block);
        debug!("Placed {:?} at {:?}", block_type, world);
    }

    /// Destroys a block, releasing its faces and exposing the neighbours' faces toward it.
    ///
    /// # Panics
    /// Panics if no block exists at `world`.
    pub fn destroy(&mut self, world: Point3<i32>, sink: &mut impl FaceSink) {
        let block = self.grid.remove(world);
        for slot in block.faces.into_iter().flatten() {
            self.slots.release(slot, sink);
        }

        for side in BlockSide::all() {
            let neighbour_position = world + side.offset();
            if let Some(neighbour) = self.grid.block_at_mut(neighbour_position) {
                let facing = side.opposite().index();
                if neighbour.faces[facing].is_none() {
                    neighbour.faces[facing] = Some(self.slots.acquire());
                }
                write_block(neighbour_position, neighbour, self.block_size, sink);
            }
        }
        debug!("Destroyed {:?} at {:?}", block.block_type, world);
    }
}

/// Writes full-opacity quads for every face of `block` that holds a slot.
fn write_block(world: Point3<i32>, block: &Block, block_size: f32, sink: &mut impl FaceSink) {
    for side in BlockSide::all() {
        if let Some(slot) = block.face(side) {
            let quad = face_quad(world, block.block_type, side, block_size, SOLID_OPACITY);
            sink.write_face(slot, &quad);
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;
    use crate::engine_state::voxels::{assert_consistent, MemoryFaceBuffer};

    fn small_world() -> (VoxelWorld, MemoryFaceBuffer) {
        let world = VoxelWorld::new(Vector3::new(6, 6, 6), Point3::new(-3, 0, -3), 0.1);
        let sink = MemoryFaceBuffer::for_world(&world);
        (world, sink)
    }

    #[test]
    fn isolated_block_exposes_six_faces() {
        let (mut world, mut sink) = small_world();
        world.place(Point3::new(0, 2, 0), BlockType::GRASS, &mut sink);

        assert_eq!(world.slots().in_use(), 6);
        assert_eq!(sink.visible_faces(world.slots().high_water_mark()), 6);
        assert_consistent(&world, &sink);
    }

    #[test]
    fn place_then_destroy_restores_the_empty_state() {
        let (mut world, mut sink) = small_world();
        let position = Point3::new(1, 1, -1);
        world.place(position, BlockType::DIRT, &mut sink);
        world.destroy(position, &mut sink);

        assert!(!world.grid().exists(position));
        assert_eq!(world.grid().block_count(), 0);
        assert_eq!(world.slots().in_use(), 0);
        assert_eq!(world.slots().free_len(), world.slots().high_water_mark());
        assert_eq!(sink.visible_faces(world.slots().high_water_mark()), 0);
    }

    #[test]
    fn adjacent_blocks_hide_their_shared_faces() {
        let (mut world, mut sink) = small_world();
        world.place(Point3::new(0, 2, 0), BlockType::GRASS, &mut sink);
        world.place(Point3::new(1, 2, 0), BlockType::GRASS, &mut sink);

        assert_eq!(world.exposed_face_count(), 10);
        assert_eq!(world.slots().in_use(), 10);
        assert_eq!(sink.visible_faces(world.slots().high_water_mark()), 10);
        let left = world.grid().block_at(Point3::new(0, 2, 0)).map(|b| b.face(BlockSide::RIGHT));
        assert_eq!(left, Some(None));
        assert_consistent(&world, &sink);
    }

    #[test]
    fn destroying_a_block_exposes_its_neighbours() {
        let (mut world, mut sink) = small_world();
        let centre = Point3::new(0, 2, 0);
        world.place(centre, BlockType::STONE, &mut sink);
        for side in BlockSide::all() {
            world.place(centre + side.offset(), BlockType::DIRT, &mut sink);
        }
        assert!(world.grid().block_at(centre).is_some_and(|b| b.exposed_faces() == 0));
        assert_consistent(&world, &sink);

        world.destroy(centre, &mut sink);
        for side in BlockSide::all() {
            let neighbour = world
                .grid()
                .block_at(centre + side.offset())
                .expect("neighbour survives");
            assert!(neighbour.face(side.opposite()).is_some());
            assert_eq!(neighbour.exposed_faces(), 6);
        }
        assert_consistent(&world, &sink);
    }

    #[test]
    fn released_faces_are_tombstoned_before_reuse() {
        let (mut world, mut sink) = small_world();
        world.place(Point3::new(0, 2, 0), BlockType::GRASS, &mut sink);
        let hidden = world
            .grid()
            .block_at(Point3::new(0, 2, 0))
            .and_then(|b| b.face(BlockSide::TOP))
            .expect("top face is exposed");

        world.place(Point3::new(0, 3, 0), BlockType::GRASS, &mut sink);
        assert!(sink.tombstone_writes(hidden) >= 1, "hidden face was never tombstoned");
        assert_consistent(&world, &sink);
    }

    #[test]
    fn faces_toward_the_window_edge_stay_exposed() {
        let (mut world, mut sink) = small_world();
        // x = 2 is the last column of the window, x = 3 is outside of it
        let edge = Point3::new(2, 0, 0);
        world.place(edge, BlockType::GRASS, &mut sink);
        let block = world.grid().block_at(edge).expect("block placed");
        assert!(block.face(BlockSide::RIGHT).is_some());
        assert!(block.face(BlockSide::BOTTOM).is_some());
    }

    #[test]
    fn face_geometry_is_scaled_by_block_size() {
        let quad = face_quad(Point3::new(2, -1, 3), BlockType::GRASS, BlockSide::FRONT, 0.5, 1.0);
        for vertex in quad {
            assert_eq!(vertex.position[2], 2.0);
            assert!(vertex.position[0] == 1.0 || vertex.position[0] == 1.5);
            assert!(vertex.position[1] == -0.5 || vertex.position[1] == 0.0);
            assert_eq!(vertex.opacity, 1.0);
        }
        // grass sides sample the first atlas row
        assert!(quad.iter().all(|v| v.tex_coords[1] <= 1.0 / ATLAS_ROWS as f32));
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn placing_on_an_occupied_cell_panics() {
        let (mut world, mut sink) = small_world();
        world.place(Point3::new(0, 0, 0), BlockType::GRASS, &mut sink);
        world.place(Point3::new(0, 0, 0), BlockType::GRASS, &mut sink);
    }

    #[test]
    #[should_panic(expected = "outside the window")]
    fn placing_outside_the_window_panics() {
        let (mut world, mut sink) = small_world();
        world.place(Point3::new(3, 0, 0), BlockType::GRASS, &mut sink);
    }

    #[test]
    #[should_panic(expected = "no block exists")]
    fn destroying_an_empty_cell_panics() {
        let (mut world, mut sink) = small_world();
        world.destroy(Point3::new(0, 0, 0), &mut sink);
    }

    #[test]
    fn random_edits_keep_every_invariant() {
        let (mut world, mut sink) = small_world();
        let mut rng = fastrand::Rng::with_seed(0x5eed);

        for _ in 0..2_000 {
            let position = Point3::new(rng.i32(-3..3), rng.i32(0..6), rng.i32(-3..3));
            if world.grid().exists(position) {
                world.destroy(position, &mut sink);
            } else {
                world.place(position, BlockType::GRASS, &mut sink);
            }
            let slots = world.slots();
            assert_eq!(slots.in_use() + slots.free_len(), slots.high_water_mark());
        }
        assert_consistent(&world, &sink);
        assert!(world.slots().high_water_mark() <= world.slots().capacity());
    }
}
