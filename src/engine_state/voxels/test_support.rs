//! CPU stand-in for the block vertex buffer.

use std::collections::HashSet;

use super::{
    block::block_side::BlockSide,
    face_slots::{FaceSink, FaceSlot},
    world::VoxelWorld,
};
use crate::engine_state::rendering::vertex::{BlockVertex, FaceQuad, VERTICES_PER_FACE};

/// Vertex buffer mirror that records every face write.
pub struct MemoryFaceBuffer {
    vertices: Vec<BlockVertex>,
    tombstones: Vec<usize>,
}

impl MemoryFaceBuffer {
    pub fn new(face_capacity: usize) -> Self {
        MemoryFaceBuffer {
            vertices: vec![bytemuck::Zeroable::zeroed(); face_capacity * VERTICES_PER_FACE],
            tombstones: vec![0; face_capacity],
        }
    }

    /// A buffer as large as the world's face slot capacity.
    pub fn for_world(world: &VoxelWorld) -> Self {
        Self::new(world.slots().capacity())
    }

    pub fn quad(&self, slot: FaceSlot) -> &[BlockVertex] {
        let start = slot.first_vertex();
        &self.vertices[start..start + VERTICES_PER_FACE]
    }

    /// Whether any vertex of the slot would be drawn.
    pub fn is_visible(&self, slot: FaceSlot) -> bool {
        self.quad(slot).iter().any(|vertex| vertex.opacity > 0.0)
    }

    /// Number of visible quads within the first `high_water_mark` slots.
    pub fn visible_faces(&self, high_water_mark: usize) -> usize {
        (0..high_water_mark)
            .filter(|&index| self.is_visible(FaceSlot::new(index as u32)))
            .count()
    }

    /// How often a zero-opacity quad was written to `slot`.
    pub fn tombstone_writes(&self, slot: FaceSlot) -> usize {
        self.tombstones[slot.index()]
    }
}

impl FaceSink for MemoryFaceBuffer {
    fn write_face(&mut self, slot: FaceSlot, quad: &FaceQuad) {
        let start = slot.first_vertex();
        assert!(
            start + VERTICES_PER_FACE <= self.vertices.len(),
            "{} is outside the buffer",
            slot
        );
        if quad.iter().all(|vertex| vertex.opacity == 0.0) {
            self.tombstones[slot.index()] += 1;
        }
        self.vertices[start..start + VERTICES_PER_FACE].copy_from_slice(quad);
    }
}

/// Checks every bookkeeping invariant between grid, allocator and buffer contents.
pub fn assert_consistent(world: &VoxelWorld, sink: &MemoryFaceBuffer) {
    let slots = world.slots();
    assert_eq!(
        slots.in_use() + slots.free_len(),
        slots.high_water_mark(),
        "slot conservation violated"
    );

    let mut referenced = HashSet::new();
    for (position, block) in world.grid().iter_blocks() {
        for side in BlockSide::all() {
            let neighbour_exists = world.grid().exists(position + side.offset());
            let face = block.face(side);
            assert_eq!(
                face.is_some(),
                !neighbour_exists,
                "{:?} face of {:?} has wrong exposure",
                side,
                position
            );
            if let Some(slot) = face {
                assert!(referenced.insert(slot), "{} referenced twice", slot);
                assert!(slots.is_held(slot), "{} referenced but not held", slot);
                assert!(sink.is_visible(slot), "{} is exposed but invisible", slot);
            }
        }
    }
    assert_eq!(referenced.len(), slots.in_use());

    for index in 0..slots.high_water_mark() {
        let slot = FaceSlot::new(index as u32);
        if !referenced.contains(&slot) {
            assert!(!slots.is_held(slot));
            assert!(!sink.is_visible(slot), "released {} still visible", slot);
        }
    }
}
