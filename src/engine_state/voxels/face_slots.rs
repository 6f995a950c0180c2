//! Allocation of face slots in the shared block vertex buffer.
//!
//! A face slot is the region of six vertices that holds one face quad. Slots are handed out
//! from a free list first and from the high-water mark second, so the draw range
//! `[0, high_water_mark * 6)` only ever grows to the largest number of faces that were
//! simultaneously visible.

use std::fmt;

use bitvec::vec::BitVec;
use log::trace;

use crate::engine_state::rendering::vertex::{BlockVertex, FaceQuad, VERTICES_PER_FACE};

/// Largest slot capacity whose draw range still fits a `u32` vertex count.
pub const MAX_FACE_SLOTS: usize = u32::MAX as usize / VERTICES_PER_FACE;

/// Identifier of one face quad in the block vertex buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceSlot(u32);

impl FaceSlot {
    /// Creates a slot id from its raw index.
    pub fn new(index: u32) -> Self {
        FaceSlot(index)
    }

    /// Raw index of the slot.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Index of the first vertex of this slot.
    pub fn first_vertex(self) -> usize {
        self.index() * VERTICES_PER_FACE
    }
}

impl fmt::Display for FaceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face slot {}", self.0)
    }
}

/// Destination of face quads, keyed by slot.
///
/// The renderer implements this on top of the GPU vertex buffer. Any implementation must
/// store `quad` at vertices `[slot * 6, slot * 6 + 6)`.
pub trait FaceSink {
    /// Writes a face quad into `slot`, replacing whatever was there.
    fn write_face(&mut self, slot: FaceSlot, quad: &FaceQuad);
}

/// Free-list allocator of face slots with a fixed capacity.
///
/// Invariant: `in_use() + free_len() == high_water_mark()`.
pub struct FaceSlotAllocator {
    free: Vec<FaceSlot>,
    held: BitVec,
    high_water_mark: u32,
    in_use: usize,
    capacity: u32,
}

impl FaceSlotAllocator {
    /// Creates an allocator for a buffer that holds `capacity` face quads.
    ///
    /// # Panics
    /// Panics if `capacity` exceeds `MAX_FACE_SLOTS`.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= MAX_FACE_SLOTS,
            "face slot capacity {} exceeds the limit of {}",
            capacity,
            MAX_FACE_SLOTS
        );
        let capacity = capacity as u32;
        FaceSlotAllocator {
            free: Vec::new(),
            held: BitVec::new(),
            high_water_mark: 0,
            in_use: 0,
            capacity,
        }
    }

    /// Hands out a slot, reusing released slots before growing the high-water mark.
    ///
    /// # Panics
    /// Panics if every slot of the buffer is held.
    pub fn acquire(&mut self) -> FaceSlot {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                assert!(
                    self.high_water_mark < self.capacity,
                    "face slot capacity of {} exhausted",
                    self.capacity
                );
                let slot = FaceSlot(self.high_water_mark);
                self.high_water_mark += 1;
                self.held.push(false);
                slot
            }
        };

        self.held.set(slot.index(), true);
        self.in_use += 1;
        trace!("Acquired {}", slot);
        slot
    }

    /// Tombstones `slot` through `sink` and returns it to the free list.
    ///
    /// The zero-opacity quad is written before the slot becomes reusable, so a released
    /// slot never renders stale geometry.
    ///
    /// # Panics
    /// Panics if `slot` is not currently held.
    pub fn release(&mut self, slot: FaceSlot, sink: &mut impl FaceSink) {
        assert!(
            self.is_held(slot),
            "released {} which is not held (double release or foreign slot)",
            slot
        );

        sink.write_face(slot, &BlockVertex::tombstone_quad());
        self.held.set(slot.index(), false);
        self.in_use -= 1;
        self.free.push(slot);
        trace!("Released {}", slot);
    }

    /// Whether `slot` is currently handed out.
    pub fn is_held(&self, slot: FaceSlot) -> bool {
        self.held.get(slot.index()).is_some_and(|held| *held)
    }

    /// Number of slots currently handed out.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Number of released slots waiting to be reused.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// One past the highest slot ever handed out.
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark as usize
    }

    /// Number of vertices the draw call has to cover.
    pub fn draw_vertex_count(&self) -> u32 {
        self.high_water_mark * VERTICES_PER_FACE as u32
    }

    /// Maximum number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }
}
