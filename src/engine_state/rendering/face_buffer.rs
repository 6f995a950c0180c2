//! The block vertex buffer as a `FaceSink`.
//!
//! Face writes from editing and streaming are staged per slot and uploaded once per frame.
//! A slot written several times in one frame (tombstoned and immediately reused, for
//! example) is uploaded once with its last quad, and runs of consecutive slots are merged
//! into a single `write_buffer` call.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::{
    core::StSystem,
    engine_state::{
        buffer_state::BufferState,
        voxels::face_slots::{FaceSink, FaceSlot},
    },
};

use super::vertex::{BlockVertex, FaceQuad, VERTICES_PER_FACE};

/// Name of the GPU buffer holding all block face quads
pub const BLOCK_VERTEX_BUFFER_NAME: &str = "block_vertex_buffer";

/// Size of one vertex in bytes
const VERTEX_SIZE: u64 = std::mem::size_of::<BlockVertex>() as u64;

/// Bytes of a block vertex buffer holding `vertex_capacity` vertices.
pub fn block_buffer_size(vertex_capacity: usize) -> wgpu::BufferAddress {
    vertex_capacity as u64 * VERTEX_SIZE
}

/// Consecutive face slots uploaded with one write.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRun {
    /// Lowest slot of the run
    pub first: FaceSlot,
    /// Quads of every slot in the run, back to back
    pub vertices: Vec<BlockVertex>,
}

impl FaceRun {
    /// Byte offset of the run in the block vertex buffer.
    pub fn byte_offset(&self) -> wgpu::BufferAddress {
        self.first.first_vertex() as u64 * VERTEX_SIZE
    }

    /// Number of face slots covered by the run.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }
}

/// Face writes waiting for the next upload, last write per slot wins.
#[derive(Default)]
pub struct StagedFaceWrites {
    pending: BTreeMap<FaceSlot, FaceQuad>,
}

impl StagedFaceWrites {
    /// Number of distinct slots waiting for upload.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no slot is waiting for upload.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Empties the stage into runs of consecutive slots, in slot order.
    pub fn drain_runs(&mut self) -> Vec<FaceRun> {
        let mut runs: Vec<FaceRun> = Vec::new();
        for (slot, quad) in std::mem::take(&mut self.pending) {
            match runs.last_mut() {
                Some(run) if run.first.index() + run.face_count() == slot.index() => {
                    run.vertices.extend_from_slice(&quad);
                }
                _ => runs.push(FaceRun {
                    first: slot,
                    vertices: quad.to_vec(),
                }),
            }
        }
        runs
    }
}

impl FaceSink for StagedFaceWrites {
    fn write_face(&mut self, slot: FaceSlot, quad: &FaceQuad) {
        self.pending.insert(slot, *quad);
    }
}

/// The GPU block vertex buffer, written through staged face writes.
pub struct GpuFaceBuffer {
    staged: StagedFaceWrites,
    buffer_state: StSystem<BufferState>,
    face_capacity: usize,
}

impl GpuFaceBuffer {
    /// Allocates a zeroed vertex buffer of `vertex_capacity` vertices.
    ///
    /// Zeroed vertices carry zero opacity, so unwritten slots draw nothing.
    pub fn new(buffer_state: StSystem<BufferState>, vertex_capacity: usize) -> Self {
        let face_capacity = vertex_capacity / VERTICES_PER_FACE;
        let size = block_buffer_size(vertex_capacity);
        buffer_state.get_mut().create_buffer(
            BLOCK_VERTEX_BUFFER_NAME,
            wgpu::BufferDescriptor {
                label: Some(BLOCK_VERTEX_BUFFER_NAME),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        );
        debug!(
            "Allocated {} bytes for {} face slots",
            size, face_capacity
        );

        Self {
            staged: StagedFaceWrites::default(),
            buffer_state,
            face_capacity,
        }
    }

    /// Uploads every staged face write.
    ///
    /// # Returns
    /// The number of `write_buffer` calls issued
    pub fn flush(&mut self) -> usize {
        if self.staged.is_empty() {
            return 0;
        }
        let faces = self.staged.len();
        let runs = self.staged.drain_runs();
        let buffer_state = self.buffer_state.get();
        for run in &runs {
            buffer_state.write_slice(BLOCK_VERTEX_BUFFER_NAME, run.byte_offset(), &run.vertices);
        }
        trace!("Flushed {} face writes in {} runs", faces, runs.len());
        runs.len()
    }
}

impl FaceSink for GpuFaceBuffer {
    fn write_face(&mut self, slot: FaceSlot, quad: &FaceQuad) {
        assert!(
            slot.index() < self.face_capacity,
            "{} is beyond the block vertex buffer ({} faces)",
            slot,
            self.face_capacity
        );
        self.staged.write_face(slot, quad);
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;

    fn quad(opacity: f32) -> FaceQuad {
        [BlockVertex::new(Point3::new(0.0, 0.0, 0.0), 0.0, 0.0, opacity); VERTICES_PER_FACE]
    }

    #[test]
    fn consecutive_slots_merge_into_one_run() {
        let mut staged = StagedFaceWrites::default();
        for index in [4, 2, 3, 9] {
            staged.write_face(FaceSlot::new(index), &quad(1.0));
        }

        let runs = staged.drain_runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].first, FaceSlot::new(2));
        assert_eq!(runs[0].face_count(), 3);
        assert_eq!(runs[1].first, FaceSlot::new(9));
        assert_eq!(runs[1].face_count(), 1);
        assert!(staged.is_empty());
    }

    #[test]
    fn last_write_to_a_slot_wins() {
        let mut staged = StagedFaceWrites::default();
        staged.write_face(FaceSlot::new(7), &BlockVertex::tombstone_quad());
        staged.write_face(FaceSlot::new(7), &quad(1.0));

        assert_eq!(staged.len(), 1);
        let runs = staged.drain_runs();
        assert!(runs[0].vertices.iter().all(|vertex| vertex.opacity == 1.0));
    }

    #[test]
    fn buffer_size_covers_every_vertex() {
        assert_eq!(block_buffer_size(0), 0);
        assert_eq!(block_buffer_size(4 * VERTICES_PER_FACE), 4 * 6 * 24);
    }

    #[test]
    fn run_offsets_are_in_bytes() {
        let run = FaceRun {
            first: FaceSlot::new(3),
            vertices: quad(1.0).to_vec(),
        };
        assert_eq!(run.byte_offset(), 3 * 6 * 24);
    }
}
