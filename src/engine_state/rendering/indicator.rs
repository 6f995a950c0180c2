//! Translucent ghost block marking where the next block would be placed.
//!
//! The indicator has its own 36-vertex buffer and never takes a face slot.

use cgmath::Point3;

use crate::{
    core::StSystem,
    engine_state::{
        buffer_state::BufferState,
        voxels::{block::block_type::BlockType, mesh_sync::block_quads},
    },
};

use super::vertex::{BlockVertex, VERTICES_PER_FACE};

/// Name of the GPU buffer holding the indicator cube
pub const INDICATOR_BUFFER_NAME: &str = "indicator_vertex_buffer";

/// Vertices of the indicator cube
pub const INDICATOR_VERTEX_COUNT: usize = 6 * VERTICES_PER_FACE;

/// What the indicator currently shows.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Ghost {
    cell: Point3<i32>,
    block_type: BlockType,
    opacity: f32,
}

/// Vertices of a ghost cube at `cell`, or an invisible cube when `cell` is `None`.
pub fn indicator_vertices(
    cell: Option<Point3<i32>>,
    block_type: BlockType,
    block_size: f32,
    opacity: f32,
) -> [BlockVertex; INDICATOR_VERTEX_COUNT] {
    let mut vertices = [bytemuck::Zeroable::zeroed(); INDICATOR_VERTEX_COUNT];
    if let Some(cell) = cell {
        let quads = block_quads(cell, block_type, block_size, opacity);
        for (chunk, quad) in vertices.chunks_exact_mut(VERTICES_PER_FACE).zip(quads) {
            chunk.copy_from_slice(&quad);
        }
    }
    vertices
}

/// Owner of the indicator buffer.
pub struct PlacementIndicator {
    buffer_state: StSystem<BufferState>,
    shown: Option<Ghost>,
}

impl PlacementIndicator {
    pub fn new(buffer_state: StSystem<BufferState>) -> Self {
        let hidden = indicator_vertices(None, BlockType::GRASS, 1.0, 0.0);
        buffer_state.get_mut().create_buffer_init(
            INDICATOR_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(INDICATOR_BUFFER_NAME),
                contents: bytemuck::cast_slice(&hidden),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            },
        );

        Self {
            buffer_state,
            shown: None,
        }
    }

    /// Moves the ghost to `cell`, or hides it when `cell` is `None`.
    ///
    /// The buffer is only rewritten when the ghost actually changes.
    pub fn update(
        &mut self,
        cell: Option<Point3<i32>>,
        block_type: BlockType,
        block_size: f32,
        opacity: f32,
    ) {
        let ghost = cell.map(|cell| Ghost {
            cell,
            block_type,
            opacity,
        });
        if ghost == self.shown {
            return;
        }

        let vertices = indicator_vertices(cell, block_type, block_size, opacity);
        self.buffer_state
            .get()
            .write_slice(INDICATOR_BUFFER_NAME, 0, &vertices);
        self.shown = ghost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_indicator_is_fully_transparent() {
        let vertices = indicator_vertices(None, BlockType::STONE, 0.1, 0.6);
        assert!(vertices.iter().all(|vertex| vertex.opacity == 0.0));
    }

    #[test]
    fn shown_indicator_covers_the_target_cell() {
        let vertices = indicator_vertices(Some(Point3::new(1, 2, -3)), BlockType::DIRT, 0.5, 0.6);
        for vertex in vertices {
            assert_eq!(vertex.opacity, 0.6);
            assert!((0.5..=1.0).contains(&vertex.position[0]));
            assert!((1.0..=1.5).contains(&vertex.position[1]));
            assert!((-1.5..=-1.0).contains(&vertex.position[2]));
        }
    }
}
