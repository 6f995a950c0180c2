//! Vertex data structures and layouts for block face rendering.
//!
//! Every visible block face is a quad of six `BlockVertex` values written into one
//! face slot of the shared vertex buffer.

use cgmath::Point3;

/// Number of vertices that make up one face quad (two triangles, non-indexed).
pub const VERTICES_PER_FACE: usize = 6;

/// A vertex of a block face.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Opacity: f32 (4 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockVertex {
    /// Position in world space (already scaled by the block size)
    pub position: [f32; 3],
    /// UV coordinates into the texture atlas
    pub tex_coords: [f32; 2],
    /// 0.0 hides the vertex entirely, 1.0 is a solid block
    pub opacity: f32,
}

/// The six vertices of one face quad, in the order they are written to the buffer.
pub type FaceQuad = [BlockVertex; VERTICES_PER_FACE];

impl BlockVertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - The position of the vertex in world space
    /// * `u` - U texture coordinate
    /// * `v` - V texture coordinate
    /// * `opacity` - Alpha applied in the fragment shader
    pub fn new(pos: Point3<f32>, u: f32, v: f32, opacity: f32) -> Self {
        BlockVertex {
            position: [pos.x, pos.y, pos.z],
            tex_coords: [u, v],
            opacity,
        }
    }

    /// A quad whose vertices all carry zero opacity.
    ///
    /// Written into a face slot before the slot is released, so stale geometry below the
    /// high-water mark never shows up in the draw range.
    pub fn tombstone_quad() -> FaceQuad {
        [bytemuck::Zeroable::zeroed(); VERTICES_PER_FACE]
    }

    /// Returns the vertex buffer layout description for the block pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: opacity (f32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlockVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_is_24_bytes() {
        assert_eq!(std::mem::size_of::<BlockVertex>(), 24);
    }

    #[test]
    fn tombstone_quad_is_fully_transparent() {
        assert!(BlockVertex::tombstone_quad()
            .iter()
            .all(|vertex| vertex.opacity == 0.0));
    }
}
