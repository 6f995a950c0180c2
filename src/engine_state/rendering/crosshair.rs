//! Screen-centre crosshair drawn over the world.
//!
//! The crosshair is a single quad in normalized device coordinates with its own buffer and
//! pipeline. The fragment shader cuts the plus shape out of the quad using its UVs, and the
//! pipeline ignores depth so the crosshair is never hidden by blocks.

use wgpu::{Device, RenderPass, RenderPipeline, TextureFormat};

use crate::{core::StSystem, engine_state::buffer_state::BufferState};

use super::texture;

/// Name of the GPU buffer holding the crosshair quad
pub const CROSSHAIR_BUFFER_NAME: &str = "crosshair_vertex_buffer";

/// Vertices of the crosshair quad
pub const CROSSHAIR_VERTEX_COUNT: usize = 6;

/// Crosshair shader, compiled into the binary
const CROSSHAIR_SHADER: &str = include_str!("../../../assets/shaders/crosshair.wgsl");

/// A vertex of the crosshair quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CrosshairVertex {
    /// Position in normalized device coordinates
    pub position: [f32; 2],
    /// Quad-local coordinates, (0, 0) at the bottom left
    pub uv: [f32; 2],
}

impl CrosshairVertex {
    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CrosshairVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// The crosshair quad centred on screen.
///
/// `size` is the half-height of the quad in normalized device coordinates. The width is
/// divided by the aspect ratio so the crosshair stays square in pixels.
pub fn crosshair_vertices(
    width: u32,
    height: u32,
    size: f32,
) -> [CrosshairVertex; CROSSHAIR_VERTEX_COUNT] {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    let half_width = size / aspect;
    let half_height = size;

    let corner = |x: f32, y: f32| CrosshairVertex {
        position: [x * half_width, y * half_height],
        uv: [(x + 1.0) / 2.0, (y + 1.0) / 2.0],
    };
    [
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(-1.0, 1.0),
        corner(1.0, 1.0),
        corner(-1.0, 1.0),
        corner(1.0, -1.0),
    ]
}

/// Pipeline and buffer of the crosshair.
pub struct CrosshairRenderer {
    render_pipeline: RenderPipeline,
    buffer_state: StSystem<BufferState>,
    size: f32,
}

impl CrosshairRenderer {
    /// Creates the crosshair buffer for a `width x height` surface and its pipeline.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Registry the crosshair buffer is created in
    /// * `texture_format` - Format of the surface
    /// * `width`, `height` - Surface size in pixels
    /// * `size` - Half-height of the crosshair in normalized device coordinates
    pub fn new(
        device: &Device,
        buffer_state: StSystem<BufferState>,
        texture_format: TextureFormat,
        width: u32,
        height: u32,
        size: f32,
    ) -> Self {
        buffer_state.get_mut().create_buffer_init(
            CROSSHAIR_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CROSSHAIR_BUFFER_NAME),
                contents: bytemuck::cast_slice(&crosshair_vertices(width, height, size)),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            },
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Crosshair Shader"),
            source: wgpu::ShaderSource::Wgsl(CROSSHAIR_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Crosshair Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Crosshair Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[CrosshairVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // shares the pass depth attachment but never tests or writes it
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::Texture::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            buffer_state,
            size,
        }
    }

    /// Rewrites the quad for a new surface size.
    pub fn resize(&self, width: u32, height: u32) {
        self.buffer_state.get().write_slice(
            CROSSHAIR_BUFFER_NAME,
            0,
            &crosshair_vertices(width, height, self.size),
        );
    }

    /// Records the crosshair draw call.
    pub fn render(&self, render_pass: &mut RenderPass<'_>) {
        let buffer_state = self.buffer_state.get();
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, buffer_state.get_buffer(CROSSHAIR_BUFFER_NAME).slice(..));
        render_pass.draw(0..CROSSHAIR_VERTEX_COUNT as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crosshair_is_centred_and_square_in_pixels() {
        let (width, height) = (1920, 1080);
        let vertices = crosshair_vertices(width, height, 0.03);

        let xs = vertices.iter().map(|vertex| vertex.position[0]);
        let ys = vertices.iter().map(|vertex| vertex.position[1]);
        let (min_x, max_x) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let (min_y, max_y) = ys.fold((f32::MAX, f32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));

        assert!((min_x + max_x).abs() < 1e-6);
        assert!((min_y + max_y).abs() < 1e-6);
        assert!((max_y - 0.03).abs() < 1e-6);
        let pixel_width = (max_x - min_x) / 2.0 * width as f32;
        let pixel_height = (max_y - min_y) / 2.0 * height as f32;
        assert!((pixel_width - pixel_height).abs() < 1e-2);
    }

    #[test]
    fn uvs_span_the_quad() {
        let vertices = crosshair_vertices(800, 600, 0.05);
        for vertex in vertices {
            let expected_u = if vertex.position[0] < 0.0 { 0.0 } else { 1.0 };
            let expected_v = if vertex.position[1] < 0.0 { 0.0 } else { 1.0 };
            assert_eq!(vertex.uv, [expected_u, expected_v]);
        }
    }

    #[test]
    fn zero_height_surface_does_not_divide_by_zero() {
        let vertices = crosshair_vertices(640, 0, 0.03);
        assert!(vertices
            .iter()
            .all(|vertex| vertex.position.iter().all(|component| component.is_finite())));
    }
}
