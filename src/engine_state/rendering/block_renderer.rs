//! Block renderer of the voxel engine.
//!
//! Draws the block vertex buffer as one non-indexed triangle list over the slots below the
//! high-water mark, then the placement indicator on top. Tombstoned slots inside that range
//! are discarded by the fragment shader.
//!
//! # Pipelines
//!
//! - Fill: the normal textured pipeline
//! - Line: the same shader with `PolygonMode::Line`, only built when the device supports
//!   `POLYGON_MODE_LINE`

use wgpu::{Device, RenderPass, RenderPipeline, TextureFormat};

use crate::{
    core::StSystem,
    engine_state::buffer_state::BufferState,
};

use super::{
    bind_group_state::{
        BindGroupState, CAMERA_BIND_GROUP, CAMERA_BIND_GROUP_LAYOUT, TEXTURE_BIND_GROUP,
        TEXTURE_BIND_GROUP_LAYOUT,
    },
    face_buffer::BLOCK_VERTEX_BUFFER_NAME,
    indicator::{INDICATOR_BUFFER_NAME, INDICATOR_VERTEX_COUNT},
    vertex::BlockVertex,
};

/// Render pipelines and draw calls for blocks and the placement indicator.
pub struct BlockRenderer {
    fill_pipeline: RenderPipeline,
    line_pipeline: Option<RenderPipeline>,
    buffer_state: StSystem<BufferState>,
    bind_group_state: StSystem<BindGroupState>,
}

impl BlockRenderer {
    /// Creates the block pipelines.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Registry holding the block and indicator vertex buffers
    /// * `shader_string` - WGSL source with `vs_main` and `fs_main`
    /// * `texture_format` - Format of the surface
    /// * `bind_group_state` - Camera and atlas bind groups
    /// * `depth_stencil` - Depth state shared by both pipelines
    pub fn new(
        device: &Device,
        buffer_state: StSystem<BufferState>,
        shader_string: &str,
        texture_format: TextureFormat,
        bind_group_state: StSystem<BindGroupState>,
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> Self {
        let pipeline_layout = {
            let bind_groups = bind_group_state.get();
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Block Render Pipeline Layout"),
                bind_group_layouts: &[
                    bind_groups.get_bind_group_layout(CAMERA_BIND_GROUP_LAYOUT),
                    bind_groups.get_bind_group_layout(TEXTURE_BIND_GROUP_LAYOUT),
                ],
                push_constant_ranges: &[],
            })
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let create_pipeline = |label: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[BlockVertex::desc()],
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
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: depth_stencil.clone(),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let fill_pipeline = create_pipeline("Block Render Pipeline", wgpu::PolygonMode::Fill);
        let line_pipeline = device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| create_pipeline("Block Wireframe Pipeline", wgpu::PolygonMode::Line));

        Self {
            fill_pipeline,
            line_pipeline,
            buffer_state,
            bind_group_state,
        }
    }

    /// Whether a wireframe pipeline is available.
    pub fn supports_wireframe(&self) -> bool {
        self.line_pipeline.is_some()
    }

    /// Records the draw calls of one frame.
    ///
    /// # Arguments
    /// * `render_pass` - The pass to record into
    /// * `block_vertex_count` - Vertices of the block buffer to draw, `high_water_mark * 6`
    /// * `wireframe` - Draw with the line pipeline if it exists
    pub fn render(&self, render_pass: &mut RenderPass<'_>, block_vertex_count: u32, wireframe: bool) {
        let pipeline = match (&self.line_pipeline, wireframe) {
            (Some(line_pipeline), true) => line_pipeline,
            _ => &self.fill_pipeline,
        };
        render_pass.set_pipeline(pipeline);

        let bind_groups = self.bind_group_state.get();
        render_pass.set_bind_group(0, bind_groups.get_bind_group(CAMERA_BIND_GROUP), &[]);
        render_pass.set_bind_group(1, bind_groups.get_bind_group(TEXTURE_BIND_GROUP), &[]);

        let buffer_state = self.buffer_state.get();
        if block_vertex_count > 0 {
            render_pass.set_vertex_buffer(0, buffer_state.get_buffer(BLOCK_VERTEX_BUFFER_NAME).slice(..));
            render_pass.draw(0..block_vertex_count, 0..1);
        }

        render_pass.set_vertex_buffer(0, buffer_state.get_buffer(INDICATOR_BUFFER_NAME).slice(..));
        render_pass.draw(0..INDICATOR_VERTEX_COUNT as u32, 0..1);
    }
}
