//! Owns the render pass of a frame and the resources shared by the block pipelines.
//!
//! # Resource Management
//!
//! The pipeline manager initializes and maintains:
//!
//! - Bind groups for the camera and the block atlas
//! - The depth texture, recreated on resize
//! - The `BlockRenderer` holding the fill and wireframe pipelines
//! - The `CrosshairRenderer`, drawn last

use wgpu::{Device, Queue, Surface, SurfaceConfiguration, SurfaceError, TextureFormat};

use crate::{core::StSystem, engine_state::buffer_state::BufferState};

use super::{
    atlas::AtlasImage,
    bind_group_state::BindGroupState,
    block_renderer::BlockRenderer,
    crosshair::CrosshairRenderer,
    texture,
};

/// Sky colour the frame is cleared to
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.74,
    b: 0.92,
    a: 1.0,
};

/// Coordinates the render pass and the resources shared by the block pipelines.
pub struct PipelineManager {
    /// Depth texture used for depth testing
    pub depth_texture: texture::Texture,
    /// Pipelines and draw calls for blocks
    pub block_renderer: BlockRenderer,
    /// Screen-centre crosshair
    pub crosshair: CrosshairRenderer,
}

impl PipelineManager {
    /// Creates a new `PipelineManager` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue used to upload the atlas
    /// * `config` - Surface configuration containing size and format
    /// * `texture_format` - The texture format to use for rendering
    /// * `buffer_state` - Registry with the camera, block and indicator buffers already created
    /// * `shader_string` - The WGSL source of the block shader
    /// * `atlas` - Decoded atlas pixels
    /// * `crosshair_size` - Half-height of the crosshair in normalized device coordinates
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &Device,
        queue: &Queue,
        config: &SurfaceConfiguration,
        texture_format: TextureFormat,
        buffer_state: StSystem<BufferState>,
        shader_string: &str,
        atlas: &AtlasImage,
        crosshair_size: f32,
    ) -> Self {
        let atlas_texture = texture::Texture::from_atlas(device, queue, atlas, "BLOCK ATLAS");
        let bind_group_state = StSystem::new(Box::new(BindGroupState::new(
            device,
            &buffer_state.get(),
            atlas_texture,
        )));

        let depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let crosshair = CrosshairRenderer::new(
            device,
            buffer_state.clone(),
            texture_format,
            config.width,
            config.height,
            crosshair_size,
        );

        let block_renderer = BlockRenderer::new(
            device,
            buffer_state,
            shader_string,
            texture_format,
            bind_group_state,
            depth_stencil,
        );

        Self {
            depth_texture,
            block_renderer,
            crosshair,
        }
    }

    /// Renders a frame to the given surface.
    ///
    /// # Arguments
    /// * `surface` - The target surface to render to
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for command submission
    /// * `block_vertex_count` - Vertices of the block buffer inside the draw range
    /// * `wireframe` - Whether to draw with the line pipeline
    ///
    /// # Errors
    /// Returns the surface error if no frame could be acquired.
    pub fn render(
        &mut self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        block_vertex_count: u32,
        wireframe: bool,
    ) -> Result<(), SurfaceError> {
        let frame = surface.get_current_texture()?;

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&Default::default());
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });
            self.block_renderer
                .render(&mut rpass, block_vertex_count, wireframe);
            self.crosshair.render(&mut rpass);
        }

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Recreates the depth texture and the crosshair quad for a new surface size.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
        self.crosshair.resize(config.width, config.height);
    }
}
