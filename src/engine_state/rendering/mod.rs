//! Rendering system for the voxel engine.
//!
//! Owns the surface and draws the block vertex buffer that the voxel world writes through
//! `GpuFaceBuffer`, plus the placement indicator and the crosshair. The per-frame draw range
//! comes from the face slot high-water mark.

use log::{error, warn};
use pipeline_manager::PipelineManager;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, SurfaceError};

use crate::core::StSystem;

use super::{buffer_state::BufferState, camera_state::camera};

pub mod atlas;
mod bind_group_state;
mod block_renderer;
mod crosshair;
pub mod face_buffer;
pub mod indicator;
mod pipeline_manager;
mod texture;
pub mod vertex;

/// Manages the surface and the rendering pipeline of the voxel engine.
pub struct RenderManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    pub device: StSystem<Device>,
    /// The WebGPU queue for submitting command buffers
    pub queue: StSystem<Queue>,
    /// Manages the rendering pipeline and shaders
    pub pipeline_manager: PipelineManager,
    /// Camera projection settings
    pub camera_projection: camera::Projection,
}

impl RenderManager {
    /// Creates the pipelines for an already configured surface.
    ///
    /// The camera, block vertex and indicator buffers must already exist in `buffer_state`.
    ///
    /// # Arguments
    /// * `surface` - The WebGPU surface to render to
    /// * `surface_config` - Configuration for the surface
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue
    /// * `buffer_state` - Registry of the engine's GPU buffers
    /// * `shader_string` - WGSL source code of the block shader
    /// * `atlas` - Decoded block atlas
    /// * `camera_projection` - Initial camera projection settings
    /// * `crosshair_size` - Half-height of the crosshair in normalized device coordinates
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: StSystem<Device>,
        queue: StSystem<Queue>,
        buffer_state: StSystem<BufferState>,
        shader_string: &str,
        atlas: &atlas::AtlasImage,
        camera_projection: camera::Projection,
        crosshair_size: f32,
    ) -> Self {
        let pipeline_manager = PipelineManager::new(
            &device.get(),
            &queue.get(),
            &surface_config,
            surface_config.format,
            buffer_state,
            shader_string,
            atlas,
            crosshair_size,
        );

        Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            camera_projection,
        }
    }

    /// Whether the device can draw the wireframe view.
    pub fn supports_wireframe(&self) -> bool {
        self.pipeline_manager.block_renderer.supports_wireframe()
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration, camera projection, and depth texture to match the
    /// new window size. A zero-sized window (minimised) is ignored.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;

        self.surface
            .configure(&self.device.get(), &self.surface_config);

        self.camera_projection.resize(size.width, size.height);
        self.pipeline_manager
            .resize(&self.device.get(), &self.surface_config);
    }

    /// Renders a new frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    ///
    /// # Arguments
    /// * `block_vertex_count` - Vertices of the block buffer to draw
    /// * `wireframe` - Whether to draw with the line pipeline
    pub fn render(&mut self, block_vertex_count: u32, wireframe: bool) {
        let result = self.pipeline_manager.render(
            &self.surface,
            &self.device.get(),
            &self.queue.get(),
            block_vertex_count,
            wireframe,
        );

        match result {
            Ok(()) => {}
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface
                    .configure(&self.device.get(), &self.surface_config);
            }
            Err(SurfaceError::Timeout) => warn!("Timed out acquiring the next frame"),
            Err(err) => error!("Error getting current frame: {:?}", err),
        }
    }
}
