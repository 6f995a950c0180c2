//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources required by the application:
//! the window, the WebGPU device and surface, and the assets the block renderer needs.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Helper for asynchronous graphics initialization
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::{future::Future, path::Path, sync::Arc};

use log::{info, warn};
use thiserror::Error;
use wgpu::{Device, Features, Queue, Surface, SurfaceConfiguration};
use winit::{
    dpi::PhysicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{config::EngineConfig, engine_state::AtlasImage};

/// Block shader compiled into the binary, used when the configured file cannot be read
const BUILTIN_BLOCK_SHADER: &str = include_str!("../../assets/shaders/block.wgsl");

/// Failures while bringing up the window and GPU.
#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("failed to create the window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create the surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open the GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("the surface supports no texture format on this adapter")]
    NoSurfaceFormat,
    #[error("graphics arrived without {0}")]
    Incomplete(&'static str),
    #[error("the block vertex buffer needs {required} bytes, the device allows {limit}")]
    BlockBufferTooLarge { required: u64, limit: u64 },
}

/// Contains all graphics-related resources required by the application.
#[derive(Default)]
pub struct Graphics {
    pub window: Option<Arc<Window>>,
    pub surface: Option<Surface<'static>>,
    pub surface_config: Option<SurfaceConfiguration>,
    pub device: Option<Device>,
    pub queue: Option<Queue>,
    pub shader_file_string: String,
    pub atlas: Option<AtlasImage>,
}

/// Reads the block shader, falling back to the built-in copy.
fn read_block_shader(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => {
            info!("Loaded block shader {}", path.display());
            source
        }
        Err(err) => {
            warn!(
                "Could not read block shader {} ({}), using the built-in shader",
                path.display(),
                err
            );
            BUILTIN_BLOCK_SHADER.to_owned()
        }
    }
}

/// Creates the window and starts the asynchronous GPU initialization.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
/// * `config` - Window size and title, asset paths
///
/// # Returns
/// A `Future` that resolves to the initialized `Graphics` when complete
fn create_graphics(
    event_loop: &ActiveEventLoop,
    config: &EngineConfig,
) -> Result<impl Future<Output = Result<Graphics, GraphicsError>> + 'static, GraphicsError> {
    let window_attrs = Window::default_attributes()
        .with_title(config.window.title.clone())
        .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));

    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;
    let shader_path = config.assets.block_shader.clone();
    let atlas_path = config.assets.atlas.clone();

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info());

        // wireframe is optional; only ask for it where the adapter has it
        let required_features = adapter.features() & Features::POLYGON_MODE_LINE;
        let required_limits = wgpu::Limits {
            max_buffer_size: adapter.limits().max_buffer_size,
            ..wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features,
                required_limits,
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GraphicsError::NoSurfaceFormat)?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok(Graphics {
            window: Some(window),
            surface: Some(surface),
            surface_config: Some(surface_config),
            device: Some(device),
            queue: Some(queue),
            shader_file_string: read_block_shader(&shader_path),
            atlas: Some(AtlasImage::load_or_procedural(&atlas_path)),
        })
    })
}

/// Helper struct for managing the asynchronous initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
    config: EngineConfig,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// State during asynchronous graphics initialization
    Builder(GraphicsBuilder),

    /// State when graphics resources are fully initialized and ready for use
    Graphics(Graphics),

    /// State after graphics resources have been moved to another owner
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the main thread
    /// * `config` - Startup configuration
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>, config: EngineConfig) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
            config,
        }
    }

    /// Builds the graphics resources and sends them back through the event loop proxy.
    ///
    /// On failure the error is returned and nothing is sent.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) -> Result<(), GraphicsError> {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return Ok(());
        };

        let gfx = pollster::block_on(create_graphics(event_loop, &self.config)?)?;
        if event_loop_proxy.send_event(gfx).is_err() {
            warn!("Event loop closed before the graphics were ready");
        }
        Ok(())
    }
}
