//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling and cursor capture
//! - Application lifecycle events

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, GraphicsError, MaybeGraphics};
use input_manager::InputManager;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    config::EngineConfig,
    engine_state::{required_block_buffer_size, EngineState},
};

/// The main application state container that manages the application's lifecycle.
pub struct ApplicationState {
    /// The current graphics state, which may be initializing, ready, or handed over
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// Startup configuration, handed to the engine once graphics are ready
    pub config: EngineConfig,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core game engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

/// Confines and hides the cursor for mouse look.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(err) = grabbed {
        warn!("Could not grab the cursor: {}", err);
    }
    window.set_cursor_visible(false);
}

fn is_escape(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput {
            event: KeyEvent {
                state: ElementState::Pressed,
                physical_key: PhysicalKey::Code(KeyCode::Escape),
                ..
            },
            ..
        }
    )
}

impl ApplicationState {
    /// Creates the application in its initial, graphics-building state.
    pub fn new(graphics: MaybeGraphics, config: EngineConfig) -> Self {
        Self {
            graphics,
            state: None,
            config,
        }
    }

    /// Hands the graphics resources to a new `EngineState` and starts running.
    ///
    /// Fails if a resource is missing or the device cannot hold the block vertex buffer.
    fn initialize_application_state(&mut self) -> Result<(), GraphicsError> {
        let MaybeGraphics::Graphics(gfx) = &mut self.graphics else {
            return Ok(());
        };
        let taken_gfx = std::mem::take(gfx);
        self.graphics = MaybeGraphics::Moved;

        let window = taken_gfx.window.ok_or(GraphicsError::Incomplete("a window"))?;
        let surface = taken_gfx.surface.ok_or(GraphicsError::Incomplete("a surface"))?;
        let surface_config = taken_gfx
            .surface_config
            .ok_or(GraphicsError::Incomplete("a surface configuration"))?;
        let device = taken_gfx.device.ok_or(GraphicsError::Incomplete("a device"))?;
        let queue = taken_gfx.queue.ok_or(GraphicsError::Incomplete("a queue"))?;
        let atlas = taken_gfx.atlas.ok_or(GraphicsError::Incomplete("an atlas"))?;

        let required = required_block_buffer_size(&self.config);
        let limit = device.limits().max_buffer_size;
        if required > limit {
            return Err(GraphicsError::BlockBufferTooLarge { required, limit });
        }

        let engine_state = EngineState::new(
            surface,
            surface_config,
            device,
            queue,
            &taken_gfx.shader_file_string,
            &atlas,
            self.config.clone(),
        );

        grab_cursor(&window);
        info!("Application initialized");

        self.state = Some(InitializedApplicationState {
            engine_state,
            window,
            input_manager: InputManager::new(),
            last_wait_time: web_time::Instant::now(),
        });
        Ok(())
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) || is_escape(&event) {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };
        let input_manager = &mut state.input_manager;
        let engine_state = &mut state.engine_state;

        input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                if is_focused {
                    grab_cursor(&state.window);
                } else {
                    input_manager.reset_inputs();
                }
            }
            WindowEvent::RedrawRequested => {
                engine_state.render();
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Builds the graphics the first time the application is resumed.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            if let Err(err) = builder.build_and_send(event_loop) {
                error!("Graphics initialization failed: {}", err);
                event_loop.exit();
            }
        }
    }

    /// Receives the initialized graphics and starts the engine.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        self.graphics = MaybeGraphics::Graphics(graphics);
        if let Err(err) = self.initialize_application_state() {
            error!("Cannot start the engine: {}", err);
            event_loop.exit();
        }
    }

    /// Runs the simulation for the frame and requests a redraw.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let now = web_time::Instant::now();
            let wait_dt = now - state.last_wait_time;

            state
                .engine_state
                .set_input_commands(state.input_manager.get_and_reset_processed_input());
            state.engine_state.process_input(wait_dt);

            state.last_wait_time = now;
            state.window.request_redraw();
        }
    }
}
