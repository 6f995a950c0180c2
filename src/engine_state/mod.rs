//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The application context owning every subsystem
//! * `buffer_state` - Manages GPU buffers for rendering
//! * `camera_state` - Handles camera positioning and movement
//! * `rendering` - Surface, pipelines and the GPU face sink
//! * `voxels` - The block window, face slots, streaming and picking
//!
//! ## Frame Flow
//!
//! Each frame runs input → camera → recenter the window on the viewer → pick → edits →
//! placement indicator → upload staged face writes → render. Everything happens on the
//! event loop thread.

use camera_state::{camera, CameraState};
use cgmath::{Deg, EuclideanSpace, Point3, Vector3};
use log::{debug, info, warn};
use rendering::{
    face_buffer::{block_buffer_size, GpuFaceBuffer, BLOCK_VERTEX_BUFFER_NAME},
    indicator::PlacementIndicator,
    vertex::VERTICES_PER_FACE,
    RenderManager,
};
use voxels::{
    block::block_type::BlockType,
    grid::VoxelGrid,
    picker::{block_containing, RayHit, RayPicker},
    streamer::WorldStreamer,
    terrain::terrain_from_config,
    world::VoxelWorld,
};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    application_state::input_state::ProcessedInputState,
    config::{EngineConfig, TerrainKind},
    core::StSystem,
};

mod buffer_state;
mod camera_state;
mod rendering;
mod voxels;

pub use rendering::atlas::AtlasImage;
pub(crate) use voxels::face_slots::MAX_FACE_SLOTS;

/// Blocks between the ground level and the spawn height
const SPAWN_CLEARANCE: i32 = 4;

/// Hotbar keys, in `BlockType` order
const BLOCK_TYPE_KEYS: [KeyCode; 3] = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];

/// Flags controlling engine behavior and rendering options
#[derive(Default)]
pub struct EngineFlags {
    /// Whether the line pipeline is used this frame
    pub wireframe: bool,
}

/// The main state container for the voxel engine
///
/// Owns the block window and every subsystem that reads or writes it, and drives them
/// once per frame from `process_input`.
pub struct EngineState {
    /// Startup configuration
    config: EngineConfig,
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// Buffer state for managing GPU buffers
    pub buffer_state: StSystem<buffer_state::BufferState>,
    /// Surface and pipelines
    pub render_manager: RenderManager,
    /// The block window and its face slots
    world: VoxelWorld,
    /// Generates blocks as the window slides
    streamer: WorldStreamer,
    /// Block selection along the view ray
    picker: RayPicker,
    /// The block vertex buffer the world writes face quads into
    face_buffer: GpuFaceBuffer,
    /// Ghost block at the placement cell
    indicator: PlacementIndicator,
    /// Type placed by the next right click
    selected_block: BlockType,
    /// Result of the latest pick
    picked: Option<RayHit>,
    /// Engine configuration flags
    flags: EngineFlags,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized
    ///
    /// The window is created centred on the spawn column and filled from the terrain
    /// before the first frame.
    ///
    /// # Arguments
    ///
    /// * `surface` - The rendering surface
    /// * `surface_config` - Configuration for the rendering surface
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    /// * `shader_string` - WGSL source of the block shader
    /// * `atlas` - Decoded block atlas
    /// * `config` - Validated startup configuration
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        shader_string: &str,
        atlas: &AtlasImage,
        config: EngineConfig,
    ) -> Self {
        let device = StSystem::new(Box::new(device));
        let queue = StSystem::new(Box::new(queue));
        let buffer_state = StSystem::new(Box::new(buffer_state::BufferState::new(
            device.clone(),
            queue.clone(),
        )));

        let block_size = config.world.block_size;
        let mut world = VoxelWorld::new(
            window_extent(&config),
            initial_window_offset(&config),
            block_size,
        );
        let mut face_buffer = GpuFaceBuffer::new(buffer_state.clone(), world.vertex_capacity());
        let indicator = PlacementIndicator::new(buffer_state.clone());

        let streamer = WorldStreamer::new(terrain_from_config(&config.terrain));
        streamer.populate(&mut world, &mut face_buffer);
        face_buffer.flush();

        let camera_projection = camera::Projection::from_config(
            surface_config.width,
            surface_config.height,
            &config.camera,
        );
        let camera_state = CameraState::new(
            buffer_state.clone(),
            &camera_projection,
            &config.camera,
            spawn_position(&config),
            Deg(-90.0),
        );

        let render_manager = RenderManager::new(
            surface,
            surface_config,
            device,
            queue,
            buffer_state.clone(),
            shader_string,
            atlas,
            camera_projection,
            config.picking.crosshair_size,
        );

        let picker = RayPicker {
            reach: config.picking.reach,
            step_size: config.picking.ray_step,
        };

        info!(
            "Engine ready: window {:?} at {:?}, {} blocks, wireframe {}",
            world.grid().extent(),
            world.grid().offset(),
            world.grid().block_count(),
            if render_manager.supports_wireframe() { "available" } else { "unsupported" }
        );

        Self {
            config,
            camera_state,
            player_actions: PlayerAction::default(),
            buffer_state,
            render_manager,
            world,
            streamer,
            picker,
            face_buffer,
            indicator,
            selected_block: BlockType::GRASS,
            picked: None,
            flags: EngineFlags::default(),
        }
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render_manager.resize_surface(size);
        self.camera_state
            .upload(&self.render_manager.camera_projection);
    }

    /// Renders the current frame
    pub fn render(&mut self) {
        self.render_manager
            .render(self.world.draw_vertex_count(), self.flags.wireframe);
    }

    /// Runs one frame of simulation on the latest player actions.
    ///
    /// # Arguments
    ///
    /// * `wait_duration` - The time elapsed since the last frame
    pub fn process_input(&mut self, wait_duration: web_time::Duration) {
        self.camera_state.intake_actions(&self.player_actions);
        self.camera_state
            .update(wait_duration, &self.render_manager.camera_projection);

        let block_size = self.world.block_size();
        let eye_block = block_containing(Point3::from_vec(
            self.camera_state.eye().to_vec() / block_size,
        ));
        if let Some(report) =
            self.streamer
                .recenter(&mut self.world, eye_block, &mut self.face_buffer)
        {
            debug!("Recentered on {:?}: {:?}", eye_block, report);
        }

        self.pick();
        if self.apply_edits() {
            self.pick();
        }

        self.indicator.update(
            placement_target(self.world.grid(), self.picked),
            self.selected_block,
            block_size,
            self.config.picking.indicator_opacity,
        );
        self.face_buffer.flush();

        if self.player_actions.log_debug_stats {
            self.log_debug_stats(eye_block);
        }
    }

    fn pick(&mut self) {
        self.picked = self.picker.pick(
            self.world.grid(),
            self.camera_state.eye(),
            self.camera_state.look(),
            self.world.block_size(),
        );
    }

    /// Applies this frame's destroy and place requests to the picked block.
    ///
    /// # Returns
    /// `true` if the world changed
    fn apply_edits(&mut self) -> bool {
        let Some(hit) = self.picked else {
            return false;
        };
        let mut changed = false;

        if self.player_actions.destroy_block {
            self.world.destroy(hit.cell, &mut self.face_buffer);
            changed = true;
        }

        if self.player_actions.place_block {
            match placement_target(self.world.grid(), Some(hit)) {
                Some(target) => {
                    self.world
                        .place(target, self.selected_block, &mut self.face_buffer);
                    changed = true;
                }
                None => debug!(
                    "Skipping placement at {:?}: outside the window or occupied",
                    hit.placement_cell()
                ),
            }
        }

        changed
    }

    fn log_debug_stats(&self, eye_block: Point3<i32>) {
        let eye = self.camera_state.eye();
        let look = self.camera_state.look();
        let slots = self.world.slots();
        info!("Viewer at {:?} (block {:?})", eye, eye_block);
        info!(
            "Looking {:?} ({:+.0}, {:+.0}, {:+.0})",
            look,
            look.x.signum(),
            look.y.signum(),
            look.z.signum()
        );
        info!(
            "Picked {:?}, placing {:?}",
            self.picked.map(|hit| hit.cell),
            self.selected_block
        );
        info!(
            "Window at {:?} holds {} blocks",
            self.world.grid().offset(),
            self.world.grid().block_count()
        );
        info!(
            "Face slots: {} in use, {} free, high-water mark {} of {}",
            slots.in_use(),
            slots.free_len(),
            slots.high_water_mark(),
            slots.capacity()
        );
        let buffer_state = self.buffer_state.get();
        info!(
            "GPU buffers: {} of {} bytes written",
            buffer_state.get_total_used_memory(),
            buffer_state.get_total_allocated_memory()
        );
        if let Some(analytics) = buffer_state.get_analytics(BLOCK_VERTEX_BUFFER_NAME) {
            info!(
                "Block buffer: {} uploads, highest byte {} of {}",
                analytics.times_written, analytics.used_memory, analytics.allocated_memory
            );
        }
    }

    /// Sets the input commands for the engine state.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = self.translate_processed_input(&input);
    }

    /// Translates the processed input state into player actions.
    ///
    /// Selection and wireframe state live on the engine; everything else is returned as the
    /// actions of this frame.
    fn translate_processed_input(&mut self, input: &ProcessedInputState) -> PlayerAction {
        let mut player_action = PlayerAction {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            move_up: input.get_key_state(KeyCode::Space).is_active(),
            move_down: input.get_key_state(KeyCode::ShiftLeft).is_active(),
            rotate_view: input.get_mouse_delta(),
            ..Default::default()
        };

        // Edits trigger once per press
        player_action.destroy_block = input
            .get_mouse_button_state(MouseButton::Left)
            .is_just_pressed();
        player_action.place_block = input
            .get_mouse_button_state(MouseButton::Right)
            .is_just_pressed();
        player_action.log_debug_stats = input.get_key_state(KeyCode::KeyR).is_just_pressed();

        for (index, key) in BLOCK_TYPE_KEYS.iter().enumerate() {
            if !input.get_key_state(*key).is_just_pressed() {
                continue;
            }
            if let Some(block_type) = BlockType::get_block_type_from_int(index as u8) {
                debug!("Selected {:?}", block_type);
                self.selected_block = block_type;
            }
        }

        let tab = input.get_key_state(KeyCode::Tab);
        if tab.is_just_pressed() && !self.render_manager.supports_wireframe() {
            warn!("Wireframe needs POLYGON_MODE_LINE, which this device lacks");
        }
        self.flags.wireframe = tab.is_active() && self.render_manager.supports_wireframe();

        player_action
    }
}

/// Where a block would be placed for `picked`: the placement cell of the hit, if it is an
/// in-window empty cell.
fn placement_target(grid: &VoxelGrid, picked: Option<RayHit>) -> Option<Point3<i32>> {
    picked
        .map(|hit| hit.placement_cell())
        .filter(|cell| grid.is_vacant(*cell))
}

/// Bytes of the block vertex buffer a window of this configuration needs.
pub fn required_block_buffer_size(config: &EngineConfig) -> u64 {
    block_buffer_size(config.world.face_capacity() as usize * VERTICES_PER_FACE)
}

/// Cells of the window per axis.
fn window_extent(config: &EngineConfig) -> Vector3<i32> {
    let world = &config.world;
    Vector3::new(world.render_distance, world.world_height, world.render_distance)
}

/// Window offset that puts block column (0, 0) in the horizontal centre.
fn initial_window_offset(config: &EngineConfig) -> Point3<i32> {
    let half = config.world.render_distance / 2;
    Point3::new(-half, 0, -half)
}

/// Camera start in world units: the middle of block column (0, 0), a little above ground.
fn spawn_position(config: &EngineConfig) -> Point3<f32> {
    let ground = match config.terrain.kind {
        TerrainKind::Perlin => config.terrain.ground_level.round() as i32,
        TerrainKind::Flat => config.terrain.flat_surface,
    };
    let block_size = config.world.block_size;
    Point3::new(
        0.5 * block_size,
        (ground + SPAWN_CLEARANCE) as f32 * block_size,
        0.5 * block_size,
    )
}

/// Represents player actions derived from input
#[derive(Debug, Default)]
pub struct PlayerAction {
    /// Movement actions - true if key is pressed or held
    pub(crate) move_forward: bool,
    pub(crate) move_backward: bool,
    pub(crate) move_left: bool,
    pub(crate) move_right: bool,
    pub(crate) move_up: bool,
    pub(crate) move_down: bool,

    /// Mouse motion in pixels since the last frame
    pub(crate) rotate_view: Option<(f64, f64)>,

    /// Actions that only trigger on press, not hold
    pub(crate) destroy_block: bool,
    pub(crate) place_block: bool,
    pub(crate) log_debug_stats: bool,
}
