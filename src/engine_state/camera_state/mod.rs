//! # Camera State Management
//!
//! Ties the first-person camera to its GPU uniform buffer.
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Handles player input and updates camera state
//! - `Projection`: Manages the camera's projection matrix
//! - `CameraUniform`: GPU representation of camera data for shaders

use camera::CameraController;
use cgmath::{Deg, Point3, Vector3};

use crate::{config::CameraConfig, core::StSystem};

use super::{buffer_state::BufferState, PlayerAction};

pub mod camera;

/// The camera, its controller and the uniform buffer mirroring it.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: camera::Camera,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: camera::CameraUniform,
    /// Handles player input and camera movement
    pub camera_controller: camera::CameraController,
    /// Manages GPU buffer state for camera data
    pub buffer_state: StSystem<BufferState>,
}

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

impl CameraState {
    /// Creates the camera at `position` looking along `yaw` and uploads its uniform.
    pub fn new(
        buffer_state: StSystem<BufferState>,
        projection: &camera::Projection,
        config: &CameraConfig,
        position: Point3<f32>,
        yaw: Deg<f32>,
    ) -> Self {
        let camera = camera::Camera::new(position, yaw, Deg(0.0));
        let camera_controller = CameraController::new(config.speed, config.mouse_sensitivity);

        let mut camera_uniform = camera::CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(&camera, projection);

        buffer_state.get_mut().create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        CameraState {
            camera,
            camera_uniform,
            camera_controller,
            buffer_state,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Moves the camera by the pending controller input.
    ///
    /// # Returns
    /// `true` if the camera moved or turned, in which case the uniform was rewritten
    pub fn update(&mut self, dt: web_time::Duration, projection: &camera::Projection) -> bool {
        if !self.camera_controller.has_updates() {
            return false;
        }
        self.camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);
        self.upload(projection);
        true
    }

    /// Rewrites the uniform, for example after the projection changed.
    pub fn upload(&mut self, projection: &camera::Projection) {
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, projection);
        self.buffer_state.get().write_slice(
            CAMERA_BUFFER_NAME,
            0,
            &[self.camera_uniform],
        );
    }

    /// Eye position in world units.
    pub fn eye(&self) -> Point3<f32> {
        self.camera.position
    }

    /// Unit look direction.
    pub fn look(&self) -> Vector3<f32> {
        self.camera.get_view_vec()
    }
}
