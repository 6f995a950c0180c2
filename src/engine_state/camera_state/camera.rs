//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and transformations
//! - Projection matrix handling
//! - Camera controller for input processing
//! - GPU uniform buffer management
//!
//! ## Key Components
//! - `Camera`: First-person yaw/pitch camera in world units
//! - `Projection`: Perspective projection settings
//! - `CameraController`: Accumulates movement and mouse look between updates
//! - `CameraUniform`: Packed data structure for GPU shaders

use cgmath::*;
use web_time::Duration;

use crate::{config::CameraConfig, engine_state::PlayerAction};

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU's normalized device coordinates range from 0 to 1 in Z; this maps OpenGL's
/// [-1, 1] depth range onto it.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// Pitch never leaves [-89°, 89°]
const MAX_PITCH_DEGREES: f32 = 89.0;

/// A first-person camera in world space.
#[derive(Debug)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation around Y; zero looks along +X, -90° along -Z
    pub yaw: Rad<f32>,
    /// Vertical rotation, positive looks up
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a camera at `position` with the given orientation.
    ///
    /// The pitch is clamped like every later update.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: clamp_pitch(pitch.into()),
        }
    }

    /// Unit vector the camera looks along.
    pub fn get_view_vec(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.get_view_vec(), Vector3::unit_y())
    }

    /// Applies the movement and rotation accumulated in `controller` and resets it.
    ///
    /// Movement is horizontal for forward/back/strafe and vertical for up/down, scaled by
    /// `speed * dt`. Mouse look is in degrees per pixel and is not scaled by `dt`.
    pub fn get_controller_updates_and_reset_controller(
        &mut self,
        controller: &mut CameraController,
        dt: Duration,
    ) {
        let step = controller.speed * dt.as_secs_f32();

        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos);
        self.position += forward * (controller.amount_forward - controller.amount_backward) * step;
        self.position += right * (controller.amount_right - controller.amount_left) * step;
        self.position.y += (controller.amount_up - controller.amount_down) * step;

        self.yaw += Rad::from(Deg(controller.rotate_horizontal * controller.sensitivity));
        self.pitch = clamp_pitch(
            self.pitch - Rad::from(Deg(controller.rotate_vertical * controller.sensitivity)),
        );

        controller.reset();
    }
}

fn clamp_pitch(pitch: Rad<f32>) -> Rad<f32> {
    let limit: Rad<f32> = Deg(MAX_PITCH_DEGREES).into();
    Rad(pitch.0.clamp(-limit.0, limit.0))
}

/// Perspective projection parameters.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// The projection described by the camera section of the configuration.
    pub fn from_config(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self::new(
            width,
            height,
            Deg(config.fov_degrees),
            config.znear,
            config.zfar,
        )
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Calculates the projection matrix, including the OpenGL to WGPU depth transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Accumulates camera input between updates.
#[derive(Debug)]
pub struct CameraController {
    // Movement directions, 0.0 or 1.0
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,

    // Mouse motion in pixels
    rotate_horizontal: f32,
    rotate_vertical: f32,

    /// World units per second
    speed: f32,
    /// Degrees per pixel of mouse motion
    sensitivity: f32,
}

impl CameraController {
    /// Creates a controller moving at `speed` world units per second and turning
    /// `sensitivity` degrees per pixel of mouse motion.
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Records the movement keys and mouse motion of a frame.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        let amount = |active: bool| if active { 1.0 } else { 0.0 };
        self.amount_forward = amount(actions.move_forward);
        self.amount_backward = amount(actions.move_backward);
        self.amount_left = amount(actions.move_left);
        self.amount_right = amount(actions.move_right);
        self.amount_up = amount(actions.move_up);
        self.amount_down = amount(actions.move_down);
        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal += delta_x as f32;
            self.rotate_vertical += delta_y as f32;
        }
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        self.amount_forward > 0.0
            || self.amount_backward > 0.0
            || self.amount_left > 0.0
            || self.amount_right > 0.0
            || self.amount_up > 0.0
            || self.amount_down > 0.0
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    fn reset(&mut self) {
        *self = Self::new(self.speed, self.sensitivity);
    }
}

/// GPU-friendly representation of camera data for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly so we'll have to convert the Matrix4 into a 4x4 f32 array
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraUniform {
    /// Creates a new camera uniform with an identity matrix and zero position.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Updates the view-projection matrix and position based on the current camera state.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
        let pos3: [f32; 3] = camera.position.into();
        self.position = [pos3[0], pos3[1], pos3[2], 1.0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> PlayerAction {
        PlayerAction::default()
    }

    #[test]
    fn yaw_of_minus_ninety_degrees_looks_down_negative_z() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0));
        let view = camera.get_view_vec();
        assert!(view.x.abs() < 1e-6);
        assert!((view.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn forward_movement_follows_yaw_and_speed() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(45.0));
        let mut controller = CameraController::new(2.0, 0.1);
        controller.intake_actions(&PlayerAction {
            move_forward: true,
            ..actions()
        });

        camera.get_controller_updates_and_reset_controller(
            &mut controller,
            Duration::from_millis(500),
        );
        // pitch does not tilt walking
        assert!((camera.position.x - 1.0).abs() < 1e-5);
        assert!(camera.position.y.abs() < 1e-6);
        assert!(!controller.has_updates());
    }

    #[test]
    fn mouse_motion_turns_by_degrees_per_pixel() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(1.0, 0.1);
        controller.intake_actions(&PlayerAction {
            rotate_view: Some((100.0, -50.0)),
            ..actions()
        });
        camera.get_controller_updates_and_reset_controller(&mut controller, Duration::ZERO);

        assert!((Deg::from(camera.yaw).0 - 10.0).abs() < 1e-4);
        assert!((Deg::from(camera.pitch).0 - 5.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let mut controller = CameraController::new(1.0, 1.0);
        controller.intake_actions(&PlayerAction {
            rotate_view: Some((0.0, -500.0)),
            ..actions()
        });
        camera.get_controller_updates_and_reset_controller(&mut controller, Duration::ZERO);

        assert!((Deg::from(camera.pitch).0 - MAX_PITCH_DEGREES).abs() < 1e-4);
        assert!(camera.get_view_vec().y < 1.0);
    }
}
