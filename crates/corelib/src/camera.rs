//! Free-fly camera driven by held keys and right-button mouse look.
//!
//! The camera keeps a single camera-to-world matrix (left-handed, +Z forward)
//! and edits it in place every tick. There is no smoothing: movement is a
//! local-space translation, look is pitch around the camera's own X axis and
//! yaw around world Y, both applied about the camera's origin.

use crate::input::CameraInput;
use crate::{Mat4, Vec2, Vec3, Vec4};

pub const DEFAULT_FOV_Y_DEG: f32 = 70.0;
pub const DEFAULT_Z_NEAR: f32 = 0.01;
pub const DEFAULT_Z_FAR: f32 = 100.0;

/// Starting pose of the viewer.
pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 0.7, -1.5);
pub const DEFAULT_TARGET: Vec3 = Vec3::new(0.0, -0.1, 0.0);

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub camera_to_world: Mat4,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
    prev_pointer: Option<Vec2>,
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, aspect: f32) -> Self {
        Self {
            camera_to_world: Mat4::look_at_lh(eye, target, up).inverse(),
            fov_y_rad: DEFAULT_FOV_Y_DEG.to_radians(),
            z_near: DEFAULT_Z_NEAR,
            z_far: DEFAULT_Z_FAR,
            aspect,
            prev_pointer: None,
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.camera_to_world.inverse()
    }

    /// Vertical field of view, widened for portrait targets.
    #[inline]
    pub fn effective_fov_y(&self) -> f32 {
        if self.aspect < 1.0 {
            self.fov_y_rad * 2.0
        } else {
            self.fov_y_rad
        }
    }

    /// D3D-style projection: depth lands in [0, 1], which is what wgpu expects.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_lh(
            self.effective_fov_y(),
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.camera_to_world.w_axis.truncate()
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.camera_to_world.z_axis.truncate()
    }

    /// Advance one tick. `move_speed` is units per second, `rot_speed`
    /// radians per pixel per second.
    pub fn update(&mut self, dt: f32, input: &CameraInput, move_speed: f32, rot_speed: f32) {
        let step = input.keys.direction() * (move_speed * dt);
        if step != Vec3::ZERO {
            self.camera_to_world *= Mat4::from_translation(step);
        }

        if let Some(pointer) = input.pointer {
            if pointer.look_held {
                if let Some(prev) = self.prev_pointer {
                    let delta = pointer.position - prev;
                    self.look(delta.x * rot_speed * dt, delta.y * rot_speed * dt);
                }
            }
            self.prev_pointer = Some(pointer.position);
        }
    }

    fn look(&mut self, yaw: f32, pitch: f32) {
        let position = self.camera_to_world.w_axis;
        let mut m = self.camera_to_world;
        m.w_axis = Vec4::W;
        m = Mat4::from_rotation_y(yaw) * m * Mat4::from_rotation_x(pitch);
        m.w_axis = position;
        self.camera_to_world = m;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(DEFAULT_EYE, DEFAULT_TARGET, Vec3::Y, 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MoveKeys, PointerState};

    fn held(keys: MoveKeys) -> CameraInput {
        CameraInput { keys, pointer: None }
    }

    #[test]
    fn starts_at_default_eye() {
        let cam = Camera::default();
        assert!((cam.position() - DEFAULT_EYE).length() < 1e-5);
        let expected = (DEFAULT_TARGET - DEFAULT_EYE).normalize();
        assert!((cam.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn forward_key_moves_along_local_z() {
        let mut cam = Camera::default();
        let start = cam.position();
        let forward = cam.forward();
        let keys = MoveKeys {
            forward: true,
            ..Default::default()
        };
        cam.update(1.0, &held(keys), 1.0, 0.75);
        assert!((cam.position() - (start + forward)).length() < 1e-5);
    }

    #[test]
    fn opposite_keys_leave_camera_in_place() {
        let mut cam = Camera::default();
        let before = cam.camera_to_world;
        let keys = MoveKeys {
            forward: true,
            back: true,
            up: true,
            down: true,
            ..Default::default()
        };
        cam.update(0.5, &held(keys), 1.0, 0.75);
        assert_eq!(cam.camera_to_world, before);
    }

    #[test]
    fn look_requires_button_and_previous_sample() {
        let mut cam = Camera::default();
        let before = cam.camera_to_world;
        let at = |x: f32, look_held: bool| CameraInput {
            keys: MoveKeys::default(),
            pointer: Some(PointerState {
                position: Vec2::new(x, 0.0),
                look_held,
            }),
        };

        // First sample only seeds the previous position.
        cam.update(1.0, &at(10.0, true), 1.0, 0.75);
        assert_eq!(cam.camera_to_world, before);

        // Moving without the button updates the sample but does not rotate.
        cam.update(1.0, &at(30.0, false), 1.0, 0.75);
        assert_eq!(cam.camera_to_world, before);

        cam.update(1.0, &at(31.0, true), 1.0, 0.75);
        assert_ne!(cam.forward(), before.z_axis.truncate());
        assert!((cam.position() - DEFAULT_EYE).length() < 1e-5);
    }

    #[test]
    fn yaw_turns_towards_positive_x() {
        let mut cam = Camera::look_at(Vec3::ZERO, Vec3::Z, Vec3::Y, 1.0);
        cam.look(std::f32::consts::FRAC_PI_2, 0.0);
        assert!((cam.forward() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn portrait_doubles_fov() {
        let cam = Camera::default().with_aspect(0.5);
        assert!((cam.effective_fov_y() - 2.0 * DEFAULT_FOV_Y_DEG.to_radians()).abs() < 1e-6);
    }
}
