use std::f64::consts::{FRAC_PI_2, PI};

use glam::{Vec3, Vec4};

use crate::input::KeyState;
use crate::math::rotate_axis_angle;

const WORLD_UP: Vec3 = Vec3::Y;
const PITCH_MARGIN: f64 = 0.001;
const BASE_PITCH: f64 = FRAC_PI_2;

/// Tuning knobs for [`FlyCamera`]. The defaults reproduce the featureful
/// behavior (exponential speed, sliders); `exponential_speed = false` and
/// `sliders_enabled = false` select the plain fixed-speed flight model.
#[derive(Debug, Clone, Copy)]
pub struct CameraTuning {
    /// Radians of rotation per pointer unit.
    pub sensitivity: f64,
    /// Distance travelled per frame per held movement key.
    pub move_step: f32,
    /// Extra multiplier on forward motion only.
    pub forward_boost: f32,
    /// Movement scale while the precision key is held.
    pub precision_scale: f32,
    /// Change to the speed scalar per frame per held speed key.
    pub speed_step: f32,
    /// Scale movement and the published speed by `exp(speed - 1)`.
    pub exponential_speed: bool,
    /// React to the slider keys.
    pub sliders_enabled: bool,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            sensitivity: 0.003,
            move_step: 1.0,
            forward_boost: 1.5,
            precision_scale: 0.2,
            speed_step: 0.01,
            exponential_speed: true,
            sliders_enabled: true,
        }
    }
}

/// First-person fly camera driven by raw pointer samples and per-frame key
/// snapshots.
///
/// Orientation lives in an explicitly maintained orthonormal basis rather
/// than quaternions or rebuilt Euler matrices: each frame `direction` is
/// rotated incrementally (pitch about the current right axis, then yaw
/// about world up) and `right` is recomputed from world up and the new
/// direction, so the basis cannot drift out of orthogonality over time.
///
/// Pointer samples are edge-triggered: each sample queues pitch/yaw deltas
/// that the next [`update`](Self::update) consumes exactly once. The first
/// sample after creation only calibrates the pointer origin and produces no
/// rotation.
pub struct FlyCamera {
    tuning: CameraTuning,
    position: Vec3,
    position_fixed: Vec3,
    direction: Vec3,
    right: Vec3,
    pointer_origin: Option<(f64, f64)>,
    yaw: f64,
    pitch: f64,
    yaw_delta: f64,
    pitch_delta: f64,
    clamped_pitch: f64,
    speed: f32,
    sliders: Vec4,
}

impl FlyCamera {
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            tuning,
            position: Vec3::ZERO,
            position_fixed: Vec3::ZERO,
            direction: Vec3::Z,
            right: Vec3::X,
            pointer_origin: None,
            yaw: 0.0,
            pitch: BASE_PITCH,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            clamped_pitch: BASE_PITCH,
            speed: 1.0,
            sliders: Vec4::ZERO,
        }
    }

    /// Feeds one raw pointer position.
    ///
    /// Deltas are derived from the absolute offset against the calibration
    /// origin and the rotation already applied, so dropping intermediate
    /// samples (a latest-sample-wins queue) cannot lose rotation.
    pub fn pointer_sample(&mut self, x: f64, y: f64) {
        let (origin_x, origin_y) = match self.pointer_origin {
            Some(origin) => origin,
            None => {
                self.pointer_origin = Some((x, y));
                self.yaw = 0.0;
                self.pitch = BASE_PITCH;
                self.yaw_delta = 0.0;
                self.pitch_delta = 0.0;
                return;
            }
        };
        self.pitch_delta = (y - origin_y) * self.tuning.sensitivity + BASE_PITCH - self.pitch;
        self.yaw_delta = (x - origin_x) * self.tuning.sensitivity - self.yaw;
        self.yaw += self.yaw_delta;
        self.pitch += self.pitch_delta;
    }

    /// Advances the camera by one frame: applies the queued rotation, then
    /// integrates movement from the held keys.
    ///
    /// The order is load-bearing. Pitch rotates about the frame's incoming
    /// right axis, yaw about world up, and only then is `right` recomputed
    /// from the new direction; movement reads the recomputed basis.
    pub fn update(&mut self, keys: &KeyState) {
        let target_pitch =
            (self.clamped_pitch + self.pitch_delta).clamp(PITCH_MARGIN, PI - PITCH_MARGIN);
        self.direction = rotate_axis_angle(
            self.direction,
            self.right,
            (target_pitch - self.clamped_pitch) as f32,
        );
        self.direction = rotate_axis_angle(self.direction, WORLD_UP, self.yaw_delta as f32);
        self.right = WORLD_UP.cross(self.direction).normalize();
        self.clamped_pitch = target_pitch;
        self.pitch_delta = 0.0;
        self.yaw_delta = 0.0;

        let step = self.tuning.move_step;
        let mut movement = Vec3::ZERO;
        let mut movement_fixed = Vec3::ZERO;
        if keys.forward {
            movement += self.direction * (step * self.tuning.forward_boost);
            movement_fixed += Vec3::new(0.0, 0.0, step * self.tuning.forward_boost);
        }
        if keys.backward {
            movement -= self.direction * step;
            movement_fixed -= Vec3::new(0.0, 0.0, step);
        }
        if keys.left {
            movement -= self.right * step;
            movement_fixed -= Vec3::new(step, 0.0, 0.0);
        }
        if keys.right {
            movement += self.right * step;
            movement_fixed += Vec3::new(step, 0.0, 0.0);
        }
        if keys.up {
            movement += WORLD_UP * step;
            movement_fixed += Vec3::new(0.0, step, 0.0);
        }
        if keys.down {
            movement -= WORLD_UP * step;
            movement_fixed -= Vec3::new(0.0, step, 0.0);
        }
        if keys.speed_down {
            self.speed -= self.tuning.speed_step;
        }
        if keys.speed_up {
            self.speed += self.tuning.speed_step;
        }
        if self.tuning.sliders_enabled {
            for i in 0..4 {
                if keys.slider_down[i] {
                    self.sliders[i] -= 1.0;
                }
                if keys.slider_up[i] {
                    self.sliders[i] += 1.0;
                }
            }
        }

        let mut movement_scale = 1.0;
        if keys.precision {
            movement_scale = self.tuning.precision_scale;
        }
        let scale = movement_scale * self.speed_factor();
        self.position += movement * scale;
        self.position_fixed += movement_fixed * scale;
    }

    /// Free-flight position accumulated in camera space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Position accumulated along fixed world axes regardless of where the
    /// camera points; gives shaders a view-independent motion signal.
    pub fn position_fixed(&self) -> Vec3 {
        self.position_fixed
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Unit right axis, `world_up x direction` normalized.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Auxiliary shader parameters adjusted by the slider keys.
    pub fn sliders(&self) -> Vec4 {
        self.sliders
    }

    /// Movement multiplier, `exp(speed - 1)` or a constant 1.0 for the
    /// fixed-speed configuration. Also published to shaders as a uniform.
    pub fn speed_factor(&self) -> f32 {
        if self.tuning.exponential_speed {
            (self.speed - 1.0).exp()
        } else {
            1.0
        }
    }

    /// Applied pitch in radians, strictly inside `(0, pi)`.
    pub fn pitch(&self) -> f64 {
        self.clamped_pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENSITIVITY: f64 = 0.003;

    fn camera() -> FlyCamera {
        FlyCamera::new(CameraTuning::default())
    }

    fn assert_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < 1e-5,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn first_pointer_sample_is_calibration_only() {
        let mut cam = camera();
        cam.pointer_sample(100.0, 100.0);
        cam.update(&KeyState::default());
        assert_close(cam.direction(), Vec3::Z);
        assert_close(cam.right(), Vec3::X);
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn pointer_offset_yaws_once() {
        let mut cam = camera();
        cam.pointer_sample(100.0, 100.0);
        cam.pointer_sample(110.0, 100.0);
        cam.update(&KeyState::default());

        let angle = (10.0 * SENSITIVITY) as f32;
        let expected = Vec3::new(angle.sin(), 0.0, angle.cos());
        assert_close(cam.direction(), expected);

        // The delta was consumed; a second update without a new sample must
        // not rotate again.
        cam.update(&KeyState::default());
        assert_close(cam.direction(), expected);
    }

    #[test]
    fn absolute_pointer_offset_determines_total_yaw() {
        let mut cam = camera();
        cam.pointer_sample(100.0, 100.0);
        cam.pointer_sample(110.0, 100.0);
        cam.update(&KeyState::default());
        cam.pointer_sample(150.0, 100.0);
        cam.update(&KeyState::default());

        let angle = (50.0 * SENSITIVITY) as f32;
        assert_close(cam.direction(), Vec3::new(angle.sin(), 0.0, angle.cos()));
    }

    #[test]
    fn pitch_stays_strictly_between_poles() {
        let mut cam = camera();
        cam.pointer_sample(0.0, 0.0);
        cam.pointer_sample(0.0, 1.0e6);
        cam.update(&KeyState::default());
        assert!(cam.pitch() > 0.0 && cam.pitch() < PI);
        assert!((cam.pitch() - (PI - 0.001)).abs() < 1e-9);
        assert!(cam.direction().y < -0.999);
        assert!((cam.direction().length() - 1.0).abs() < 1e-5);

        cam.pointer_sample(0.0, -1.0e6);
        cam.update(&KeyState::default());
        assert!(cam.pitch() > 0.0 && cam.pitch() < PI);
        assert!((cam.pitch() - 0.001).abs() < 1e-9);
        assert!(cam.direction().y > 0.999);
    }

    #[test]
    fn no_keys_means_no_motion() {
        let mut cam = camera();
        cam.pointer_sample(42.0, 7.0);
        for _ in 0..32 {
            cam.update(&KeyState::default());
        }
        assert_eq!(cam.position(), Vec3::ZERO);
        assert_eq!(cam.position_fixed(), Vec3::ZERO);
        assert_close(cam.direction(), Vec3::Z);
    }

    #[test]
    fn forward_moves_with_boost() {
        let mut cam = camera();
        let keys = KeyState {
            forward: true,
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_close(cam.position(), Vec3::new(0.0, 0.0, 1.5));
        assert_close(cam.position_fixed(), Vec3::new(0.0, 0.0, 1.5));

        let keys = KeyState {
            backward: true,
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_close(cam.position(), Vec3::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn strafe_and_vertical_follow_basis() {
        let mut cam = camera();
        let keys = KeyState {
            left: true,
            up: true,
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_close(cam.position(), Vec3::new(-1.0, 1.0, 0.0));
        assert_close(cam.position_fixed(), Vec3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn precision_key_scales_movement() {
        let mut cam = camera();
        let keys = KeyState {
            forward: true,
            precision: true,
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_close(cam.position(), Vec3::new(0.0, 0.0, 0.3));
    }

    #[test]
    fn speed_keys_feed_exponential_factor() {
        let mut cam = camera();
        let keys = KeyState {
            speed_up: true,
            ..KeyState::default()
        };
        for _ in 0..100 {
            cam.update(&keys);
        }
        assert_eq!(cam.position(), Vec3::ZERO);
        assert!((cam.speed_factor() - std::f32::consts::E).abs() < 1e-3);

        let keys = KeyState {
            forward: true,
            ..KeyState::default()
        };
        cam.update(&keys);
        assert!((cam.position().z - 1.5 * std::f32::consts::E).abs() < 1e-2);
    }

    #[test]
    fn fixed_speed_configuration_ignores_speed_scalar() {
        let mut cam = FlyCamera::new(CameraTuning {
            exponential_speed: false,
            ..CameraTuning::default()
        });
        let keys = KeyState {
            speed_up: true,
            ..KeyState::default()
        };
        for _ in 0..50 {
            cam.update(&keys);
        }
        assert_eq!(cam.speed_factor(), 1.0);

        let keys = KeyState {
            forward: true,
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_close(cam.position(), Vec3::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn sliders_accumulate_per_frame() {
        let mut cam = camera();
        let keys = KeyState {
            slider_up: [false, true, false, false],
            ..KeyState::default()
        };
        for _ in 0..3 {
            cam.update(&keys);
        }
        let keys = KeyState {
            slider_down: [true, false, false, false],
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_eq!(cam.sliders(), Vec4::new(-1.0, 3.0, 0.0, 0.0));
    }

    #[test]
    fn disabled_sliders_stay_zero() {
        let mut cam = FlyCamera::new(CameraTuning {
            sliders_enabled: false,
            ..CameraTuning::default()
        });
        let keys = KeyState {
            slider_up: [true; 4],
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_eq!(cam.sliders(), Vec4::ZERO);
    }

    #[test]
    fn fixed_position_ignores_view_direction() {
        let mut cam = camera();
        cam.pointer_sample(0.0, 0.0);
        // Quarter turn of yaw, then fly forward.
        cam.pointer_sample(FRAC_PI_2 / SENSITIVITY, 0.0);
        cam.update(&KeyState::default());
        assert_close(cam.direction(), Vec3::X);

        let keys = KeyState {
            forward: true,
            ..KeyState::default()
        };
        cam.update(&keys);
        assert_close(cam.position(), Vec3::new(1.5, 0.0, 0.0));
        assert_close(cam.position_fixed(), Vec3::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn right_axis_tracks_direction() {
        let mut cam = camera();
        cam.pointer_sample(0.0, 0.0);
        cam.pointer_sample(200.0, -80.0);
        cam.update(&KeyState::default());
        let right = cam.right();
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(cam.direction()).abs() < 1e-5);
        assert!(right.y.abs() < 1e-6);
    }
}
