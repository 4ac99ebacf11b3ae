//! Camera state machine: orbit a body or fly freely.
//!
//! Yaw and pitch are shared by both modes. In orbit mode they place the camera
//! on a sphere of radius `distance` around the target body; in free-fly mode
//! they give the direction of travel and gaze.

use glam::{Mat4, Vec3};

/// Which body the camera follows, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Orbit the body at this index.
    OrbitBody(usize),
    /// Move independently of the bodies.
    FreeFly,
}

impl CameraMode {
    /// Step forward through `OrbitBody(0) .. OrbitBody(n - 1), FreeFly`, wrapping.
    pub fn next(self, body_count: usize) -> Self {
        match self {
            Self::OrbitBody(index) if index + 1 < body_count => Self::OrbitBody(index + 1),
            Self::OrbitBody(_) => Self::FreeFly,
            Self::FreeFly if body_count > 0 => Self::OrbitBody(0),
            Self::FreeFly => Self::FreeFly,
        }
    }

    /// Step backward through the same order, wrapping.
    pub fn previous(self, body_count: usize) -> Self {
        match self {
            Self::OrbitBody(0) => Self::FreeFly,
            Self::OrbitBody(index) if body_count > 0 => {
                Self::OrbitBody((index - 1).min(body_count - 1))
            }
            Self::OrbitBody(_) => Self::FreeFly,
            Self::FreeFly if body_count > 0 => Self::OrbitBody(body_count - 1),
            Self::FreeFly => Self::FreeFly,
        }
    }

    pub fn target(self) -> Option<usize> {
        match self {
            Self::OrbitBody(index) => Some(index),
            Self::FreeFly => None,
        }
    }
}

/// Tuning for [`CameraController`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    /// Radians per pixel of drag.
    pub sensitivity: f32,
    /// Distance change per scroll line.
    pub scroll_step: f32,
    /// Free-fly speed in world units per second.
    pub move_speed: f32,
    pub pitch_limit: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.005,
            scroll_step: 0.5,
            move_speed: 5.0,
            pitch_limit: 1.5,
            min_distance: 1.0,
            max_distance: 100.0,
        }
    }
}

/// Camera limits that would make clamping meaningless.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraSettingsError {
    #[error("pitch limit {0} must be finite and not negative")]
    PitchLimit(f32),

    #[error("distance range [{min}, {max}] must be finite, positive and ordered")]
    DistanceRange { min: f32, max: f32 },
}

impl CameraSettings {
    /// Reject limits that [`CameraController`] cannot clamp against.
    pub fn validate(&self) -> Result<(), CameraSettingsError> {
        if !self.pitch_limit.is_finite() || self.pitch_limit < 0.0 {
            return Err(CameraSettingsError::PitchLimit(self.pitch_limit));
        }
        let (min, max) = (self.min_distance, self.max_distance);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(CameraSettingsError::DistanceRange { min, max });
        }
        Ok(())
    }
}

/// Camera pose and the inputs it is derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub mode: CameraMode,
    pub yaw: f32,
    pub pitch: f32,
    /// Orbit radius around the target; unused in free-fly.
    pub distance: f32,
    pub position: Vec3,
    pub look_target: Vec3,
    pub up: Vec3,
}

impl CameraState {
    pub fn new(mode: CameraMode, yaw: f32, pitch: f32, distance: f32) -> Self {
        Self {
            mode,
            yaw,
            pitch,
            distance,
            position: Vec3::ZERO,
            look_target: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }

    /// Right-handed view matrix for the current pose.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_target, self.up)
    }

    /// Unit vector from yaw and pitch, shared by the orbit offset and the
    /// free-fly forward direction.
    pub fn forward(&self) -> Vec3 {
        spherical_direction(self.yaw, self.pitch)
    }
}

/// Movement keys held during the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

/// Applies pointer input and per-frame updates to a [`CameraState`].
#[derive(Debug, Clone, Default)]
pub struct CameraController {
    pub settings: CameraSettings,
}

impl CameraController {
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }

    /// Rotate by a pointer drag in pixels. Dragging down looks up.
    pub fn on_drag(&self, state: &mut CameraState, dx: f32, dy: f32) {
        state.yaw += dx * self.settings.sensitivity;
        state.pitch = self.clamp_pitch(state.pitch - dy * self.settings.sensitivity);
    }

    /// Zoom by a scroll delta in lines. Applied in every mode.
    pub fn on_scroll(&self, state: &mut CameraState, lines: f32) {
        state.distance = self.clamp_distance(state.distance - lines * self.settings.scroll_step);
    }

    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        let limit = self.settings.pitch_limit;
        pitch.clamp(-limit, limit)
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.settings.min_distance, self.settings.max_distance)
    }

    /// Recompute position, look target and up for this frame.
    ///
    /// `body_positions` must already hold this frame's world positions. An
    /// orbit target outside that slice leaves the pose unchanged.
    pub fn update(
        &self,
        state: &mut CameraState,
        input: &MovementInput,
        body_positions: &[Vec3],
        delta_seconds: f32,
    ) {
        let forward = state.forward();
        match state.mode {
            CameraMode::OrbitBody(index) => {
                let Some(&target) = body_positions.get(index) else {
                    return;
                };
                state.position = target + forward * state.distance;
                state.look_target = target;
            }
            CameraMode::FreeFly => {
                let right = forward.cross(Vec3::Y).normalize_or_zero();
                let step = self.settings.move_speed * delta_seconds;
                if input.forward {
                    state.position += forward * step;
                }
                if input.back {
                    state.position -= forward * step;
                }
                if input.left {
                    state.position -= right * step;
                }
                if input.right {
                    state.position += right * step;
                }
                state.look_target = state.position + forward;
            }
        }
        state.up = Vec3::Y;
    }
}

/// `(cos p · sin y, sin p, cos p · cos y)`.
pub fn spherical_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
}

/// Projection for the main and background passes.
///
/// All variants use reverse-Z: the near plane maps to depth 1 and the far
/// plane to depth 0.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        /// Width / height.
        aspect_ratio: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        half_width: f32,
        half_height: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov_y,
                aspect_ratio,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect_ratio, far, near),
            Self::Orthographic {
                half_width,
                half_height,
                near,
                far,
            } => Mat4::orthographic_rh(-half_width, half_width, -half_height, half_height, far, near),
        }
    }

    /// Update the aspect ratio of a perspective projection. Zero-height
    /// surfaces (minimized windows) are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        if let Self::Perspective { aspect_ratio, .. } = self {
            *aspect_ratio = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn controller() -> CameraController {
        CameraController::default()
    }

    #[test]
    fn test_settings_validation() {
        assert_eq!(CameraSettings::default().validate(), Ok(()));

        let settings = CameraSettings {
            pitch_limit: -1.5,
            ..CameraSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(CameraSettingsError::PitchLimit(-1.5))
        );

        let settings = CameraSettings {
            min_distance: 50.0,
            max_distance: 10.0,
            ..CameraSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(CameraSettingsError::DistanceRange {
                min: 50.0,
                max: 10.0
            })
        );

        let settings = CameraSettings {
            max_distance: f32::INFINITY,
            ..CameraSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_forward_cycle_wraps_to_free_fly() {
        assert_eq!(CameraMode::OrbitBody(0).next(3), CameraMode::OrbitBody(1));
        assert_eq!(CameraMode::OrbitBody(2).next(3), CameraMode::FreeFly);
        assert_eq!(CameraMode::FreeFly.next(3), CameraMode::OrbitBody(0));
    }

    #[test]
    fn test_backward_cycle_wraps_to_free_fly() {
        assert_eq!(CameraMode::OrbitBody(0).previous(3), CameraMode::FreeFly);
        assert_eq!(CameraMode::FreeFly.previous(3), CameraMode::OrbitBody(2));
        assert_eq!(CameraMode::OrbitBody(2).previous(3), CameraMode::OrbitBody(1));
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        let mut mode = CameraMode::OrbitBody(1);
        for _ in 0..4 {
            mode = mode.next(3);
        }
        assert_eq!(mode, CameraMode::OrbitBody(1));
        for _ in 0..4 {
            mode = mode.previous(3);
        }
        assert_eq!(mode, CameraMode::OrbitBody(1));
    }

    #[test]
    fn test_pitch_clamped_after_large_drags() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::OrbitBody(0), 0.0, 0.0, 5.0);
        for dy in [-10_000.0, 3.0, 25_000.0, -1.0, -99_999.0] {
            controller.on_drag(&mut state, 1.0, dy);
            assert!((-1.5..=1.5).contains(&state.pitch), "pitch {}", state.pitch);
            assert_eq!(controller.clamp_pitch(state.pitch), state.pitch);
        }
    }

    #[test]
    fn test_drag_down_looks_up() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::FreeFly, 0.0, 0.0, 5.0);
        controller.on_drag(&mut state, 100.0, -20.0);
        assert!((state.yaw - 0.5).abs() < 1e-6);
        assert!((state.pitch - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_distance_clamped_after_scrolls() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::FreeFly, 0.0, 0.0, 5.0);
        for lines in [500.0, -3.0, -1_000.0, 2.0, 0.5] {
            controller.on_scroll(&mut state, lines);
            assert!((1.0..=100.0).contains(&state.distance), "distance {}", state.distance);
        }
        controller.on_scroll(&mut state, 2.0);
        assert!((state.distance - 97.75).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_places_camera_on_sphere() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::OrbitBody(1), FRAC_PI_2, 0.0, 4.0);
        let bodies = [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0)];
        controller.update(&mut state, &MovementInput::default(), &bodies, 0.016);
        assert!((state.position - Vec3::new(7.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(state.look_target, bodies[1]);
        assert_eq!(state.up, Vec3::Y);
    }

    #[test]
    fn test_orbit_pitch_lifts_camera() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::OrbitBody(0), 0.0, 1.0, 2.0);
        controller.update(&mut state, &MovementInput::default(), &[Vec3::ZERO], 0.0);
        assert!((state.position.length() - 2.0).abs() < 1e-5);
        assert!((state.position.y - 2.0 * 1.0_f32.sin()).abs() < 1e-5);
    }

    #[test]
    fn test_target_switch_keeps_yaw_pitch_distance() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::OrbitBody(0), 0.3, 0.2, 6.0);
        let bodies = [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0)];
        controller.update(&mut state, &MovementInput::default(), &bodies, 0.0);
        let offset_before = state.position - bodies[0];

        state.mode = state.mode.next(bodies.len());
        controller.update(&mut state, &MovementInput::default(), &bodies, 0.0);
        let offset_after = state.position - bodies[1];
        assert!((offset_before - offset_after).length() < 1e-5);
    }

    #[test]
    fn test_free_fly_moves_along_forward() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::FreeFly, 0.0, 0.0, 5.0);
        let input = MovementInput {
            forward: true,
            ..MovementInput::default()
        };
        controller.update(&mut state, &input, &[], 0.5);
        // speed 5.0 * 0.5 s along +Z
        assert!((state.position - Vec3::new(0.0, 0.0, 2.5)).length() < 1e-5);
        assert!((state.look_target - Vec3::new(0.0, 0.0, 3.5)).length() < 1e-5);
    }

    #[test]
    fn test_free_fly_strafe_and_cancel() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::FreeFly, 0.0, 0.0, 5.0);
        let strafe = MovementInput {
            right: true,
            ..MovementInput::default()
        };
        controller.update(&mut state, &strafe, &[], 1.0);
        // forward (0,0,1) x Y = (-1,0,0)
        assert!((state.position - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);

        let opposed = MovementInput {
            forward: true,
            back: true,
            ..MovementInput::default()
        };
        let before = state.position;
        controller.update(&mut state, &opposed, &[], 1.0);
        assert!((state.position - before).length() < 1e-5);
    }

    #[test]
    fn test_free_fly_without_input_stays_put() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::FreeFly, 1.0, 0.4, 5.0);
        state.position = Vec3::new(1.0, 2.0, 3.0);
        controller.update(&mut state, &MovementInput::default(), &[], 0.25);
        assert_eq!(state.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(((state.look_target - state.position).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_entering_free_fly_keeps_orbit_position() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::OrbitBody(0), 0.0, 0.0, 5.0);
        controller.update(&mut state, &MovementInput::default(), &[Vec3::ZERO], 0.0);
        let orbit_position = state.position;

        state.mode = state.mode.next(1);
        assert_eq!(state.mode, CameraMode::FreeFly);
        controller.update(&mut state, &MovementInput::default(), &[Vec3::ZERO], 0.1);
        assert_eq!(state.position, orbit_position);
    }

    #[test]
    fn test_missing_target_leaves_pose() {
        let controller = controller();
        let mut state = CameraState::new(CameraMode::OrbitBody(5), 0.0, 0.0, 5.0);
        state.position = Vec3::ONE;
        controller.update(&mut state, &MovementInput::default(), &[Vec3::ZERO], 0.1);
        assert_eq!(state.position, Vec3::ONE);
    }

    #[test]
    fn test_perspective_is_reverse_z() {
        let projection = Projection::Perspective {
            fov_y: 50.0_f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
        };
        let m = projection.matrix();
        let near = m.project_point3(Vec3::new(0.0, 0.0, -0.01));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -100.0));
        assert!((near.z - 1.0).abs() < 1e-4, "near z = {}", near.z);
        assert!(far.z.abs() < 1e-4, "far z = {}", far.z);
    }

    #[test]
    fn test_viewport_updates_aspect() {
        let mut projection = Projection::Perspective {
            fov_y: 1.0,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 10.0,
        };
        projection.set_viewport(1920, 1080);
        projection.set_viewport(800, 0);
        match projection {
            Projection::Perspective { aspect_ratio, .. } => {
                assert!((aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
            }
            Projection::Orthographic { .. } => panic!("expected perspective projection"),
        }
    }

    #[test]
    fn test_view_matrix_looks_at_target() {
        let mut state = CameraState::new(CameraMode::FreeFly, 0.0, 0.0, 1.0);
        state.position = Vec3::new(0.0, 0.0, 5.0);
        state.look_target = Vec3::ZERO;
        let target_in_view = state.view_matrix().transform_point3(Vec3::ZERO);
        assert!((target_in_view - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
    }
}
