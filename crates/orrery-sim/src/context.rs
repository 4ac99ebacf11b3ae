//! The explicit simulation context shared by input handling and rendering.

use glam::{Mat4, Vec3};
use tracing::info;

use crate::camera::{CameraController, CameraMode, CameraState, MovementInput};
use crate::hierarchy::{CelestialBody, OrbitalHierarchy, PositionBuffer};
use crate::light::{LightSettings, SunLight};
use crate::time::TimeController;
use crate::transform::BodyTransform;

/// Shading debug view, selected with the number keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum ShadingMode {
    /// Full lighting.
    #[default]
    Lit = 0,
    /// World-space normals as color.
    Normals = 1,
    /// Lambert term only.
    Diffuse = 2,
    /// Light-space depth compared against the shadow target.
    ShadowDepth = 3,
}

impl ShadingMode {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Lit),
            1 => Some(Self::Normals),
            2 => Some(Self::Diffuse),
            3 => Some(Self::ShadowDepth),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Discrete input events that mutate the context between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    CycleCameraForward,
    CycleCameraBackward,
    AccelerateTime,
    DecelerateTime,
    SetShadingMode(ShadingMode),
    ToggleShadows,
    /// Pointer drag in pixels.
    Drag { dx: f32, dy: f32 },
    /// Scroll in lines.
    Scroll(f32),
}

/// All mutable scene state.
///
/// Input handlers call [`Self::apply`]; the frame loop calls [`Self::update`]
/// once per frame and hands [`Self::frame`] to the renderer.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    hierarchy: OrbitalHierarchy,
    time: TimeController,
    controller: CameraController,
    camera: CameraState,
    light_settings: LightSettings,
    light: SunLight,
    world_positions: PositionBuffer,
    shadows_enabled: bool,
    shading_mode: ShadingMode,
}

impl SimulationContext {
    /// Build a context and derive the initial frame at simulation time zero.
    ///
    /// An orbit target outside the hierarchy starts the camera in free-fly.
    pub fn new(
        hierarchy: OrbitalHierarchy,
        time: TimeController,
        controller: CameraController,
        mut camera: CameraState,
        light_settings: LightSettings,
    ) -> Self {
        if let CameraMode::OrbitBody(index) = camera.mode
            && index >= hierarchy.len()
        {
            camera.mode = CameraMode::FreeFly;
        }
        camera.pitch = controller.clamp_pitch(camera.pitch);
        camera.distance = controller.clamp_distance(camera.distance);

        let mut world_positions = PositionBuffer::default();
        hierarchy.update_world_positions(time.simulation_time(), &mut world_positions);
        let light = SunLight::at_time(&light_settings, time.simulation_time());
        let mut context = Self {
            hierarchy,
            time,
            controller,
            camera,
            light_settings,
            light,
            world_positions,
            shadows_enabled: false,
            shading_mode: ShadingMode::Lit,
        };
        context.controller.update(
            &mut context.camera,
            &MovementInput::default(),
            context.world_positions.as_slice(),
            0.0,
        );
        context
    }

    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows_enabled = enabled;
        self
    }

    pub fn with_shading_mode(mut self, mode: ShadingMode) -> Self {
        self.shading_mode = mode;
        self
    }

    /// Apply one input command. Takes effect on the next [`Self::update`].
    pub fn apply(&mut self, command: SceneCommand) {
        let body_count = self.hierarchy.len();
        match command {
            SceneCommand::CycleCameraForward => {
                self.camera.mode = self.camera.mode.next(body_count);
                info!(mode = ?self.camera.mode, "Camera mode changed");
            }
            SceneCommand::CycleCameraBackward => {
                self.camera.mode = self.camera.mode.previous(body_count);
                info!(mode = ?self.camera.mode, "Camera mode changed");
            }
            SceneCommand::AccelerateTime => {
                let scale = self.time.accelerate();
                info!(scale, "Time scale changed");
            }
            SceneCommand::DecelerateTime => {
                let scale = self.time.decelerate();
                info!(scale, "Time scale changed");
            }
            SceneCommand::SetShadingMode(mode) => {
                if mode != self.shading_mode {
                    self.shading_mode = mode;
                    info!(?mode, "Shading mode changed");
                }
            }
            SceneCommand::ToggleShadows => {
                self.shadows_enabled = !self.shadows_enabled;
                info!(enabled = self.shadows_enabled, "Shadow sampling toggled");
            }
            SceneCommand::Drag { dx, dy } => self.controller.on_drag(&mut self.camera, dx, dy),
            SceneCommand::Scroll(lines) => self.controller.on_scroll(&mut self.camera, lines),
        }
    }

    /// Advance one frame: clock, then body positions, then camera, then light.
    pub fn update(&mut self, delta_seconds: f64, movement: &MovementInput) {
        let t = self.time.advance(delta_seconds);
        self.hierarchy
            .update_world_positions(t, &mut self.world_positions);
        self.controller.update(
            &mut self.camera,
            movement,
            self.world_positions.as_slice(),
            delta_seconds as f32,
        );
        self.light = SunLight::at_time(&self.light_settings, t);
    }

    /// Read-only view of the current frame for the renderer.
    pub fn frame(&self) -> FrameState<'_> {
        FrameState {
            simulation_time: self.time.simulation_time(),
            bodies: self.hierarchy.bodies(),
            world_positions: self.world_positions.as_slice(),
            camera: &self.camera,
            light: self.light,
            light_view_proj: self.light.view_projection(&self.light_settings),
            shadows_enabled: self.shadows_enabled,
            shading_mode: self.shading_mode,
        }
    }

    pub fn hierarchy(&self) -> &OrbitalHierarchy {
        &self.hierarchy
    }

    pub fn time(&self) -> &TimeController {
        &self.time
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn world_positions(&self) -> &[Vec3] {
        self.world_positions.as_slice()
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    pub fn shading_mode(&self) -> ShadingMode {
        self.shading_mode
    }
}

/// Snapshot of everything the renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameState<'a> {
    pub simulation_time: f64,
    pub bodies: &'a [CelestialBody],
    pub world_positions: &'a [Vec3],
    pub camera: &'a CameraState,
    pub light: SunLight,
    pub light_view_proj: Mat4,
    pub shadows_enabled: bool,
    pub shading_mode: ShadingMode,
}

impl FrameState<'_> {
    /// Model and normal matrices of body `index`.
    pub fn body_transform(&self, index: usize) -> Option<BodyTransform> {
        let body = self.bodies.get(index)?;
        let position = *self.world_positions.get(index)?;
        Some(BodyTransform::new(
            position,
            self.simulation_time,
            body.rotation_speed,
            body.scale,
        ))
    }

    /// Transforms of every body, in hierarchy order.
    pub fn body_transforms(&self) -> Vec<BodyTransform> {
        (0..self.bodies.len())
            .filter_map(|index| self.body_transform(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSettings;

    fn context() -> SimulationContext {
        let hierarchy = OrbitalHierarchy::new(vec![
            CelestialBody::root("Earth", 1.0, 0.2),
            CelestialBody::satellite("Moon1", 0, 3.0, 0.5, 0.3, 0.3),
            CelestialBody::satellite("Moon2", 1, 1.5, 1.0, 0.4, 0.15),
        ])
        .unwrap();
        SimulationContext::new(
            hierarchy,
            TimeController::new(1.0),
            CameraController::new(CameraSettings::default()),
            CameraState::new(CameraMode::OrbitBody(0), 0.0, 0.3, 8.0),
            LightSettings::default(),
        )
    }

    #[test]
    fn test_initial_frame_is_derived() {
        let ctx = context();
        assert_eq!(ctx.world_positions().len(), 3);
        assert!((ctx.world_positions()[1] - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);
        assert!((ctx.camera().position.length() - 8.0).abs() < 1e-4);
        assert!(!ctx.shadows_enabled());
    }

    #[test]
    fn test_update_order_uses_new_time() {
        let mut ctx = context();
        ctx.apply(SceneCommand::CycleCameraForward);
        ctx.update(std::f64::consts::PI, &MovementInput::default());

        // Moon1 reached its quarter orbit at t = pi
        let moon = ctx.world_positions()[1];
        assert!((moon - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4);
        // and the camera already follows it this frame
        assert_eq!(ctx.camera().look_target, moon);
        let expected_light = SunLight::at_time(&LightSettings::default(), std::f64::consts::PI);
        assert_eq!(ctx.frame().light, expected_light);
    }

    #[test]
    fn test_time_commands() {
        let mut ctx = context();
        for _ in 0..3 {
            ctx.apply(SceneCommand::AccelerateTime);
        }
        assert_eq!(ctx.time().time_scale(), -1.0);
        ctx.update(2.0, &MovementInput::default());
        assert!((ctx.time().simulation_time() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_camera_cycle_through_free_fly() {
        let mut ctx = context();
        ctx.apply(SceneCommand::CycleCameraBackward);
        assert_eq!(ctx.camera().mode, CameraMode::FreeFly);
        ctx.apply(SceneCommand::CycleCameraForward);
        assert_eq!(ctx.camera().mode, CameraMode::OrbitBody(0));
    }

    #[test]
    fn test_drag_and_scroll_are_clamped() {
        let mut ctx = context();
        ctx.apply(SceneCommand::Drag {
            dx: 0.0,
            dy: -1.0e6,
        });
        ctx.apply(SceneCommand::Scroll(-1.0e6));
        assert!((ctx.camera().pitch - 1.5).abs() < 1e-6);
        assert!((ctx.camera().distance - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_shadow_toggle_and_shading_mode() {
        let mut ctx = context();
        ctx.apply(SceneCommand::ToggleShadows);
        assert!(ctx.frame().shadows_enabled);
        ctx.apply(SceneCommand::SetShadingMode(ShadingMode::Normals));
        assert_eq!(ctx.frame().shading_mode, ShadingMode::Normals);
        assert_eq!(ShadingMode::from_index(3), Some(ShadingMode::ShadowDepth));
        assert_eq!(ShadingMode::from_index(4), None);
    }

    #[test]
    fn test_invalid_initial_target_falls_back_to_free_fly() {
        let hierarchy = OrbitalHierarchy::new(vec![CelestialBody::root("Solo", 1.0, 0.0)]).unwrap();
        let ctx = SimulationContext::new(
            hierarchy,
            TimeController::default(),
            CameraController::default(),
            CameraState::new(CameraMode::OrbitBody(4), 0.0, 9.0, 0.0),
            LightSettings::default(),
        );
        assert_eq!(ctx.camera().mode, CameraMode::FreeFly);
        assert!((ctx.camera().pitch - 1.5).abs() < 1e-6);
        assert!((ctx.camera().distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_transforms_follow_positions() {
        let mut ctx = context();
        ctx.update(1.25, &MovementInput::default());
        let frame = ctx.frame();
        let transforms = frame.body_transforms();
        assert_eq!(transforms.len(), 3);
        for (transform, position) in transforms.iter().zip(frame.world_positions) {
            assert!((transform.model.w_axis.truncate() - *position).length() < 1e-5);
        }
        assert!(frame.body_transform(3).is_none());
    }
}
