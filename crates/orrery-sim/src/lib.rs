//! Scene simulation: orbital hierarchy, simulation clock, sun light and camera.
//!
//! Everything here is plain CPU math with no GPU or windowing dependencies.
//! [`SimulationContext`] owns the per-frame state and advances it in a fixed
//! order: clock, body positions, camera, light.

pub mod camera;
pub mod context;
pub mod hierarchy;
pub mod light;
pub mod time;
pub mod transform;

pub use camera::{
    CameraController, CameraMode, CameraSettings, CameraSettingsError, CameraState, MovementInput,
    Projection,
};
pub use context::{FrameState, SceneCommand, ShadingMode, SimulationContext};
pub use hierarchy::{CelestialBody, HierarchyError, OrbitalHierarchy, PositionBuffer};
pub use light::{LightSettings, SunLight};
pub use time::TimeController;
pub use transform::{BodyTransform, model_matrix, normal_matrix, spin_angle};
