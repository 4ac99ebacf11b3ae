//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Camera controller tuning.
    pub camera: CameraConfig,
    /// Simulation clock settings.
    pub time: TimeConfig,
    /// Sun light settings.
    pub light: LightConfig,
    /// Texture locations.
    pub assets: AssetConfig,
    /// Body hierarchy.
    pub scene: SceneConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge length of the square shadow target in texels.
    pub shadow_map_size: u32,
    /// Vertical field of view of the main camera in degrees.
    pub fov_y_degrees: f32,
    /// Main camera near plane.
    pub near: f32,
    /// Main camera far plane.
    pub far: f32,
    /// Sample the shadow target in the main pass.
    pub shadows_enabled: bool,
    /// Draw the cloud overlay on the root body.
    pub clouds_enabled: bool,
    /// Latitude bands of the shared sphere mesh.
    pub sphere_stacks: u32,
    /// Longitude segments of the shared sphere mesh.
    pub sphere_sectors: u32,
    /// Uniform scale of the sky sphere around the camera.
    pub sky_scale: f32,
}

/// Camera controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Radians of yaw/pitch per pixel of pointer drag.
    pub drag_sensitivity: f32,
    /// Distance change per scroll line.
    pub scroll_step: f32,
    /// Free-fly speed in world units per second.
    pub move_speed: f32,
    /// Absolute pitch bound in radians.
    pub pitch_limit: f32,
    /// Closest orbit distance.
    pub min_distance: f32,
    /// Farthest orbit distance.
    pub max_distance: f32,
    pub initial_yaw: f32,
    pub initial_pitch: f32,
    pub initial_distance: f32,
    /// Body the camera orbits at startup, or `None` to start in free-fly.
    pub initial_target: Option<usize>,
}

/// Simulation clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeConfig {
    /// Time scale at startup. Must be nonzero.
    pub initial_scale: f64,
    /// Upper bound on a single frame's wall-clock delta in seconds.
    pub max_frame_time: f64,
}

/// Directional sun light configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// Radians per unit of simulation time the sun turns around the Y axis.
    pub angular_rate: f32,
    /// Vertical component of the sun direction before normalization.
    pub elevation: f32,
    /// Linear RGB light color.
    pub color: [f32; 3],
    /// How far back along the light direction the shadow camera sits.
    pub distance: f32,
    /// Half-width and half-height of the shadow orthographic box.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

/// Texture asset locations, relative to `root`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub earth_day: PathBuf,
    pub earth_specular: PathBuf,
    pub earth_night: PathBuf,
    /// Optional. A missing file falls back to a transparent placeholder.
    pub earth_clouds: PathBuf,
    pub moon: PathBuf,
    /// Equirectangular star panorama for the sky sphere.
    pub stars: PathBuf,
}

/// Surface set used to shade a body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BodyMaterial {
    /// Day albedo, specular mask and night lights.
    Earth,
    /// Single albedo texture.
    #[default]
    Moon,
}

/// One body of the orbital hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    /// Index of the parent body in [`SceneConfig::bodies`]; `None` for the root.
    pub parent: Option<usize>,
    /// Constant shift of the orbit center relative to the parent.
    pub local_offset: [f32; 3],
    pub orbit_radius: f32,
    /// Radians per unit of simulation time.
    pub orbit_speed: f32,
    /// Spin about the local Y axis, radians per unit of simulation time.
    pub rotation_speed: f32,
    pub scale: f32,
    pub material: BodyMaterial,
}

/// Scene description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub bodies: Vec<BodyConfig>,
    /// Cloud shell scale relative to the root body.
    pub cloud_scale: f32,
    /// Spin of the cloud shell, independent of the surface.
    pub cloud_rotation_speed: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Shading debug mode at startup (0 = normal shading).
    pub shading_mode: u32,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            fov_y_degrees: 50.0,
            near: 0.01,
            far: 100.0,
            shadows_enabled: false,
            clouds_enabled: false,
            sphere_stacks: 64,
            sphere_sectors: 128,
            sky_scale: 100.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.005,
            scroll_step: 0.5,
            move_speed: 5.0,
            pitch_limit: 1.5,
            min_distance: 1.0,
            max_distance: 100.0,
            initial_yaw: 0.0,
            initial_pitch: 0.3,
            initial_distance: 8.0,
            initial_target: Some(0),
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            initial_scale: 1.0,
            max_frame_time: 0.25,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            angular_rate: 0.1,
            elevation: 0.3,
            color: [1.0, 1.0, 0.95],
            distance: 20.0,
            half_extent: 8.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            earth_day: PathBuf::from("textures/2k_earth_daymap.jpg"),
            earth_specular: PathBuf::from("textures/2k_earth_specular_map.png"),
            earth_night: PathBuf::from("textures/2k_earth_nightmap_alpha.png"),
            earth_clouds: PathBuf::from("textures/2k_earth_clouds_alpha.png"),
            moon: PathBuf::from("textures/2k_moon.jpg"),
            stars: PathBuf::from("textures/8k_stars_milky_way.jpg"),
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            local_offset: [0.0; 3],
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            rotation_speed: 0.0,
            scale: 1.0,
            material: BodyMaterial::default(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            bodies: vec![
                BodyConfig {
                    name: "Earth".to_string(),
                    rotation_speed: 0.2,
                    material: BodyMaterial::Earth,
                    ..BodyConfig::default()
                },
                BodyConfig {
                    name: "Moon1".to_string(),
                    parent: Some(0),
                    orbit_radius: 3.0,
                    orbit_speed: 0.5,
                    rotation_speed: 0.3,
                    scale: 0.3,
                    ..BodyConfig::default()
                },
                BodyConfig {
                    name: "Moon2".to_string(),
                    parent: Some(1),
                    orbit_radius: 1.5,
                    orbit_speed: 1.0,
                    rotation_speed: 0.4,
                    scale: 0.15,
                    ..BodyConfig::default()
                },
            ],
            cloud_scale: 1.01,
            cloud_rotation_speed: 0.15,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            shading_mode: 0,
        }
    }
}

impl AssetConfig {
    /// Join an asset path onto the asset root.
    #[must_use]
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

const CONFIG_FILE: &str = "config.ron";

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Read `config.ron` from `config_dir`. When the file is missing the
    /// defaults are written there first.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }
        let config = read_file(&path)?;
        log::info!("Configuration read from {}", path.display());
        Ok(config)
    }

    /// Write `config.ron` into `config_dir`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let style = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(true);
        let text = ron::ser::to_string_pretty(self, style).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, text).map_err(write_err)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("shadow_map_size: 2048"));
        assert!(ron_str.contains("\"Moon2\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_scene_is_three_body_chain() {
        let scene = SceneConfig::default();
        assert_eq!(scene.bodies.len(), 3);
        assert_eq!(scene.bodies[0].parent, None);
        assert_eq!(scene.bodies[1].parent, Some(0));
        assert_eq!(scene.bodies[2].parent, Some(1));
        assert_eq!(scene.bodies[0].material, BodyMaterial::Earth);
        assert_eq!(scene.bodies[2].material, BodyMaterial::Moon);
        assert!((scene.bodies[1].orbit_radius - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_shadows_and_clouds_off_by_default() {
        let render = RenderConfig::default();
        assert!(!render.shadows_enabled);
        assert!(!render.clouds_enabled);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), render: (), camera: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.light, LightConfig::default());
        assert_eq!(config.scene, SceneConfig::default());
    }

    #[test]
    fn test_partial_body_fills_defaults() {
        let ron_str = r#"(scene: (bodies: [(name: "Solo", material: Earth)]))"#;
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene.bodies.len(), 1);
        assert_eq!(config.scene.bodies[0].parent, None);
        assert!((config.scene.bodies[0].scale - 1.0).abs() < 1e-6);
        assert!((config.scene.cloud_scale - 1.01).abs() < 1e-6);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.render.shadows_enabled = true;
        config.scene.bodies[1].orbit_speed = 0.75;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_asset_resolve_joins_root() {
        let assets = AssetConfig {
            root: PathBuf::from("/data/orrery"),
            ..AssetConfig::default()
        };
        assert_eq!(
            assets.resolve(&assets.moon),
            PathBuf::from("/data/orrery/textures/2k_moon.jpg")
        );
    }
}
