//! Builds the simulation and renderer inputs from [`Config`].

use glam::Vec3;
use orrery_config::{AssetConfig, BodyConfig, BodyMaterial, Config, SceneConfig};
use orrery_render::{CloudLayer, MaterialId, RendererSettings, TexturePaths};
use orrery_sim::{
    CameraController, CameraMode, CameraSettings, CameraState, CelestialBody, HierarchyError,
    LightSettings, OrbitalHierarchy, ShadingMode, SimulationContext, TimeController,
};
use tracing::{info, warn};

use crate::error::AppError;

/// Roots ignore the configured orbit; they sit at the origin.
fn celestial_body(config: &BodyConfig) -> CelestialBody {
    let name = config.name.clone();
    let mut body = match config.parent {
        None => CelestialBody::root(name, config.scale, config.rotation_speed),
        Some(parent) => CelestialBody::satellite(
            name,
            parent,
            config.orbit_radius,
            config.orbit_speed,
            config.rotation_speed,
            config.scale,
        ),
    };
    body.local_offset = Vec3::from_array(config.local_offset);
    body
}

/// Validate the configured bodies into a hierarchy.
///
/// # Errors
///
/// Returns the first [`HierarchyError`] found in the body list.
pub fn build_hierarchy(scene: &SceneConfig) -> Result<OrbitalHierarchy, HierarchyError> {
    OrbitalHierarchy::new(scene.bodies.iter().map(celestial_body).collect())
}

pub fn body_materials(scene: &SceneConfig) -> Vec<MaterialId> {
    scene
        .bodies
        .iter()
        .map(|body| match body.material {
            BodyMaterial::Earth => MaterialId::Earth,
            BodyMaterial::Moon => MaterialId::Moon,
        })
        .collect()
}

pub fn camera_settings(config: &Config) -> CameraSettings {
    let camera = &config.camera;
    CameraSettings {
        sensitivity: camera.drag_sensitivity,
        scroll_step: camera.scroll_step,
        move_speed: camera.move_speed,
        pitch_limit: camera.pitch_limit,
        min_distance: camera.min_distance,
        max_distance: camera.max_distance,
    }
}

pub fn light_settings(config: &Config) -> LightSettings {
    let light = &config.light;
    LightSettings {
        angular_rate: light.angular_rate,
        elevation: light.elevation,
        color: Vec3::from_array(light.color),
        distance: light.distance,
        half_extent: light.half_extent,
        near: light.near,
        far: light.far,
    }
}

/// Initial simulation state: hierarchy, clock, camera, light and flags.
///
/// # Errors
///
/// Returns [`AppError::Scene`] when the configured bodies are malformed and
/// [`AppError::Camera`] when the camera limits cannot be clamped against.
pub fn build_context(config: &Config) -> Result<SimulationContext, AppError> {
    let hierarchy = build_hierarchy(&config.scene)?;
    let camera_settings = camera_settings(config);
    camera_settings.validate()?;
    info!("Scene hierarchy: {} bodies", hierarchy.len());

    let mode = match config.camera.initial_target {
        Some(index) => CameraMode::OrbitBody(index),
        None => CameraMode::FreeFly,
    };
    let camera = CameraState::new(
        mode,
        config.camera.initial_yaw,
        config.camera.initial_pitch,
        config.camera.initial_distance,
    );

    let shading_mode = ShadingMode::from_index(config.debug.shading_mode).unwrap_or_else(|| {
        warn!(
            mode = config.debug.shading_mode,
            "Unknown shading mode in config, using lit shading"
        );
        ShadingMode::Lit
    });

    Ok(SimulationContext::new(
        hierarchy,
        TimeController::new(config.time.initial_scale),
        CameraController::new(camera_settings),
        camera,
        light_settings(config),
    )
    .with_shadows(config.render.shadows_enabled)
    .with_shading_mode(shading_mode))
}

pub fn texture_paths(assets: &AssetConfig) -> TexturePaths {
    TexturePaths {
        earth_day: assets.resolve(&assets.earth_day),
        earth_specular: assets.resolve(&assets.earth_specular),
        earth_night: assets.resolve(&assets.earth_night),
        earth_clouds: assets.resolve(&assets.earth_clouds),
        moon: assets.resolve(&assets.moon),
        stars: assets.resolve(&assets.stars),
    }
}

pub fn renderer_settings(config: &Config) -> RendererSettings {
    let render = &config.render;
    RendererSettings {
        shadow_map_size: render.shadow_map_size,
        fov_y_radians: render.fov_y_degrees.to_radians(),
        near: render.near,
        far: render.far,
        sky_scale: render.sky_scale,
        sphere_stacks: render.sphere_stacks,
        sphere_sectors: render.sphere_sectors,
        clouds: render.clouds_enabled.then_some(CloudLayer {
            scale: config.scene.cloud_scale,
            rotation_speed: config.scene.cloud_rotation_speed,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_sim::CameraSettingsError;

    #[test]
    fn test_default_scene_builds_three_bodies() {
        let hierarchy = build_hierarchy(&SceneConfig::default()).unwrap();
        assert_eq!(hierarchy.len(), 3);
        assert_eq!(hierarchy.bodies()[2].parent, Some(1));
        assert_eq!(hierarchy.bodies()[1].orbit_radius, 3.0);
    }

    #[test]
    fn test_default_materials_put_earth_on_root() {
        assert_eq!(
            body_materials(&SceneConfig::default()),
            vec![MaterialId::Earth, MaterialId::Moon, MaterialId::Moon]
        );
    }

    #[test]
    fn test_malformed_scene_is_rejected() {
        let mut scene = SceneConfig::default();
        scene.bodies[1].parent = Some(7);
        assert!(matches!(
            build_hierarchy(&scene),
            Err(HierarchyError::ParentOutOfRange { parent: 7, .. })
        ));

        scene.bodies.clear();
        assert_eq!(build_hierarchy(&scene).unwrap_err(), HierarchyError::Empty);
    }

    #[test]
    fn test_invalid_camera_limits_are_rejected() {
        let mut config = Config::default();
        config.camera.min_distance = 50.0;
        config.camera.max_distance = 10.0;
        assert!(matches!(
            build_context(&config),
            Err(AppError::Camera(CameraSettingsError::DistanceRange { .. }))
        ));

        let mut config = Config::default();
        config.camera.pitch_limit = -1.5;
        assert!(matches!(
            build_context(&config),
            Err(AppError::Camera(CameraSettingsError::PitchLimit(_)))
        ));
    }

    #[test]
    fn test_context_takes_flags_from_config() {
        let mut config = Config::default();
        config.render.shadows_enabled = true;
        config.debug.shading_mode = 2;
        let context = build_context(&config).unwrap();
        assert!(context.shadows_enabled());
        assert_eq!(context.shading_mode(), ShadingMode::Diffuse);
        assert_eq!(context.camera().mode, CameraMode::OrbitBody(0));
    }

    #[test]
    fn test_unknown_shading_mode_falls_back_to_lit() {
        let mut config = Config::default();
        config.debug.shading_mode = 9;
        let context = build_context(&config).unwrap();
        assert_eq!(context.shading_mode(), ShadingMode::Lit);
    }

    #[test]
    fn test_texture_paths_join_asset_root() {
        let mut assets = AssetConfig::default();
        assets.root = "data".into();
        let paths = texture_paths(&assets);
        assert_eq!(paths.moon, std::path::Path::new("data").join(&assets.moon));
        assert_eq!(paths.stars, std::path::Path::new("data").join(&assets.stars));
    }

    #[test]
    fn test_clouds_follow_render_flag() {
        let mut config = Config::default();
        assert_eq!(renderer_settings(&config).clouds, None);
        config.render.clouds_enabled = true;
        let clouds = renderer_settings(&config).clouds.unwrap();
        assert_eq!(clouds.scale, 1.01);
        assert_eq!(clouds.rotation_speed, 0.15);
    }

    #[test]
    fn test_renderer_settings_convert_fov() {
        let settings = renderer_settings(&Config::default());
        assert!((settings.fov_y_radians - 50f32.to_radians()).abs() < 1e-6);
        assert_eq!(settings.shadow_map_size, 2048);
    }
}
