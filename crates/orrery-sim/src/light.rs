//! Rotating directional sun light and its shadow-camera matrices.

use glam::{Mat4, Vec3};

/// Parameters of the sun's motion and of the shadow camera's box.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSettings {
    /// Radians per unit of simulation time around the Y axis.
    pub angular_rate: f32,
    /// Y component of the direction before normalization.
    pub elevation: f32,
    pub color: Vec3,
    /// Shadow camera distance from the origin along the light direction.
    pub distance: f32,
    /// Half-extent of the square orthographic box.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            angular_rate: 0.1,
            elevation: 0.3,
            color: Vec3::new(1.0, 1.0, 0.95),
            distance: 20.0,
            half_extent: 8.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

/// The sun at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunLight {
    /// Normalized direction the light travels, from the light toward the scene.
    pub direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
}

impl SunLight {
    /// Sun state at simulation time `t`.
    pub fn at_time(settings: &LightSettings, t: f64) -> Self {
        let angle = (t * f64::from(settings.angular_rate)).rem_euclid(std::f64::consts::TAU) as f32;
        let (sin, cos) = angle.sin_cos();
        Self {
            direction: Vec3::new(cos, settings.elevation, sin).normalize(),
            color: settings.color,
        }
    }

    /// Shadow camera position: `distance` units back along the light direction.
    pub fn eye(&self, settings: &LightSettings) -> Vec3 {
        -self.direction * settings.distance
    }

    /// View from the shadow camera toward the origin.
    pub fn view_matrix(&self, settings: &LightSettings) -> Mat4 {
        let up = if self.direction.y.abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.eye(settings), Vec3::ZERO, up)
    }

    /// Orthographic box covering the scene.
    ///
    /// Unlike the main camera this uses standard depth (near 0, far 1), so a
    /// larger stored value always means farther from the light and the
    /// cleared sentinel reads as "unoccluded".
    pub fn projection_matrix(settings: &LightSettings) -> Mat4 {
        let e = settings.half_extent;
        Mat4::orthographic_rh(-e, e, -e, e, settings.near, settings.far)
    }

    pub fn view_projection(&self, settings: &LightSettings) -> Mat4 {
        Self::projection_matrix(settings) * self.view_matrix(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized_and_elevated() {
        let settings = LightSettings::default();
        for t in [0.0, 5.0, 31.4, -12.0] {
            let sun = SunLight::at_time(&settings, t);
            assert!((sun.direction.length() - 1.0).abs() < 1e-6);
            assert!(sun.direction.y > 0.0);
        }
    }

    #[test]
    fn test_direction_at_time_zero() {
        let sun = SunLight::at_time(&LightSettings::default(), 0.0);
        let expected = Vec3::new(1.0, 0.3, 0.0).normalize();
        assert!((sun.direction - expected).length() < 1e-6);
        assert_eq!(sun.color, Vec3::new(1.0, 1.0, 0.95));
    }

    #[test]
    fn test_direction_rotates_with_time() {
        let settings = LightSettings::default();
        // a quarter turn at 0.1 rad per unit
        let sun = SunLight::at_time(&settings, std::f64::consts::FRAC_PI_2 / 0.1);
        let expected = Vec3::new(0.0, 0.3, 1.0).normalize();
        assert!((sun.direction - expected).length() < 1e-5);
    }

    #[test]
    fn test_origin_maps_to_center_of_shadow_box() {
        let settings = LightSettings::default();
        let sun = SunLight::at_time(&settings, 2.0);
        let clip = sun.view_projection(&settings).project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        // 20 units away within [0.1, 50]
        let expected = (20.0 - 0.1) / (50.0 - 0.1);
        assert!((clip.z - expected).abs() < 1e-4, "z = {}", clip.z);
    }

    #[test]
    fn test_closer_to_light_has_smaller_depth() {
        let settings = LightSettings::default();
        let sun = SunLight::at_time(&settings, 0.7);
        let vp = sun.view_projection(&settings);
        let near_point = vp.project_point3(-sun.direction * 2.0);
        let far_point = vp.project_point3(sun.direction * 2.0);
        assert!(near_point.z < far_point.z);
    }

    #[test]
    fn test_vertical_light_uses_alternate_up() {
        let settings = LightSettings::default();
        let sun = SunLight {
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
        };
        let view = sun.view_matrix(&settings);
        assert!(view.is_finite());
    }
}
