//! WGSL sources. Every shader starts from [`UNIFORMS_WGSL`]; the mesh shaders
//! of the main and background passes add [`MATERIAL_WGSL`].

/// Per-draw uniform block at group 0, mirroring `DrawUniforms`.
pub const UNIFORMS_WGSL: &str = r#"
struct DrawUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    normal: mat3x3<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    eye: vec4<f32>,
    light_view_proj: mat4x4<f32>,
    use_shadows: u32,
    shading_mode: u32,
    _padding: vec2<u32>,
};

@group(0) @binding(0)
var<uniform> u: DrawUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};
"#;

/// Material group 1, the shared vertex stage and the lighting helpers.
pub const MATERIAL_WGSL: &str = r#"
@group(1) @binding(0) var t_albedo: texture_2d<f32>;
@group(1) @binding(1) var t_specular: texture_2d<f32>;
@group(1) @binding(2) var t_night: texture_2d<f32>;
@group(1) @binding(3) var s_surface: sampler;
@group(1) @binding(4) var t_shadow: texture_2d<f32>;

const AMBIENT: f32 = 0.05;
const SHADOW_BIAS: f32 = 0.005;
const SHADOW_CLEAR: f32 = 999999.0;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) light_space: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = u.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = u.proj * u.view * world;
    out.world_position = world.xyz;
    out.normal = u.normal * in.normal;
    out.uv = in.uv;
    out.light_space = u.light_view_proj * world;
    return out;
}

struct ShadowSample {
    receiver: f32,
    stored: f32,
    lit: f32,
};

// Light-space depth of the fragment against the nearest occluder depth.
// Outside the light's box everything counts as lit.
fn sample_shadow(light_space: vec4<f32>) -> ShadowSample {
    var s: ShadowSample;
    let ndc = light_space.xyz / light_space.w;
    s.receiver = ndc.z;
    s.stored = SHADOW_CLEAR;
    s.lit = 1.0;

    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 {
        return s;
    }
    let size = vec2<f32>(textureDimensions(t_shadow));
    let texel = vec2<i32>(min(uv * size, size - vec2<f32>(1.0)));
    s.stored = textureLoad(t_shadow, texel, 0).r;
    if s.receiver - SHADOW_BIAS > s.stored {
        s.lit = 0.0;
    }
    return s;
}

fn shadow_visibility(s: ShadowSample) -> f32 {
    if u.use_shadows == 0u {
        return 1.0;
    }
    return s.lit;
}

fn to_light() -> vec3<f32> {
    return normalize(-u.light_dir.xyz);
}

// 1: normals, 2: diffuse term, 3: receiver depth / stored depth / lit.
fn debug_color(n: vec3<f32>, n_dot_l: f32, s: ShadowSample) -> vec4<f32> {
    if u.shading_mode == 1u {
        return vec4<f32>(n * 0.5 + 0.5, 1.0);
    }
    if u.shading_mode == 2u {
        return vec4<f32>(vec3<f32>(n_dot_l), 1.0);
    }
    return vec4<f32>(s.receiver, min(s.stored, 1.0), s.lit, 1.0);
}
"#;

/// Writes light-space depth into the R32F target.
pub const SHADOW_WGSL: &str = r#"
struct ShadowOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) depth: f32,
};

@vertex
fn vs_shadow(in: VertexInput) -> ShadowOutput {
    let clip = u.light_view_proj * u.model * vec4<f32>(in.position, 1.0);
    var out: ShadowOutput;
    out.clip_position = clip;
    out.depth = clip.z / clip.w;
    return out;
}

@fragment
fn fs_shadow(in: ShadowOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.depth, 0.0, 0.0, 1.0);
}
"#;

/// Star panorama on the inside of the sky sphere.
pub const BACKGROUND_WGSL: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(t_albedo, s_surface, in.uv).rgb, 1.0);
}
"#;

/// Single albedo map with diffuse lighting.
pub const GENERIC_PLANET_WGSL: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(t_albedo, s_surface, in.uv).rgb;
    let n = normalize(in.normal);
    let n_dot_l = max(dot(n, to_light()), 0.0);
    let s = sample_shadow(in.light_space);
    if u.shading_mode != 0u {
        return debug_color(n, n_dot_l, s);
    }

    let diffuse = albedo * u.light_color.rgb * n_dot_l * shadow_visibility(s);
    return vec4<f32>(albedo * AMBIENT + diffuse, 1.0);
}
"#;

/// Day map, specular mask for the oceans and city lights on the night side.
pub const ROOT_PLANET_WGSL: &str = r#"
const SHININESS: f32 = 32.0;
const SPECULAR_STRENGTH: f32 = 0.5;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let day = textureSample(t_albedo, s_surface, in.uv).rgb;
    let specular_mask = textureSample(t_specular, s_surface, in.uv).r;
    let night = textureSample(t_night, s_surface, in.uv).rgb;

    let n = normalize(in.normal);
    let l = to_light();
    let n_dot_l = max(dot(n, l), 0.0);
    let s = sample_shadow(in.light_space);
    if u.shading_mode != 0u {
        return debug_color(n, n_dot_l, s);
    }

    let visibility = shadow_visibility(s);
    let v = normalize(u.eye.xyz - in.world_position);
    let h = normalize(l + v);
    let specular = specular_mask * pow(max(dot(n, h), 0.0), SHININESS) * SPECULAR_STRENGTH;

    let light = u.light_color.rgb * visibility;
    let lit = day * (AMBIENT + n_dot_l * light) + specular * light;
    let night_weight = 1.0 - smoothstep(0.0, 0.25, n_dot_l * visibility);
    return vec4<f32>(lit + night * night_weight, 1.0);
}
"#;

/// Cloud shell: the map's red channel is coverage.
pub const CLOUDS_WGSL: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let coverage = textureSample(t_albedo, s_surface, in.uv).r;
    let n = normalize(in.normal);
    let n_dot_l = max(dot(n, to_light()), 0.0);
    let s = sample_shadow(in.light_space);
    let brightness = AMBIENT + n_dot_l * shadow_visibility(s);
    return vec4<f32>(u.light_color.rgb * brightness, coverage);
}
"#;

/// Depth-only shader: uniforms plus the shadow stage.
pub fn shadow_source() -> String {
    [UNIFORMS_WGSL, SHADOW_WGSL].concat()
}

/// Main-pass shader: uniforms, material prelude and one fragment stage.
pub fn material_source(fragment: &str) -> String {
    [UNIFORMS_WGSL, MATERIAL_WGSL, fragment].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_struct_lists_slots_in_order() {
        let fields = [
            "model:",
            "view:",
            "proj:",
            "normal:",
            "light_dir:",
            "light_color:",
            "eye:",
            "light_view_proj:",
            "use_shadows:",
        ];
        let mut cursor = 0;
        for field in fields {
            let found = UNIFORMS_WGSL[cursor..]
                .find(field)
                .unwrap_or_else(|| panic!("{field} missing or out of order"));
            cursor += found + field.len();
        }
    }

    #[test]
    fn test_material_bindings_match_slots() {
        use crate::uniforms::{SAMPLER_BINDING, TextureSlot};
        for (slot, name) in [
            (TextureSlot::Albedo, "t_albedo"),
            (TextureSlot::Specular, "t_specular"),
            (TextureSlot::Night, "t_night"),
            (TextureSlot::Shadow, "t_shadow"),
        ] {
            let decl = format!("@binding({}) var {name}", slot.binding());
            assert!(MATERIAL_WGSL.contains(&decl), "{decl}");
        }
        assert!(MATERIAL_WGSL.contains(&format!("@binding({SAMPLER_BINDING}) var s_surface")));
    }

    #[test]
    fn test_composed_sources_have_entry_points() {
        assert!(shadow_source().contains("fn vs_shadow"));
        assert!(shadow_source().contains("fn fs_shadow"));
        for fragment in [BACKGROUND_WGSL, GENERIC_PLANET_WGSL, ROOT_PLANET_WGSL, CLOUDS_WGSL] {
            let source = material_source(fragment);
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
    }

    #[test]
    fn test_shadow_sentinel_matches_clear_value() {
        assert!(MATERIAL_WGSL.contains("SHADOW_CLEAR: f32 = 999999.0"));
        assert_eq!(crate::shadow::SHADOW_CLEAR_VALUE, 999_999.0);
    }
}
