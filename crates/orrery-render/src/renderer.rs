//! The scene renderer: owns every GPU resource of the scene and records the
//! shadow pass followed by the background and main draws each frame.

use std::path::PathBuf;

use orrery_sim::{FrameState, Projection};

use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::depth::{DepthBuffer, DepthConvention};
use crate::frame::{CloudLayer, FramePlan, MaterialId, PassKind, PipelineId, PlanInputs, plan_frame};
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::pipelines::{
    MaterialViews, SurfaceMode, create_material_bind_group, create_mesh_pipeline,
    material_bind_group_layout, mesh_pipeline_layout,
};
use crate::shader::{ShaderError, ShaderLibrary};
use crate::shaders;
use crate::shadow::{SHADOW_CLEAR_COLOR, ShadowPipeline, ShadowTarget};
use crate::sphere::uv_sphere;
use crate::state::PipelineState;
use crate::texture::{ColorSpace, Texture2d, TextureError, create_surface_sampler};
use crate::uniforms::UniformRing;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Resolved texture files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePaths {
    pub earth_day: PathBuf,
    pub earth_specular: PathBuf,
    pub earth_night: PathBuf,
    /// Optional: a missing file falls back to clear sky.
    pub earth_clouds: PathBuf,
    pub moon: PathBuf,
    pub stars: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    /// Edge of the square shadow target.
    pub shadow_map_size: u32,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    /// Radius of the sky sphere around the camera.
    pub sky_scale: f32,
    pub sphere_stacks: u32,
    pub sphere_sectors: u32,
    pub clouds: Option<CloudLayer>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            fov_y_radians: 50f32.to_radians(),
            near: 0.01,
            far: 100.0,
            sky_scale: 100.0,
            sphere_stacks: 32,
            sphere_sectors: 64,
            clouds: None,
        }
    }
}

impl RendererSettings {
    pub fn projection(&self, width: u32, height: u32) -> Projection {
        let mut projection = Projection::Perspective {
            fov_y: self.fov_y_radians,
            aspect_ratio: 1.0,
            near: self.near,
            far: self.far,
        };
        projection.set_viewport(width, height);
        projection
    }
}

/// Fixed projection of the sky sphere.
pub fn background_projection() -> Projection {
    Projection::Orthographic {
        half_width: 1.0,
        half_height: 1.0,
        near: 0.01,
        far: 200.0,
    }
}

struct Pipelines {
    shadow: ShadowPipeline,
    background: wgpu::RenderPipeline,
    generic_planet: wgpu::RenderPipeline,
    root_planet: wgpu::RenderPipeline,
    clouds: wgpu::RenderPipeline,
}

impl Pipelines {
    fn get(&self, id: PipelineId) -> &wgpu::RenderPipeline {
        match id {
            PipelineId::Shadow => &self.shadow.pipeline,
            PipelineId::Background => &self.background,
            PipelineId::GenericPlanet => &self.generic_planet,
            PipelineId::RootPlanet => &self.root_planet,
            PipelineId::Clouds => &self.clouds,
        }
    }
}

struct Materials {
    earth: wgpu::BindGroup,
    moon: wgpu::BindGroup,
    sky: wgpu::BindGroup,
    clouds: wgpu::BindGroup,
}

impl Materials {
    fn get(&self, id: MaterialId) -> &wgpu::BindGroup {
        match id {
            MaterialId::Earth => &self.earth,
            MaterialId::Moon => &self.moon,
            MaterialId::Sky => &self.sky,
            MaterialId::Clouds => &self.clouds,
        }
    }
}

/// Scene textures. Bind groups reference the views; the struct keeps the
/// textures alive alongside them.
struct SceneTextures {
    earth_day: Texture2d,
    earth_specular: Texture2d,
    earth_night: Texture2d,
    earth_clouds: Texture2d,
    moon: Texture2d,
    stars: Texture2d,
    black: Texture2d,
}

impl SceneTextures {
    fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &TexturePaths,
        clouds_enabled: bool,
    ) -> Result<Self, TextureError> {
        let earth_clouds = if clouds_enabled {
            Texture2d::load_or_placeholder(
                device,
                queue,
                &paths.earth_clouds,
                ColorSpace::Linear,
                [0, 0, 0, 0],
            )
        } else {
            Texture2d::placeholder(device, queue, ColorSpace::Linear, [0, 0, 0, 0])
        };

        Ok(Self {
            earth_day: Texture2d::load(device, queue, &paths.earth_day, ColorSpace::Srgb)?,
            earth_specular: Texture2d::load(
                device,
                queue,
                &paths.earth_specular,
                ColorSpace::Linear,
            )?,
            earth_night: Texture2d::load(device, queue, &paths.earth_night, ColorSpace::Srgb)?,
            earth_clouds,
            moon: Texture2d::load(device, queue, &paths.moon, ColorSpace::Srgb)?,
            stars: Texture2d::load(device, queue, &paths.stars, ColorSpace::Srgb)?,
            black: Texture2d::placeholder(device, queue, ColorSpace::Srgb, [0, 0, 0, 255]),
        })
    }
}

/// Compile every scene shader into one library, keyed by pipeline name.
fn load_scene_shaders(device: &wgpu::Device) -> Result<ShaderLibrary, ShaderError> {
    let sources = [
        ("shadow", shaders::shadow_source()),
        ("background", shaders::material_source(shaders::BACKGROUND_WGSL)),
        ("generic-planet", shaders::material_source(shaders::GENERIC_PLANET_WGSL)),
        ("root-planet", shaders::material_source(shaders::ROOT_PLANET_WGSL)),
        ("clouds", shaders::material_source(shaders::CLOUDS_WGSL)),
    ];
    let mut library = ShaderLibrary::new();
    for (name, source) in &sources {
        library.load_from_source(device, name, source)?;
    }
    Ok(library)
}

pub struct SceneRenderer {
    settings: RendererSettings,
    projection: Projection,
    body_materials: Vec<MaterialId>,
    sphere: MeshBuffer,
    uniforms: UniformRing,
    shadow_target: ShadowTarget,
    depth: DepthBuffer,
    pipelines: Pipelines,
    materials: Materials,
    shaders: ShaderLibrary,
    _textures: SceneTextures,
}

impl SceneRenderer {
    pub fn new(
        gpu: &RenderContext,
        settings: RendererSettings,
        textures: &TexturePaths,
        body_materials: Vec<MaterialId>,
    ) -> Result<Self, RendererError> {
        let (width, height) = gpu.size();
        Self::with_device(
            &gpu.device,
            &gpu.queue,
            gpu.surface_format,
            (width, height),
            settings,
            textures,
            body_materials,
        )
    }

    /// Build against a device and target format without a surface.
    pub fn with_device(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        (width, height): (u32, u32),
        settings: RendererSettings,
        textures: &TexturePaths,
        body_materials: Vec<MaterialId>,
    ) -> Result<Self, RendererError> {
        let textures = SceneTextures::load(device, queue, textures, settings.clouds.is_some())?;

        let shadow_target = ShadowTarget::new(device, settings.shadow_map_size);
        for problem in shadow_target.check() {
            log::warn!("Shadow target incomplete: {problem}");
        }

        let shaders = load_scene_shaders(device)?;
        log::info!("Compiled {} scene shaders", shaders.len());

        let uniforms = UniformRing::new(device, body_materials.len() * 2 + 2);
        let material_layout = material_bind_group_layout(device);
        let layout = mesh_pipeline_layout(device, &uniforms.layout, &material_layout);
        let pipelines = Pipelines {
            shadow: ShadowPipeline::new(device, &*shaders.require("shadow")?, &uniforms.layout),
            background: create_mesh_pipeline(
                device,
                "background-pipeline",
                &layout,
                &*shaders.require("background")?,
                target_format,
                SurfaceMode::Backdrop,
            ),
            generic_planet: create_mesh_pipeline(
                device,
                "generic-planet-pipeline",
                &layout,
                &*shaders.require("generic-planet")?,
                target_format,
                SurfaceMode::Opaque,
            ),
            root_planet: create_mesh_pipeline(
                device,
                "root-planet-pipeline",
                &layout,
                &*shaders.require("root-planet")?,
                target_format,
                SurfaceMode::Opaque,
            ),
            clouds: create_mesh_pipeline(
                device,
                "clouds-pipeline",
                &layout,
                &*shaders.require("clouds")?,
                target_format,
                SurfaceMode::Translucent,
            ),
        };

        let sampler = create_surface_sampler(device);
        let shadow = &shadow_target.color_view;
        let black = &textures.black.view;
        let material = |label: &str, albedo, specular, night| {
            create_material_bind_group(
                device,
                label,
                &material_layout,
                &sampler,
                &MaterialViews {
                    albedo,
                    specular,
                    night,
                    shadow,
                },
            )
        };
        let materials = Materials {
            earth: material(
                "material-earth",
                &textures.earth_day.view,
                &textures.earth_specular.view,
                &textures.earth_night.view,
            ),
            moon: material("material-moon", &textures.moon.view, black, black),
            sky: material("material-sky", &textures.stars.view, black, black),
            clouds: material("material-clouds", &textures.earth_clouds.view, black, black),
        };

        let sphere = uv_sphere(settings.sphere_stacks, settings.sphere_sectors)
            .upload(&BufferAllocator::new(device), "sphere");
        let depth = DepthBuffer::new(
            device,
            "scene-depth",
            width,
            height,
            DepthConvention::ReverseZ,
        );
        let projection = settings.projection(width, height);

        log::info!(
            "Scene renderer ready: {} bodies, shadow map {}x{}",
            body_materials.len(),
            shadow_target.size(),
            shadow_target.size()
        );

        Ok(Self {
            settings,
            projection,
            body_materials,
            sphere,
            uniforms,
            shadow_target,
            depth,
            pipelines,
            materials,
            shaders,
            _textures: textures,
        })
    }

    /// Follow a surface resize. The shadow target keeps its size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
        self.projection.set_viewport(width, height);
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn shadow_target(&self) -> &ShadowTarget {
        &self.shadow_target
    }

    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    pub fn plan(&self, frame: &FrameState<'_>) -> FramePlan {
        plan_frame(
            frame,
            &PlanInputs {
                projection: self.projection.matrix(),
                background_projection: background_projection().matrix(),
                sky_scale: self.settings.sky_scale,
                body_materials: &self.body_materials,
                clouds: self.settings.clouds,
            },
        )
    }

    /// Draw one frame to the window surface.
    pub fn render(
        &mut self,
        gpu: &RenderContext,
        frame: &FrameState<'_>,
    ) -> Result<(), SurfaceError> {
        let plan = self.plan(frame);
        self.prepare(&gpu.device, &gpu.queue, &plan);

        let surface_texture = gpu.get_current_texture()?;
        let mut frame_encoder = FrameEncoder::new(&gpu.device, gpu.queue.clone(), surface_texture);
        if let Some((encoder, surface_view)) = frame_encoder.parts() {
            self.encode(encoder, surface_view, &plan);
        }
        frame_encoder.submit();
        Ok(())
    }

    /// Record the shadow pass, then the background and main draws into
    /// `color_view`. Uniforms for `plan` must already be written.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        let mut state = PipelineState::new();
        {
            let mut pass = RenderPassBuilder::new()
                .clear_color(SHADOW_CLEAR_COLOR)
                .depth(&self.shadow_target.depth.view, ShadowTarget::CONVENTION)
                .label("shadow-pass")
                .begin(encoder, &self.shadow_target.color_view);
            self.record(&mut pass, &mut state, plan, PassKind::Shadow);
        }

        state.reset();
        let mut pass = RenderPassBuilder::new()
            .clear_color(wgpu::Color::BLACK)
            .depth(&self.depth.view, DepthConvention::ReverseZ)
            .label("scene-pass")
            .begin(encoder, color_view);
        self.record(&mut pass, &mut state, plan, PassKind::Background);
        self.record(&mut pass, &mut state, plan, PassKind::Main);
    }

    fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        state: &mut PipelineState,
        plan: &FramePlan,
        kind: PassKind,
    ) {
        for (slot, draw) in plan.pass(kind) {
            let offset = self.uniforms.offset(slot);
            let changes = state.prepare(draw.pipeline, offset, draw.material);
            if changes.pipeline {
                pass.set_pipeline(self.pipelines.get(draw.pipeline));
            }
            if changes.uniforms {
                pass.set_bind_group(0, self.uniforms.bind_group(), &[offset]);
            }
            if changes.material
                && let Some(material) = draw.material
            {
                pass.set_bind_group(1, self.materials.get(material), &[]);
            }
            if changes.mesh {
                self.sphere.bind(pass);
            }
            self.sphere.draw(pass);
        }
    }

    /// Upload the uniforms of `plan` without drawing.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, plan: &FramePlan) {
        self.uniforms.write(device, queue, &plan.uniforms());
    }
}
