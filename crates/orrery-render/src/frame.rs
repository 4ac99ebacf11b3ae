//! CPU-side frame planning.
//!
//! [`plan_frame`] turns a [`FrameState`] into the ordered list of draws for
//! one frame: shadow draws, the sky sphere, then every body with its
//! material, then the optional cloud shell. Nothing here touches the GPU, so
//! the ordering and uniform contents are testable on any machine.

use glam::{Mat4, Vec3};
use orrery_sim::{CelestialBody, FrameState, model_matrix, spin_angle};

use crate::uniforms::DrawUniforms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Shadow,
    Background,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineId {
    Shadow,
    Background,
    GenericPlanet,
    RootPlanet,
    Clouds,
}

/// Texture set bound at group 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialId {
    /// Day, specular and night maps.
    Earth,
    Moon,
    /// Star panorama.
    Sky,
    Clouds,
}

impl MaterialId {
    pub fn pipeline(self) -> PipelineId {
        match self {
            Self::Earth => PipelineId::RootPlanet,
            Self::Moon => PipelineId::GenericPlanet,
            Self::Sky => PipelineId::Background,
            Self::Clouds => PipelineId::Clouds,
        }
    }

    /// Material used when none is configured: the root gets the earth maps.
    pub fn for_body(body: &CelestialBody) -> Self {
        if body.parent.is_none() {
            Self::Earth
        } else {
            Self::Moon
        }
    }
}

/// Cloud shell drawn over the first earth-material body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudLayer {
    /// Multiplier on the body's scale.
    pub scale: f32,
    pub rotation_speed: f32,
}

impl Default for CloudLayer {
    fn default() -> Self {
        Self {
            scale: 1.01,
            rotation_speed: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub pass: PassKind,
    pub pipeline: PipelineId,
    pub material: Option<MaterialId>,
    /// Body drawn, `None` for the sky sphere.
    pub body: Option<usize>,
    pub uniforms: DrawUniforms,
}

/// Per-frame inputs the simulation does not own.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub projection: Mat4,
    pub background_projection: Mat4,
    pub sky_scale: f32,
    /// Material per body index. Missing entries fall back to
    /// [`MaterialId::for_body`].
    pub body_materials: &'a [MaterialId],
    pub clouds: Option<CloudLayer>,
}

/// Ordered draws of one frame. Draw `i` reads uniform block `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    /// Draws of one pass with their uniform slot index.
    pub fn pass(&self, kind: PassKind) -> impl Iterator<Item = (usize, &DrawCall)> {
        self.draws
            .iter()
            .enumerate()
            .filter(move |(_, draw)| draw.pass == kind)
    }

    pub fn uniforms(&self) -> Vec<DrawUniforms> {
        self.draws.iter().map(|draw| draw.uniforms).collect()
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

pub fn plan_frame(frame: &FrameState<'_>, inputs: &PlanInputs<'_>) -> FramePlan {
    let view = frame.camera.view_matrix();
    let scene = DrawUniforms::scene(frame, view, inputs.projection);
    let transforms = frame.body_transforms();
    let material_of = |index: usize| {
        inputs
            .body_materials
            .get(index)
            .copied()
            .unwrap_or_else(|| MaterialId::for_body(&frame.bodies[index]))
    };

    let mut draws = Vec::with_capacity(transforms.len() * 2 + 2);

    for (index, transform) in transforms.iter().enumerate() {
        draws.push(DrawCall {
            pass: PassKind::Shadow,
            pipeline: PipelineId::Shadow,
            material: None,
            body: Some(index),
            uniforms: scene.with_body(transform),
        });
    }

    let sky_model = Mat4::from_translation(frame.camera.position)
        * Mat4::from_scale(Vec3::splat(inputs.sky_scale));
    draws.push(DrawCall {
        pass: PassKind::Background,
        pipeline: PipelineId::Background,
        material: Some(MaterialId::Sky),
        body: None,
        uniforms: DrawUniforms::scene(frame, view, inputs.background_projection)
            .with_model(sky_model),
    });

    for (index, transform) in transforms.iter().enumerate() {
        let material = material_of(index);
        draws.push(DrawCall {
            pass: PassKind::Main,
            pipeline: material.pipeline(),
            material: Some(material),
            body: Some(index),
            uniforms: scene.with_body(transform),
        });
    }

    if let Some(layer) = inputs.clouds {
        let earth = (0..transforms.len()).find(|&index| material_of(index) == MaterialId::Earth);
        if let Some(index) = earth {
            let body = &frame.bodies[index];
            let model = model_matrix(
                frame.world_positions[index],
                spin_angle(frame.simulation_time, layer.rotation_speed),
                body.scale * layer.scale,
            );
            draws.push(DrawCall {
                pass: PassKind::Main,
                pipeline: PipelineId::Clouds,
                material: Some(MaterialId::Clouds),
                body: Some(index),
                uniforms: scene.with_model(model),
            });
        }
    }

    FramePlan { draws }
}
