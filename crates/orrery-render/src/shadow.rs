//! Offscreen shadow target and the pipeline that fills it.
//!
//! The target pairs a standard-Z depth attachment with an `R32Float` color
//! attachment holding light-space depth, which the main pass reads back with
//! `textureLoad`. It is created once at startup and never resized.

use crate::buffer::VertexPositionNormalUv;
use crate::depth::{DepthBuffer, DepthConvention};

pub const SHADOW_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

/// Color clear value: farther than any depth the pass can write.
pub const SHADOW_CLEAR_VALUE: f64 = 999_999.0;

pub const SHADOW_CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: SHADOW_CLEAR_VALUE,
    g: SHADOW_CLEAR_VALUE,
    b: SHADOW_CLEAR_VALUE,
    a: SHADOW_CLEAR_VALUE,
};

/// Ways the shadow target can fall short of what the main pass expects.
/// None of them stop rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShadowTargetError {
    #[error("shadow map size must be non-zero")]
    ZeroSize,

    #[error("shadow map size {requested} exceeds the device limit {max}; using {max}")]
    Clamped { requested: u32, max: u32 },

    #[error("shadow color attachment is {actual:?}, expected {expected:?}")]
    ColorFormat {
        actual: wgpu::TextureFormat,
        expected: wgpu::TextureFormat,
    },

    #[error("shadow attachments differ in size: color {color}, depth {depth}")]
    SizeMismatch { color: u32, depth: u32 },

    #[error("shadow color attachment lacks usage {missing:?}")]
    MissingUsage { missing: wgpu::TextureUsages },
}

/// Size actually allocated for a requested shadow map size.
pub fn effective_size(requested: u32, max_dimension: u32) -> u32 {
    requested.clamp(1, max_dimension.max(1))
}

pub struct ShadowTarget {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth: DepthBuffer,
    requested: u32,
    size: u32,
}

impl ShadowTarget {
    pub const CONVENTION: DepthConvention = DepthConvention::Standard;

    pub fn new(device: &wgpu::Device, requested: u32) -> Self {
        let size = effective_size(requested, device.limits().max_texture_dimension_2d);
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow-color"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthBuffer::new(device, "shadow-depth", size, size, Self::CONVENTION);

        Self {
            color,
            color_view,
            depth,
            requested,
            size,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Every problem with the target as built, in the order found.
    pub fn check(&self) -> Vec<ShadowTargetError> {
        check_completeness(&ShadowTargetDesc {
            requested: self.requested,
            size: self.size,
            color_format: self.color.format(),
            color_usage: self.color.usage(),
            depth_size: self.depth.width(),
        })
    }
}

/// Plain description of a built shadow target.
#[derive(Debug, Clone, Copy)]
pub struct ShadowTargetDesc {
    pub requested: u32,
    pub size: u32,
    pub color_format: wgpu::TextureFormat,
    pub color_usage: wgpu::TextureUsages,
    pub depth_size: u32,
}

pub fn check_completeness(desc: &ShadowTargetDesc) -> Vec<ShadowTargetError> {
    let mut problems = Vec::new();
    if desc.requested == 0 {
        problems.push(ShadowTargetError::ZeroSize);
    } else if desc.requested != desc.size {
        problems.push(ShadowTargetError::Clamped {
            requested: desc.requested,
            max: desc.size,
        });
    }
    if desc.color_format != SHADOW_COLOR_FORMAT {
        problems.push(ShadowTargetError::ColorFormat {
            actual: desc.color_format,
            expected: SHADOW_COLOR_FORMAT,
        });
    }
    if desc.depth_size != desc.size {
        problems.push(ShadowTargetError::SizeMismatch {
            color: desc.size,
            depth: desc.depth_size,
        });
    }
    let required = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    if !desc.color_usage.contains(required) {
        problems.push(ShadowTargetError::MissingUsage {
            missing: required - desc.color_usage,
        });
    }
    problems
}

/// Renders bodies from the light into the shadow target.
pub struct ShadowPipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl ShadowPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        uniforms_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow-pipeline-layout"),
            bind_group_layouts: &[uniforms_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_shadow"),
                buffers: &[VertexPositionNormalUv::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: shadow_primitive_state(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: ShadowTarget::CONVENTION.compare(),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 1.75,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_shadow"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SHADOW_COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::RED,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline }
    }
}

/// Back faces only, so the recorded depth sits behind the lit surface.
fn shadow_primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: Some(wgpu::Face::Front),
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    }
}
