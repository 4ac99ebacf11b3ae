//! Main-pass and background pipelines and their shared material layout.
//!
//! All four pipelines take the same two groups: per-draw uniforms at group 0
//! and a material at group 1 (albedo, specular, night, sampler, shadow).
//! They differ only in fragment stage, depth state and blending.

use crate::buffer::VertexPositionNormalUv;
use crate::depth::{DepthConvention, depth_stencil_state};
use crate::uniforms::{SAMPLER_BINDING, TextureSlot};

/// How a mesh pipeline treats the depth buffer and the color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    /// Depth test and write, opaque.
    Opaque,
    /// No depth test or write, opaque. Drawn behind everything.
    Backdrop,
    /// Depth test without write, alpha blended.
    Translucent,
}

impl SurfaceMode {
    pub fn depth_stencil(self) -> wgpu::DepthStencilState {
        let mut state = depth_stencil_state(DepthConvention::ReverseZ, self == Self::Opaque);
        if self == Self::Backdrop {
            state.depth_compare = wgpu::CompareFunction::Always;
        }
        state
    }

    pub fn blend(self) -> Option<wgpu::BlendState> {
        match self {
            Self::Translucent => Some(wgpu::BlendState::ALPHA_BLENDING),
            Self::Opaque | Self::Backdrop => None,
        }
    }
}

fn texture_entry(slot: TextureSlot, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: slot.binding(),
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material-bgl"),
        entries: &[
            texture_entry(TextureSlot::Albedo, true),
            texture_entry(TextureSlot::Specular, true),
            texture_entry(TextureSlot::Night, true),
            wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            // R32Float is not filterable; the shader uses textureLoad.
            texture_entry(TextureSlot::Shadow, false),
        ],
    })
}

/// Views bound into one material group.
pub struct MaterialViews<'a> {
    pub albedo: &'a wgpu::TextureView,
    pub specular: &'a wgpu::TextureView,
    pub night: &'a wgpu::TextureView,
    pub shadow: &'a wgpu::TextureView,
}

pub fn create_material_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    views: &MaterialViews<'_>,
) -> wgpu::BindGroup {
    let view_entry = |slot: TextureSlot, view| wgpu::BindGroupEntry {
        binding: slot.binding(),
        resource: wgpu::BindingResource::TextureView(view),
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            view_entry(TextureSlot::Albedo, views.albedo),
            view_entry(TextureSlot::Specular, views.specular),
            view_entry(TextureSlot::Night, views.night),
            wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            view_entry(TextureSlot::Shadow, views.shadow),
        ],
    })
}

/// Pipeline layout shared by every mesh pipeline in the main target.
pub fn mesh_pipeline_layout(
    device: &wgpu::Device,
    uniforms_layout: &wgpu::BindGroupLayout,
    material_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh-pipeline-layout"),
        bind_group_layouts: &[uniforms_layout, material_layout],
        immediate_size: 0,
    })
}

/// Sphere pipeline for the main target. Culling is off so the sky sphere is
/// visible from inside and every body renders whole.
pub fn create_mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    mode: SurfaceMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexPositionNormalUv::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(mode.depth_stencil()),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: mode.blend(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
