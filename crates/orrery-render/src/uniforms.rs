//! Per-draw uniform block and the ring buffer that holds one block per draw.
//!
//! The block's field order is the stable uniform slot contract shared with
//! every shader: 0 model, 1 view, 2 projection, 3 normal matrix, 4 light
//! direction, 5 light color, 6 eye position, 7 light view-projection,
//! 8 shadow-enable flag. The shading mode rides in the same word group as
//! slot 8.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use orrery_sim::{BodyTransform, FrameState, normal_matrix};

/// Uniform slots in shader declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum UniformSlot {
    Model = 0,
    View = 1,
    Projection = 2,
    NormalMatrix = 3,
    LightDirection = 4,
    LightColor = 5,
    EyePosition = 6,
    LightViewProjection = 7,
    ShadowEnable = 8,
}

impl UniformSlot {
    pub const ALL: [Self; 9] = [
        Self::Model,
        Self::View,
        Self::Projection,
        Self::NormalMatrix,
        Self::LightDirection,
        Self::LightColor,
        Self::EyePosition,
        Self::LightViewProjection,
        Self::ShadowEnable,
    ];

    /// Byte offset of the slot inside [`DrawUniforms`] under WGSL uniform
    /// layout rules.
    pub const fn byte_offset(self) -> usize {
        match self {
            Self::Model => 0,
            Self::View => 64,
            Self::Projection => 128,
            Self::NormalMatrix => 192,
            Self::LightDirection => 240,
            Self::LightColor => 256,
            Self::EyePosition => 272,
            Self::LightViewProjection => 288,
            Self::ShadowEnable => 352,
        }
    }
}

/// Texture bindings of the material group (group 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureSlot {
    Albedo = 0,
    Specular = 1,
    Night = 2,
    Shadow = 4,
}

impl TextureSlot {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

/// Binding of the filtering sampler shared by the color maps.
pub const SAMPLER_BINDING: u32 = 3;

/// One draw's uniforms. `mat3x3<f32>` occupies three padded columns.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub eye: [f32; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub use_shadows: u32,
    pub shading_mode: u32,
    pub _padding: [u32; 2],
}

impl DrawUniforms {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Frame-wide fields filled in, identity model.
    pub fn scene(frame: &FrameState<'_>, view: Mat4, proj: Mat4) -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            normal: pad_mat3(Mat3::IDENTITY),
            light_dir: frame.light.direction.extend(0.0).to_array(),
            light_color: frame.light.color.extend(1.0).to_array(),
            eye: frame.camera.position.extend(1.0).to_array(),
            light_view_proj: frame.light_view_proj.to_cols_array_2d(),
            use_shadows: u32::from(frame.shadows_enabled),
            shading_mode: frame.shading_mode.as_u32(),
            _padding: [0; 2],
        }
    }

    pub fn with_body(mut self, transform: &BodyTransform) -> Self {
        self.model = transform.model.to_cols_array_2d();
        self.normal = pad_mat3(transform.normal);
        self
    }

    /// Model matrix with its derived normal matrix.
    pub fn with_model(self, model: Mat4) -> Self {
        self.with_body(&BodyTransform {
            model,
            normal: normal_matrix(&model),
        })
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

fn pad_mat3(m: Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

/// Round `size` up to the device's dynamic-offset alignment.
pub fn aligned_stride(size: u64, alignment: u32) -> u64 {
    let alignment = u64::from(alignment.max(1));
    size.div_ceil(alignment) * alignment
}

/// One uniform buffer holding a block per draw, addressed by dynamic offset.
pub struct UniformRing {
    pub layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl UniformRing {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-uniforms-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(DrawUniforms::SIZE),
                },
                count: None,
            }],
        });
        let stride = aligned_stride(
            DrawUniforms::SIZE,
            device.limits().min_uniform_buffer_offset_alignment,
        );
        let capacity = capacity.max(1);
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, capacity);

        Self {
            layout,
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-uniforms-bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(DrawUniforms::SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Upload one block per draw in a single write, growing the buffer when
    /// the frame has more draws than it holds.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, blocks: &[DrawUniforms]) {
        if blocks.len() > self.capacity {
            self.capacity = blocks.len().next_power_of_two();
            log::debug!("Growing uniform ring to {} slots", self.capacity);
            (self.buffer, self.bind_group) =
                Self::allocate(device, &self.layout, self.stride, self.capacity);
        }

        pack_blocks(&mut self.staging, blocks, self.stride as usize);
        if !self.staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staging);
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Dynamic offset of draw `slot`.
    pub fn offset(&self, slot: usize) -> u32 {
        (slot as u64 * self.stride) as u32
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Lay `blocks` out `stride` bytes apart, zero-filling the gaps.
fn pack_blocks(staging: &mut Vec<u8>, blocks: &[DrawUniforms], stride: usize) {
    staging.clear();
    staging.resize(blocks.len() * stride, 0);
    for (chunk, block) in staging.chunks_exact_mut(stride).zip(blocks) {
        chunk[..DrawUniforms::SIZE as usize].copy_from_slice(bytemuck::bytes_of(block));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn test_block_size_matches_wgsl_layout() {
        assert_eq!(DrawUniforms::SIZE, 368);
        assert_eq!(DrawUniforms::SIZE % 16, 0);
    }

    #[test]
    fn test_slot_offsets_match_struct_fields() {
        let fields = [
            offset_of!(DrawUniforms, model),
            offset_of!(DrawUniforms, view),
            offset_of!(DrawUniforms, proj),
            offset_of!(DrawUniforms, normal),
            offset_of!(DrawUniforms, light_dir),
            offset_of!(DrawUniforms, light_color),
            offset_of!(DrawUniforms, eye),
            offset_of!(DrawUniforms, light_view_proj),
            offset_of!(DrawUniforms, use_shadows),
        ];
        for (slot, offset) in UniformSlot::ALL.iter().zip(fields) {
            assert_eq!(slot.byte_offset(), offset, "{slot:?}");
        }
        for (index, slot) in UniformSlot::ALL.iter().enumerate() {
            assert_eq!(*slot as usize, index);
        }
    }

    #[test]
    fn test_texture_slots() {
        assert_eq!(TextureSlot::Albedo.binding(), 0);
        assert_eq!(TextureSlot::Specular.binding(), 1);
        assert_eq!(TextureSlot::Night.binding(), 2);
        assert_eq!(SAMPLER_BINDING, 3);
        assert_eq!(TextureSlot::Shadow.binding(), 4);
    }

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(368, 256), 512);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(368, 0), 368);
    }

    #[test]
    fn test_pack_blocks_places_each_block_at_stride() {
        let mut a = DrawUniforms::zeroed();
        a.shading_mode = 2;
        let mut b = DrawUniforms::zeroed();
        b.use_shadows = 1;

        let mut staging = vec![0xAA; 3];
        pack_blocks(&mut staging, &[a, b], 512);
        assert_eq!(staging.len(), 1024);

        let second: DrawUniforms = bytemuck::pod_read_unaligned(&staging[512..512 + 368]);
        assert_eq!(second.use_shadows, 1);
        let first: DrawUniforms = bytemuck::pod_read_unaligned(&staging[..368]);
        assert_eq!(first.shading_mode, 2);
        assert!(staging[368..512].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_with_model_derives_normal_matrix() {
        let model = Mat4::from_scale(glam::Vec3::new(2.0, 2.0, 2.0));
        let uniforms = DrawUniforms::zeroed().with_model(model);
        assert_eq!(uniforms.model_matrix(), model);
        assert!((uniforms.normal[0][0] - 0.5).abs() < 1e-6);
        assert_eq!(uniforms.normal[0][3], 0.0);
    }

    #[test]
    fn test_ring_offsets_and_growth() {
        let Some((device, queue)) = crate::texture::create_test_device_queue() else {
            return;
        };
        let mut ring = UniformRing::new(&device, 2);
        let stride = ring.offset(1);
        assert_eq!(stride % device.limits().min_uniform_buffer_offset_alignment, 0);
        ring.write(&device, &queue, &[DrawUniforms::zeroed(); 5]);
        assert_eq!(ring.capacity(), 8);
        assert_eq!(ring.offset(4), 4 * stride);
    }
}
