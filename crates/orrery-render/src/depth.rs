//! Depth attachments.
//!
//! The main and background passes use reverse-Z: the near plane maps to 1.0
//! and the far plane to 0.0, so the buffer clears to 0.0 and closer fragments
//! win with `GreaterEqual`. The shadow pass keeps standard depth so the value
//! it writes into its color target grows with distance from the light.

/// Depth mapping and the clear value and comparison that go with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthConvention {
    /// Near = 1.0, far = 0.0.
    ReverseZ,
    /// Near = 0.0, far = 1.0.
    Standard,
}

impl DepthConvention {
    /// Depth of the far plane, the value every pass clears to.
    pub fn clear_value(self) -> f32 {
        match self {
            Self::ReverseZ => 0.0,
            Self::Standard => 1.0,
        }
    }

    pub fn compare(self) -> wgpu::CompareFunction {
        match self {
            Self::ReverseZ => wgpu::CompareFunction::GreaterEqual,
            Self::Standard => wgpu::CompareFunction::Less,
        }
    }
}

pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub convention: DepthConvention,
    label: &'static str,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Zero dimensions clamp to 1.
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        width: u32,
        height: u32,
        convention: DepthConvention,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            convention,
            label,
            width,
            height,
        }
    }

    /// Recreate at a new size. No-op when the size is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width.max(1) && self.height == height.max(1) {
            return;
        }
        *self = Self::new(device, self.label, width, height, self.convention);
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

/// Pipeline-side depth state for a [`DepthBuffer::FORMAT`] attachment.
pub fn depth_stencil_state(
    convention: DepthConvention,
    depth_write_enabled: bool,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DepthBuffer::FORMAT,
        depth_write_enabled,
        depth_compare: convention.compare(),
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}
