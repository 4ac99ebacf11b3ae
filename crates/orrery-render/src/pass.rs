//! Render pass setup and per-frame command encoding.
//!
//! [`RenderPassBuilder`] describes one pass's clears and attachments;
//! [`FrameEncoder`] owns the frame's command encoder and surface texture and
//! submits them exactly once.

use crate::depth::DepthConvention;

/// Depth attachment borrowed for the lifetime of a builder.
#[derive(Debug, Clone, Copy)]
pub struct DepthAttachment<'a> {
    pub view: &'a wgpu::TextureView,
    pub clear_value: f32,
}

/// Single color target, optional depth, both cleared on load.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassBuilder<'a> {
    clear_color: wgpu::Color,
    depth: Option<DepthAttachment<'a>>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RenderPassBuilder<'a> {
    /// Black clear, no depth.
    pub fn new() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            depth: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Attach `view` as depth, cleared to the convention's far plane.
    pub fn depth(mut self, view: &'a wgpu::TextureView, convention: DepthConvention) -> Self {
        self.depth = Some(DepthAttachment {
            view,
            clear_value: convention.clear_value(),
        });
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            self.depth
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(depth.clear_value),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Per-frame command encoder bound to one surface texture.
pub struct FrameEncoder {
    encoder: Option<wgpu::CommandEncoder>,
    queue: wgpu::Queue,
    surface_texture: Option<wgpu::SurfaceTexture>,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(
        device: &wgpu::Device,
        queue: wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder: Some(encoder),
            queue,
            surface_texture: Some(surface_texture),
            surface_view,
        }
    }

    /// The encoder and the surface view, borrowed together. `None` once the
    /// frame has been submitted.
    pub fn parts(&mut self) -> Option<(&mut wgpu::CommandEncoder, &wgpu::TextureView)> {
        let encoder = self.encoder.as_mut()?;
        Some((encoder, &self.surface_view))
    }

    /// Submit the recorded commands and present. Consumes the frame.
    pub fn submit(mut self) {
        self.flush();
    }

    /// Returns whether anything was submitted.
    fn flush(&mut self) -> bool {
        let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        else {
            return false;
        };
        self.queue.submit([encoder.finish()]);
        surface_texture.present();
        true
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        if self.flush() {
            log::warn!("FrameEncoder dropped without explicit submit() - auto-submitting");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clear_color_is_black() {
        let builder = RenderPassBuilder::new();
        assert_eq!(builder.clear_color, wgpu::Color::BLACK);
        assert!(builder.depth.is_none());
        assert!(builder.label.is_none());
    }

    #[test]
    fn test_builder_sets_clear_color() {
        let sentinel = wgpu::Color {
            r: 999_999.0,
            g: 0.0,
            b: 0.0,
            a: 0.0,
        };
        let builder = RenderPassBuilder::new().clear_color(sentinel);
        assert_eq!(builder.clear_color.r, 999_999.0);
    }

    #[test]
    fn test_label_is_stored() {
        let builder = RenderPassBuilder::new().label("shadow-pass");
        assert_eq!(builder.label, Some("shadow-pass"));
    }

    #[test]
    fn test_depth_clear_follows_convention() {
        let Some((device, _queue)) = crate::texture::create_test_device_queue() else {
            return;
        };
        let depth = crate::depth::DepthBuffer::new(&device, "d", 4, 4, DepthConvention::Standard);
        let builder = RenderPassBuilder::new().depth(&depth.view, DepthConvention::Standard);
        assert_eq!(builder.depth.map(|d| d.clear_value), Some(1.0));
        let builder = builder.depth(&depth.view, DepthConvention::ReverseZ);
        assert_eq!(builder.depth.map(|d| d.clear_value), Some(0.0));
    }
}
