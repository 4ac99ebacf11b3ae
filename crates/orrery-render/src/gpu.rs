//! Device, queue and window surface.
//!
//! [`RenderContext`] is created once the window exists. Startup problems are
//! reported as [`RenderContextError`] and end the program; problems acquiring
//! a frame are reported as [`SurfaceError`] and are mostly recoverable.

use std::sync::Arc;

use winit::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    #[error("no graphics adapter can present to this window")]
    NoAdapter,

    #[error("graphics device request rejected: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("window surface could not be created: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("window surface exposes no texture formats")]
    NoSurfaceFormat,
}

/// Why the next swapchain image could not be acquired.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Still unavailable after one reconfigure.
    #[error("surface lost")]
    Lost,

    #[error("out of memory")]
    OutOfMemory,

    /// The frame is skipped.
    #[error("timeout")]
    Timeout,
}

pub struct RenderContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl RenderContext {
    /// Pick an adapter that can present to `window` and configure its surface.
    /// With `vsync` the surface presents in FIFO order.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let (width, height) = {
            let inner = window.inner_size();
            (inner.width.max(1), inner.height.max(1))
        };
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .map_err(|_| RenderContextError::NoAdapter)?;
        let adapter_info = adapter.get_info();
        log::info!(
            "Rendering on {} via {:?} ({:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orrery-device"),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format =
            choose_surface_format(&caps.formats).ok_or(RenderContextError::NoSurfaceFormat)?;
        let present_mode = choose_present_mode(&caps.present_modes, vsync);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Presenting {surface_format:?} with {present_mode:?}");

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: Vec::new(),
        };
        surface.configure(&device, &surface_config);

        Ok(Self {
            adapter,
            device,
            queue,
            surface,
            surface_config,
            surface_format,
        })
    }

    /// Zero extents are raised to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.reconfigure();
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Next swapchain image. A lost or outdated surface gets one reconfigure
    /// and retry before [`SurfaceError::Lost`] is returned.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        let err = match self.surface.get_current_texture() {
            Ok(frame) => return Ok(frame),
            Err(err) => err,
        };
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::warn!("Surface {err:?}, reconfiguring");
                self.reconfigure();
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
            wgpu::SurfaceError::Timeout => Err(SurfaceError::Timeout),
            wgpu::SurfaceError::OutOfMemory => Err(SurfaceError::OutOfMemory),
            wgpu::SurfaceError::Other => {
                log::error!("Surface acquisition failed for an unspecified reason");
                Err(SurfaceError::Lost)
            }
        }
    }
}

/// Blocking wrapper around [`RenderContext::new`].
pub fn init_render_context_blocking(
    window: Arc<Window>,
    vsync: bool,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, vsync))
}

/// BGRA sRGB, RGBA sRGB, any other sRGB format, then the first one offered.
fn choose_surface_format(offered: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat::{Bgra8UnormSrgb, Rgba8UnormSrgb};

    [Bgra8UnormSrgb, Rgba8UnormSrgb]
        .into_iter()
        .find(|format| offered.contains(format))
        .or_else(|| offered.iter().copied().find(wgpu::TextureFormat::is_srgb))
        .or_else(|| offered.first().copied())
}

fn choose_present_mode(supported: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    use wgpu::PresentMode::{Fifo, Immediate, Mailbox};

    if vsync {
        return Fifo;
    }
    [Immediate, Mailbox]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(Fifo)
}
