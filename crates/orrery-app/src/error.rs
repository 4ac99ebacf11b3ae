//! Startup failures. Each one aborts the viewer with a logged error.

use orrery_config::ConfigError;
use orrery_render::{RenderContextError, RendererError};
use orrery_sim::{CameraSettingsError, HierarchyError};

use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid scene: {0}")]
    Scene(#[from] HierarchyError),

    #[error("invalid camera settings: {0}")]
    Camera(#[from] CameraSettingsError),

    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("renderer setup failed: {0}")]
    Renderer(#[from] RendererError),
}
