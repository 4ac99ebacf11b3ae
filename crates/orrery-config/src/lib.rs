//! Configuration for the orrery viewer.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line. Every section is `#[serde(default)]`, so a partial file
//! fills the missing values with defaults.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, BodyConfig, BodyMaterial, CameraConfig, Config, DebugConfig, LightConfig,
    RenderConfig, SceneConfig, TimeConfig, WindowConfig,
};
pub use error::ConfigError;
