//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated three-body planetary scene")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Sample the shadow map in the main pass.
    #[arg(long)]
    pub shadows: Option<bool>,

    /// Draw the cloud overlay.
    #[arg(long)]
    pub clouds: Option<bool>,

    /// Initial simulation time scale.
    #[arg(long, allow_negative_numbers = true)]
    pub time_scale: Option<f64>,

    /// Directory containing the `textures/` folder.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(shadows) = args.shadows {
            self.render.shadows_enabled = shadows;
        }
        if let Some(clouds) = args.clouds {
            self.render.clouds_enabled = clouds;
        }
        if let Some(scale) = args.time_scale
            && scale != 0.0
        {
            self.time.initial_scale = scale;
        }
        if let Some(ref root) = args.assets {
            self.assets.root = root.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            shadows: Some(true),
            time_scale: Some(-2.0),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert!(config.render.shadows_enabled);
        assert!((config.time.initial_scale + 2.0).abs() < 1e-12);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert!(!config.render.clouds_enabled);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_zero_time_scale_ignored() {
        let mut config = Config::default();
        let args = CliArgs {
            time_scale: Some(0.0),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert!((config.time.initial_scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_from_args() {
        let args = CliArgs::parse_from(["orrery", "--clouds", "true", "--time-scale", "-1"]);
        assert_eq!(args.clouds, Some(true));
        assert_eq!(args.time_scale, Some(-1.0));
        assert!(args.width.is_none());
    }
}
