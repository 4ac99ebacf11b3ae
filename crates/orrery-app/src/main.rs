//! Orrery viewer binary.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags, e.g. `orrery --width 1920 --height 1080 --shadows true`.

use std::process::ExitCode;

use clap::Parser;
use orrery_app::{AppError, PlatformDirs};
use orrery_config::{CliArgs, Config};
use tracing::{error, info};

fn load(args: &CliArgs) -> Result<(PlatformDirs, Config), AppError> {
    let dirs = match &args.config {
        Some(dir) => PlatformDirs::with_config_dir(dir.clone()),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    Ok((dirs, config))
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let (dirs, config) = match load(&args) {
        Ok(loaded) => loaded,
        Err(err) => {
            // Logging reads its level from the config, so it is not up yet.
            eprintln!("orrery: {err}");
            return ExitCode::FAILURE;
        }
    };

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!("Config directory: {}", dirs.config_dir.display());

    match orrery_app::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Fatal: {err}");
            ExitCode::FAILURE
        }
    }
}
