//! Structured logging for the orrery viewer.
//!
//! Console output with uptime timestamps and module paths, plus a JSON log file
//! in debug builds. `RUST_LOG` wins over the configured level.

use std::fs::File;
use std::path::Path;

use orrery_config::Config;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::fmt::time::Uptime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives appended after the base level to quiet the GPU stack.
const GPU_DIRECTIVES: &str = "wgpu=warn,naga=warn";

/// Name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// JSON lines written to the debug log file.
pub type JsonFileLayer<S> = fmt::Layer<S, JsonFields, Format<Json, Uptime>, File>;

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether to also write the JSON file layer
/// * `config` - source of the `debug.log_level` base level
///
/// Crates that emit through the `log` facade reach the same subscriber via
/// `tracing-subscriber`'s `tracing-log` bridge.
///
/// ```no_run
/// use orrery_config::Config;
/// use orrery_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config_filter(config));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let log_file = log_dir
        .filter(|_| debug_build)
        .and_then(|dir| create_log_file(dir).ok());
    match log_file {
        Some(file) => subscriber.with(json_file_layer(file)).init(),
        None => subscriber.init(),
    }
}

/// Create `log_dir` if needed and truncate the JSON log inside it.
pub fn create_log_file(log_dir: &Path) -> std::io::Result<File> {
    std::fs::create_dir_all(log_dir)?;
    File::create(log_dir.join(LOG_FILE_NAME))
}

/// JSON layer without ANSI colors, one event per line.
pub fn json_file_layer<S>(file: File) -> JsonFileLayer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}

/// Build the filter string from the configured base level.
///
/// An empty or missing level falls back to `info`.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or("info");
    format!("{level},{GPU_DIRECTIVES}")
}

/// Filter used when `RUST_LOG` is unset.
pub fn config_filter(config: Option<&Config>) -> EnvFilter {
    EnvFilter::new(filter_directives(config))
}
