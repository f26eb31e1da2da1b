//! Tracing setup: stdout plus a non-blocking log file

use std::{env, path::PathBuf};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Directory of the log file; `None` logs to stdout only
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
    /// Default level when `RUST_LOG` is not set
    pub level: LevelFilter,
    /// Write the file as JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: Some(PathBuf::from(".")),
            file_name: "debug.log".into(),
            level: LevelFilter::DEBUG,
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Read `LOG_DIR`, `LOG_FILE`, `LOG_LEVEL` and `LOG_FORMAT`.
    ///
    /// `LOG_DIR=off` disables the file sink. Unparseable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("LOG_DIR") {
            config.log_dir = match dir.trim() {
                "" | "off" | "Off" => None,
                dir => Some(PathBuf::from(dir)),
            };
        }
        if let Some(file) = lookup("LOG_FILE").filter(|f| !f.trim().is_empty()) {
            config.file_name = file;
        }
        if let Some(level) = lookup("LOG_LEVEL").and_then(|l| l.parse().ok()) {
            config.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.json = format.eq_ignore_ascii_case("json");
        }

        config
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the process.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let stdout_layer = fmt::layer().with_target(false).boxed();

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, &config.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = if config.json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            };
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
