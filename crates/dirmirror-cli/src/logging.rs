//! Log sink setup: an append-only file in the log directory, mirrored to stdout

use anyhow::{Context, Result};
use dirmirror_config::LoggingConfig;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{fmt, EnvFilter};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Keeps the background file writer alive; drop it last to flush
pub struct LogGuard {
    /// Full path of the log file
    pub log_path: PathBuf,
    _guard: WorkerGuard,
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(log_dir: &Path, config: &LoggingConfig, console: bool) -> Result<LogGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level '{}'", config.level))?,
    };

    let (subscriber, guard) = subscriber(log_dir, config, console, filter)?;
    subscriber.try_init().context("Failed to install logger")?;
    Ok(guard)
}

/// Build the file and console layers without installing them
fn subscriber(
    log_dir: &Path,
    config: &LoggingConfig,
    console: bool,
    filter: EnvFilter,
) -> Result<(impl Subscriber + Send + Sync + 'static, LogGuard)> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(config.file_name.as_str())
        .build(log_dir)
        .with_context(|| format!("Failed to open log file in '{}'", log_dir.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));

    let console_layer = console.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer);

    Ok((
        subscriber,
        LogGuard {
            log_path: log_dir.join(&config.file_name),
            _guard: guard,
        },
    ))
}
