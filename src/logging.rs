use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Where and how much to log on disk.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
    /// File name prefix; rotated files get a date suffix.
    pub file_name: String,
    /// How many rotated files to keep.
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            file_name: "api.log".to_owned(),
            max_files: 5,
        }
    }
}

/// Initialize logging to stdout and a daily-rotated JSON log file.
///
/// Defaults to `info` level unless overridden by `TUBESCRIPT_LOG`. The returned guard flushes the
/// file writer on drop, so keep it alive for the lifetime of the process.
///
/// Calling this more than once is harmless: later calls keep the first subscriber.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_name)
        .max_log_files(config.max_files.max(1))
        .build(&config.dir)
        .with_context(|| format!("failed to open log directory '{}'", config.dir.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::builder()
        .with_env_var("TUBESCRIPT_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(file_writer),
        )
        .try_init();

    Ok(guard)
}
