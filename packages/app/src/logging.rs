//! Tracing setup for the CLI.
//!
//! Events go to stderr so they never interleave with drill prompts on stdout.
//! Setting `ENABLE_FILE_LOGS=true` adds a daily-rolling `conjugar.log` under
//! `LOG_DIR`, or the data directory's `logs/` when that is unset.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "conjugar.log";

/// Flushes buffered file output when dropped; hold it for the whole run.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn flag_enabled(value: Option<String>) -> bool {
    matches!(value.as_deref().map(str::trim), Some("true" | "1" | "yes"))
}

/// Directory for rolling log files, or `None` when file logging is off
pub fn file_log_dir(default_dir: &Path) -> Option<PathBuf> {
    if !flag_enabled(std::env::var("ENABLE_FILE_LOGS").ok()) {
        return None;
    }
    Some(
        std::env::var_os("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir.to_path_buf()),
    )
}

/// Install the global subscriber; an unparsable `log_level` falls back to `warn`
pub fn init_tracing(log_level: &str, default_log_dir: &Path) -> Option<FileLogGuard> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut guard = None;
    let file_layer = file_log_dir(default_log_dir).and_then(|dir| match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(FileLogGuard { _guard: worker });
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        Err(err) => {
            eprintln!("file logging disabled, cannot create {}: {err}", dir.display());
            None
        }
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return None;
    }
    guard
}
