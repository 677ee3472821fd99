// src/logging.rs
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "muse_career=info,musecareer=info,rocket=warn";

/// Log through `tracing` at the given level: `app_log!(info, "port {}", port)`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

/// Open an info-level span: `app_span!("cv_upload", filename = %name)`.
#[macro_export]
macro_rules! app_span {
    ($name:expr) => {
        ::tracing::info_span!($name)
    };
    ($name:expr, $($fields:tt)+) => {
        ::tracing::info_span!($name, $($fields)+)
    };
}

/// Install the global subscriber: human-readable lines on stderr, plus JSON
/// lines in `log_file` when one is given (truncated on startup).
pub fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
