use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Where log lines end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    /// The terminal form shares the tty with stderr, so without a file the
    /// lines are dropped.
    Discard,
}

impl LogTarget {
    pub fn select(config: &LoggingConfig, interactive: bool) -> Self {
        match &config.file {
            Some(path) => LogTarget::File(path.clone()),
            None if interactive => LogTarget::Discard,
            None => LogTarget::Stderr,
        }
    }
}

/// Installs the global tracing subscriber. `interactive` is true when the
/// terminal form will own the screen.
pub fn init(config: &LoggingConfig, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level: {}", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match LogTarget::select(config, interactive) {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::Discard => builder.with_ansi(false).with_writer(std::io::sink).try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}
