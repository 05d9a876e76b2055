//! Tracing setup: append to `$XDG_STATE_HOME/tilefind/tilefind.log`, or
//! fall back to stderr when the state dir is unusable.
//!
//! `RUST_LOG` overrides the default filters.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "tilefind.log";

/// Filter for the log file.
const FILE_FILTER: &str = "info,tilefind=debug,tilefind_core=debug";

/// Filter for the stderr fallback; stderr is shared with CLI output.
const STDERR_FILTER: &str = "warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Location of the log file; creates the state dir if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tilefind")?;
    xdg_dirs
        .place_state_file(LOG_FILE_NAME)
        .context("cannot create tilefind state directory")
}

/// Opens `path` for appending, creating parent directories.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

/// Installs the global subscriber writing to the log file. Returns the file
/// path. On error nothing is installed, so the caller can fall back to
/// [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(FILE_FILTER))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install log subscriber: {}", e))?;

    tracing::info!(path = %path.display(), "tilefind logging initialized");
    Ok(path)
}

/// Installs a stderr subscriber (warnings and errors unless `RUST_LOG` says
/// otherwise). A no-op if a subscriber is already set.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(STDERR_FILTER))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
