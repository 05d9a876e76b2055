use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::{DEFAULT_ENDPOINT, DEFAULT_MAX_ITEMS, DEFAULT_PARENT_ID};
use crate::retry::RetryPolicy;

/// Catalog query settings (`[catalog]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Item search endpoint.
    pub endpoint: String,
    /// Parent collection the search is scoped to.
    pub parent_id: String,
    /// Maximum number of items requested per query.
    pub max_items: u32,
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for the catalog query.
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            parent_id: DEFAULT_PARENT_ID.to_string(),
            max_items: DEFAULT_MAX_ITEMS,
            connect_timeout_secs: 15,
            timeout_secs: 60,
        }
    }
}

/// Backoff between download attempts (optional `[download.retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Base delay in seconds for exponential backoff (0 = retry immediately).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_secs: 1.0,
            max_delay_secs: 8,
        }
    }
}

/// Tile download settings (`[download]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Attempts per file, including the first.
    pub max_attempts: u32,
    /// Progress/write chunk size in bytes.
    pub chunk_bytes: usize,
    pub connect_timeout_secs: u64,
    /// Abort an attempt when no body bytes arrive for this long.
    pub read_timeout_secs: u64,
    /// Optional backoff; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            chunk_bytes: 1024 * 1024,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
            retry: None,
        }
    }
}

impl DownloadConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry.clone().unwrap_or_default();
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(retry.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(retry.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/tilefind/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TilefindConfig {
    pub catalog: CatalogConfig,
    pub download: DownloadConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tilefind")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TilefindConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TilefindConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: TilefindConfig = toml::from_str(&data)?;
    Ok(cfg)
}
