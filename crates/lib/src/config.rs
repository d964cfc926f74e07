//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.textfn/config.json`) and environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{PlaygroundClient, DEFAULT_BASE_URL};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Playground server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Inference log browsing defaults.
    #[serde(default)]
    pub logs: LogsConfig,
}

/// Where the playground server lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Base URL (default "http://127.0.0.1:6767"). Overridden by TEXTFN_BASE_URL env.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds (default 120; model calls can be slow).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Inference log paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsConfig {
    /// Page shown first (1-based).
    #[serde(default = "default_log_page")]
    pub page: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_log_page() -> u32 {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            page: default_log_page(),
        }
    }
}

/// Resolve the server base URL: env TEXTFN_BASE_URL overrides config. Trailing `/` is dropped.
pub fn resolve_base_url(config: &Config) -> String {
    let from_env = std::env::var("TEXTFN_BASE_URL").ok();
    pick_base_url(from_env.as_deref(), &config.server.base_url)
}

fn pick_base_url(from_env: Option<&str>, configured: &str) -> String {
    from_env
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(configured.trim()).filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Build a client from config, with an optional explicit base URL taking precedence.
pub fn client_from_config(config: &Config, base_url: Option<String>) -> Result<PlaygroundClient> {
    let base_url = base_url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| resolve_base_url(config));
    let timeout = Duration::from_secs(config.server.timeout_secs.max(1));
    log::debug!("using playground server {}", base_url);
    PlaygroundClient::with_timeout(Some(base_url), timeout).context("building http client")
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("TEXTFN_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".textfn").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or TEXTFN_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
