use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::output::Format;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_lang: Option<String>,
    pub default_format: Option<Format>,
    pub timeout_secs: Option<u64>,
    pub rate_limit_max: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
    pub max_batch: Option<usize>,
    pub max_playlist: Option<usize>,
    pub max_comments: Option<usize>,
}

impl Config {
    /// Load config from ~/.config/tubescript/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Built-in limits overridden by whatever the file sets
    pub fn limits(&self) -> Limits {
        let defaults = Limits::default();
        Limits {
            timeout: self.timeout_secs.map_or(defaults.timeout, Duration::from_secs),
            rate_limit_max: self.rate_limit_max.unwrap_or(defaults.rate_limit_max),
            rate_limit_window: self
                .rate_limit_window_secs
                .map_or(defaults.rate_limit_window, Duration::from_secs),
            max_batch: self.max_batch.unwrap_or(defaults.max_batch),
            max_playlist: self.max_playlist.unwrap_or(defaults.max_playlist),
            max_comments: self.max_comments.unwrap_or(defaults.max_comments),
            ..defaults
        }
    }
}

/// Bounds enforced on every request before any network call
#[derive(Debug, Clone)]
pub struct Limits {
    pub timeout: Duration,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    pub max_batch: usize,
    pub max_playlist: usize,
    pub max_comments: usize,
    pub max_url_len: usize,
    pub max_query_len: usize,
    pub max_context_lines: usize,
    pub max_lang_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            rate_limit_max: 10,
            rate_limit_window: Duration::from_secs(60),
            max_batch: 10,
            max_playlist: 25,
            max_comments: 100,
            max_url_len: 2048,
            max_query_len: 200,
            max_context_lines: 10,
            max_lang_len: 16,
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("tubescript")
        .join("config.toml")
}
