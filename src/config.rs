use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::{AppError, Result};
use crate::pagination::{clamp_page_size, PageSizeOptions, DEFAULT_PAGE_SIZE};
use crate::range::DEFAULT_DELTA;
use crate::submit::DEFAULT_SUCCESS_TTL;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            token_env: "POSDESK_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub range_delta: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PageSizeOptions::default().as_slice().to_vec(),
            range_delta: DEFAULT_DELTA,
        }
    }
}

impl ListConfig {
    /// Configured page size, kept within what the server will serve.
    pub fn page_size(&self) -> usize {
        let size = clamp_page_size(self.page_size);
        if size != self.page_size {
            warn!(requested = self.page_size, used = size, "page size out of range");
        }
        size
    }

    pub fn page_size_options(&self) -> PageSizeOptions {
        PageSizeOptions::new(self.page_size_options.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub success_ttl_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            success_ttl_ms: DEFAULT_SUCCESS_TTL.as_millis() as u64,
        }
    }
}

impl FormConfig {
    pub fn success_ttl(&self) -> Duration {
        Duration::from_millis(self.success_ttl_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub lists: ListConfig,
    pub forms: FormConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("posdesk").join("config.toml"))
}

impl Config {
    /// Load from the default location. A missing or broken file yields the
    /// defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            }
        }
    }

    /// Load from a path the user named explicitly. Unlike [`Config::load`]
    /// this fails loudly.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn token(&self) -> Option<String> {
        std::env::var(&self.api.token_env)
            .ok()
            .filter(|t| !t.is_empty())
    }
}
