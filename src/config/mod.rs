//! Configuration management for clshim

pub mod schema;

pub use schema::Config;

use crate::error::{ClashError, ClashResult};
use crate::platform::{lookup, EnvMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Environment variable overriding the cache root
pub const CACHE_DIR_VAR: &str = "CLSHIM_DIR";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clshim")
            .join("config.toml")
    }

    /// Default cache root when neither `CLSHIM_DIR` nor `cache.dir` is set
    pub fn default_cache_root() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clshim")
    }

    /// Resolve the cache root: `CLSHIM_DIR`, then `cache.dir`, then the default
    pub fn cache_root(config: &Config, env: &EnvMap) -> PathBuf {
        if let Some(dir) = lookup(env, CACHE_DIR_VAR).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        config
            .cache
            .dir
            .clone()
            .unwrap_or_else(Self::default_cache_root)
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> ClashResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> ClashResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ClashError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| ClashError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> ClashResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            ClashError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    async fn ensure_config_dir(&self) -> ClashResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ClashError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
