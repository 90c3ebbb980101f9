//! Configuration schema for clshim
//!
//! Configuration is stored at `~/.config/clshim/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache and statistics settings
    pub cache: CacheConfig,

    /// Real compiler settings
    pub compiler: CompilerConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root; `CLSHIM_DIR` takes precedence
    pub dir: Option<PathBuf>,

    /// Skip the cross-process statistics lock
    pub omit_locks: bool,
}

/// Real compiler configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Path to the real cl.exe; `CLSHIM_CL` takes precedence
    pub path: Option<PathBuf>,

    /// Restore the casing of Windows environment variables under cygwin
    pub cygwin_fix: bool,
}
