//! Error types for clshim
//!
//! All fallible operations return `ClashResult<T>`. Note that an uncacheable
//! command line is not an error: see [`crate::args::Verdict`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for clshim operations
pub type ClashResult<T> = Result<T, ClashError>;

/// All errors that can occur in clshim
#[derive(Error, Debug)]
pub enum ClashError {
    // Compiler errors
    #[error("Real compiler not found: {0}")]
    CompilerNotFound(PathBuf),

    #[error("Could not locate the real compiler (searched {searched})")]
    CompilerUnresolved { searched: String },

    // Argument errors
    #[error("Failed to read response file {path}: {source}")]
    ResponseFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Statistics errors
    #[error("Failed to acquire statistics lock {path}: {source}")]
    StatsLock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ClashError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CompilerNotFound(_) | Self::CompilerUnresolved { .. } => {
                Some("Set CLSHIM_CL to the full path of cl.exe, or put cl_real.exe next to clshim")
            }
            Self::StatsLock { .. } => Some("Set cache.omit_locks = true if only one process uses this cache"),
            _ => None,
        }
    }
}
