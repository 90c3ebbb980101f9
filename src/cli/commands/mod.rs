//! CLI command implementations

pub mod compile;
pub mod config;
pub mod explain;
pub mod locate;
pub mod stats;

pub use compile::execute as compile;
pub use config::execute as config;
pub use explain::execute as explain;
pub use locate::execute as locate;
pub use stats::execute as stats;

use crate::args::{InterpretContext, Interpreter};
use crate::compiler::locate_compiler;
use crate::config::{Config, ConfigManager};
use crate::error::{ClashError, ClashResult};
use crate::platform::{self, EnvMap};
use std::path::PathBuf;

/// Everything a command needs to know about the process it runs in
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub env: EnvMap,
    pub working_dir: PathBuf,
    pub self_exe: Option<PathBuf>,
}

impl CommandContext {
    /// Capture the current process environment.
    pub fn detect(config: Config) -> ClashResult<Self> {
        let env = platform::fixup_environment(platform::environment(), config.compiler.cygwin_fix);
        let working_dir = std::env::current_dir()
            .map_err(|e| ClashError::io("getting current directory", e))?;
        Ok(Self {
            config,
            env,
            working_dir,
            self_exe: std::env::current_exe().ok(),
        })
    }

    pub fn cache_root(&self) -> PathBuf {
        ConfigManager::cache_root(&self.config, &self.env)
    }

    pub fn locate_compiler(&self) -> ClashResult<PathBuf> {
        locate_compiler(
            &self.env,
            self.config.compiler.path.as_deref(),
            self.self_exe.as_deref(),
        )
    }

    pub(crate) fn interpreter(&self, compiler_exe: PathBuf) -> Interpreter {
        Interpreter::new(InterpretContext {
            working_dir: self.working_dir.clone(),
            compiler_exe,
        })
    }
}
