//! Locating the real compiler
//!
//! Search order:
//!
//! 1. `CLSHIM_CL`, when it names an existing file
//! 2. the configured `compiler.path`
//! 3. `cl_real` next to the running executable
//! 4. the first `cl` on `PATH` that is not the running executable

use crate::error::{ClashError, ClashResult};
use crate::platform::{lookup, EnvMap};
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the real compiler
pub const COMPILER_OVERRIDE_VAR: &str = "CLSHIM_CL";

/// File name of the compiler on `PATH`
pub fn compiler_file_name() -> String {
    format!("cl{}", EXE_SUFFIX)
}

/// File name of the renamed compiler kept next to clshim
pub fn fallback_file_name() -> String {
    format!("cl_real{}", EXE_SUFFIX)
}

/// Find the real compiler.
///
/// `self_exe` is the running executable; it is skipped on `PATH` so that a
/// clshim installed as `cl.exe` does not call itself.
pub fn locate_compiler(
    env: &EnvMap,
    configured: Option<&Path>,
    self_exe: Option<&Path>,
) -> ClashResult<PathBuf> {
    let mut searched = Vec::new();

    if let Some(path) = lookup(env, COMPILER_OVERRIDE_VAR) {
        let path = PathBuf::from(path);
        if path.is_file() {
            debug!("real compiler from {}: {}", COMPILER_OVERRIDE_VAR, path.display());
            return Ok(path);
        }
        searched.push(COMPILER_OVERRIDE_VAR.to_string());
    }

    if let Some(path) = configured {
        if path.is_file() {
            debug!("real compiler from config: {}", path.display());
            return Ok(path.to_path_buf());
        }
        searched.push(format!("config ({})", path.display()));
    }

    if let Some(dir) = self_exe.and_then(Path::parent) {
        let sibling = dir.join(fallback_file_name());
        if sibling.is_file() {
            debug!("real compiler next to self: {}", sibling.display());
            return Ok(sibling);
        }
        searched.push(sibling.display().to_string());
    }

    if let Some(path_var) = lookup(env, "PATH") {
        for dir in std::env::split_paths(path_var) {
            let candidate = dir.join(compiler_file_name());
            if !candidate.is_file() {
                continue;
            }
            if self_exe.is_some_and(|me| same_file(me, &candidate)) {
                debug!("skipping self on PATH: {}", candidate.display());
                continue;
            }
            debug!("real compiler on PATH: {}", candidate.display());
            return Ok(candidate);
        }
        searched.push("PATH".to_string());
    }

    Err(ClashError::CompilerUnresolved {
        searched: searched.join(", "),
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a
            .to_string_lossy()
            .eq_ignore_ascii_case(&b.to_string_lossy()),
    }
}
