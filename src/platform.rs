//! Platform capabilities used by the compiler front end
//!
//! The environment is read once at startup, repaired if needed, and then
//! passed around explicitly as an [`EnvMap`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Snapshot of process environment variables
pub type EnvMap = BTreeMap<String, String>;

/// Forces the cygwin fixup even when `OSTYPE` says otherwise
pub const CYGWIN_FIX_VAR: &str = "CLSHIM_CYGWIN_FIX";

/// Read the current process environment.
///
/// Names and values that are not valid unicode are converted lossily.
pub fn environment() -> EnvMap {
    std::env::vars_os()
        .map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// Look up a variable, falling back to a case-insensitive match since
/// Windows treats `Path` and `PATH` as the same variable.
pub fn lookup<'a>(env: &'a EnvMap, name: &str) -> Option<&'a str> {
    env.get(name)
        .or_else(|| {
            env.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}

/// Upper-case variable names under cygwin.
///
/// Cygwin shells export `Path`, `Include` and friends with mixed case, which
/// `cl.exe` does not pick up. When `OSTYPE` is `cygwin` (or `force` is set, or
/// [`CYGWIN_FIX_VAR`] is present) every name containing a lowercase letter is
/// replaced by its upper-case form. Otherwise the map is returned unchanged.
pub fn fixup_environment(env: EnvMap, force: bool) -> EnvMap {
    let cygwin = force
        || env.contains_key(CYGWIN_FIX_VAR)
        || env.get("OSTYPE").is_some_and(|os| os == "cygwin");
    if !cygwin {
        return env;
    }

    debug!("repairing cygwin environment variable casing");
    env.into_iter()
        .map(|(name, value)| {
            if name.chars().any(char::is_lowercase) {
                debug!("cwfix {}={}", name, value);
                (name.to_uppercase(), value)
            } else {
                (name, value)
            }
        })
        .collect()
}

/// Create `target` as a hard link to `source`.
///
/// Returns false if `target` already exists or the link could not be made.
pub fn create_hard_link(target: &Path, source: &Path) -> bool {
    if target.exists() {
        return false;
    }
    match fs::hard_link(source, target) {
        Ok(()) => true,
        Err(e) => {
            debug!(
                "hard link {} -> {} failed: {}",
                target.display(),
                source.display(),
                e
            );
            false
        }
    }
}
