//! File-backed statistics
//!
//! Each counter is a decimal number in its own file under
//! `<cache root>/stats/`. Reads never fail: a missing or garbled file counts
//! as zero. Writes that fail are logged and dropped.

use super::{Counter, StatsLedger};
use crate::error::{ClashError, ClashResult};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Subdirectory of the cache root holding the counter files
pub const STATS_DIR: &str = "stats";

/// Name of the lock file shared by every process using `cache_root`.
///
/// Derived from the lower-cased root path so that differently cased
/// spellings of the same Windows directory share one lock.
pub fn lock_file_name(cache_root: &Path) -> String {
    let key = cache_root.to_string_lossy().to_lowercase();
    let digest = Sha256::digest(key.as_bytes());
    format!("clshim-stats-{}.lock", hex::encode(&digest[..8]))
}

/// Statistics stored directly on disk
#[derive(Debug)]
pub struct DurableStats {
    dir: PathBuf,
    lock_path: PathBuf,
    omit_locks: bool,
    lock_depth: Arc<AtomicUsize>,
}

/// A held statistics lock. Dropping it, also while unwinding, leaves the
/// nesting level and releases the file lock.
struct HeldLock {
    file: File,
    depth: Arc<AtomicUsize>,
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
        if let Err(e) = self.file.unlock() {
            debug!("explicit unlock failed, relying on close: {}", e);
        }
    }
}

impl DurableStats {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        let root = cache_root.into();
        Self {
            dir: root.join(STATS_DIR),
            lock_path: std::env::temp_dir().join(lock_file_name(&root)),
            omit_locks: false,
            lock_depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn counter_path(&self, counter: Counter) -> PathBuf {
        self.dir.join(counter.file_name())
    }

    /// Zero every counter.
    pub fn reset(&mut self) -> ClashResult<()> {
        self.with_lock(|stats| {
            for counter in Counter::ALL {
                stats.set(counter, 0);
            }
        })
    }
}

impl StatsLedger for DurableStats {
    fn get(&self, counter: Counter) -> u64 {
        fs::read_to_string(self.counter_path(counter))
            .ok()
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0)
    }

    fn set(&mut self, counter: Counter, value: u64) {
        let path = self.counter_path(counter);
        let result = fs::create_dir_all(&self.dir).and_then(|()| fs::write(&path, value.to_string()));
        if let Err(e) = result {
            warn!("failed to write statistic {}: {}", path.display(), e);
        }
    }

    fn with_lock<R, F>(&mut self, action: F) -> ClashResult<R>
    where
        F: FnOnce(&mut Self) -> R,
    {
        if self.omit_locks || self.lock_depth.load(Ordering::SeqCst) > 0 {
            return Ok(action(self));
        }

        let lock_error = |source| ClashError::StatsLock {
            path: self.lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(lock_error)?;
        file.lock().map_err(lock_error)?;
        debug!("acquired statistics lock {}", self.lock_path.display());

        self.lock_depth.fetch_add(1, Ordering::SeqCst);
        let _held = HeldLock {
            file,
            depth: Arc::clone(&self.lock_depth),
        };
        Ok(action(self))
    }

    fn commit(&mut self) -> ClashResult<()> {
        Ok(())
    }

    fn omit_locks(&self) -> bool {
        self.omit_locks
    }

    fn set_omit_locks(&mut self, omit: bool) {
        self.omit_locks = omit;
    }
}
