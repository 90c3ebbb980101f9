//! In-memory statistics accumulated during one invocation

use super::{Counter, DurableStats, StatsLedger};
use crate::error::ClashResult;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Counters held in memory until [`StatsLedger::commit`] adds them to the
/// durable ledger of the same cache root.
#[derive(Debug)]
pub struct TransientStats {
    root: PathBuf,
    counters: [u64; 8],
    omit_locks: bool,
}

impl TransientStats {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            root: cache_root.into(),
            counters: [0; 8],
            omit_locks: false,
        }
    }

    /// True when there are uncommitted changes
    pub fn is_dirty(&self) -> bool {
        self.counters.iter().any(|&v| v != 0)
    }
}

impl StatsLedger for TransientStats {
    fn get(&self, counter: Counter) -> u64 {
        self.counters[counter.index()]
    }

    fn set(&mut self, counter: Counter, value: u64) {
        self.counters[counter.index()] = value;
    }

    fn with_lock<R, F>(&mut self, action: F) -> ClashResult<R>
    where
        F: FnOnce(&mut Self) -> R,
    {
        Ok(action(self))
    }

    fn commit(&mut self) -> ClashResult<()> {
        if !self.is_dirty() {
            return Ok(());
        }

        let pending = self.counters;
        let mut durable = DurableStats::new(&self.root);
        durable.set_omit_locks(self.omit_locks);
        durable.with_lock(|stats| {
            for counter in Counter::ALL {
                let delta = pending[counter.index()];
                if delta > 0 {
                    stats.add(counter, delta);
                }
            }
        })?;

        self.counters = [0; 8];
        debug!("committed statistics to {}", self.root.display());
        Ok(())
    }

    fn omit_locks(&self) -> bool {
        self.omit_locks
    }

    fn set_omit_locks(&mut self, omit: bool) {
        self.omit_locks = omit;
    }
}

impl Drop for TransientStats {
    fn drop(&mut self) {
        if self.is_dirty() {
            warn!(
                "discarding uncommitted statistics for {}",
                self.root.display()
            );
        }
    }
}
