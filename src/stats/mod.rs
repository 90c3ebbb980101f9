//! Cache statistics
//!
//! Eight counters describe how the cache is doing. They live in small text
//! files under the cache root and are shared by every process using that
//! root, so all read-modify-write sequences run under a cross-process lock.
//!
//! | Ledger | Storage | `commit()` |
//! |--------|---------|------------|
//! | [`DurableStats`] | one file per counter | no-op |
//! | [`TransientStats`] | memory | adds everything to the durable ledger under one lock |

pub mod durable;
pub mod transient;

pub use durable::{lock_file_name, DurableStats, STATS_DIR};
pub use transient::TransientStats;

use crate::error::ClashResult;
use serde::Serialize;
use std::fmt;

/// One of the eight statistics counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Hits,
    Misses,
    Objects,
    Size,
    Unsupported,
    SlowHits,
    TimeLost,
    TimeSaved,
}

impl Counter {
    pub const ALL: [Counter; 8] = [
        Counter::Hits,
        Counter::Misses,
        Counter::Objects,
        Counter::Size,
        Counter::Unsupported,
        Counter::SlowHits,
        Counter::TimeLost,
        Counter::TimeSaved,
    ];

    /// Name of the file backing this counter
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Hits => "hits.txt",
            Self::Misses => "misses.txt",
            Self::Objects => "objects.txt",
            Self::Size => "usage.txt",
            Self::Unsupported => "unsupported.txt",
            Self::SlowHits => "slow_hits.txt",
            Self::TimeLost => "time_wasted.txt",
            Self::TimeSaved => "time_saved.txt",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hits => "cache hits",
            Self::Misses => "cache misses",
            Self::Objects => "cached objects",
            Self::Size => "cache size (bytes)",
            Self::Unsupported => "unsupported calls",
            Self::SlowHits => "slow hits",
            Self::TimeLost => "time lost (ms)",
            Self::TimeSaved => "time saved (ms)",
        };
        write!(f, "{}", label)
    }
}

/// All counters at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub objects: u64,
    pub size: u64,
    pub unsupported: u64,
    pub slow_hits: u64,
    pub time_lost_ms: u64,
    pub time_saved_ms: u64,
}

impl StatsSnapshot {
    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Hits => self.hits,
            Counter::Misses => self.misses,
            Counter::Objects => self.objects,
            Counter::Size => self.size,
            Counter::Unsupported => self.unsupported,
            Counter::SlowHits => self.slow_hits,
            Counter::TimeLost => self.time_lost_ms,
            Counter::TimeSaved => self.time_saved_ms,
        }
    }

    fn set(&mut self, counter: Counter, value: u64) {
        let slot = match counter {
            Counter::Hits => &mut self.hits,
            Counter::Misses => &mut self.misses,
            Counter::Objects => &mut self.objects,
            Counter::Size => &mut self.size,
            Counter::Unsupported => &mut self.unsupported,
            Counter::SlowHits => &mut self.slow_hits,
            Counter::TimeLost => &mut self.time_lost_ms,
            Counter::TimeSaved => &mut self.time_saved_ms,
        };
        *slot = value;
    }
}

/// Interface shared by the durable and transient ledgers
pub trait StatsLedger {
    fn get(&self, counter: Counter) -> u64;

    fn set(&mut self, counter: Counter, value: u64);

    /// Add `delta` to a counter. Not atomic on its own: wrap in [`Self::with_lock`].
    fn add(&mut self, counter: Counter, delta: u64) {
        let value = self.get(counter).saturating_add(delta);
        self.set(counter, value);
    }

    /// Run `action` while holding the ledger's cross-process lock.
    fn with_lock<R, F>(&mut self, action: F) -> ClashResult<R>
    where
        F: FnOnce(&mut Self) -> R,
        Self: Sized;

    /// Push pending changes to durable storage.
    fn commit(&mut self) -> ClashResult<()>;

    fn omit_locks(&self) -> bool;

    /// Skip cross-process locking. Only safe with a single writer.
    fn set_omit_locks(&mut self, omit: bool);

    fn snapshot(&self) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot::default();
        for counter in Counter::ALL {
            snapshot.set(counter, self.get(counter));
        }
        snapshot
    }
}
