//! Folder-wide invalidation signal
//!
//! A single timestamp marking the most recent detected remote change. The
//! watch loop is the only writer; every request compares its cached entry's
//! fetch time against it. The signal only controls how often entries are
//! re-validated against the remote store; what gets served is decided by the
//! per-path revision comparison in the fetcher.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Current wall-clock time in unix milliseconds
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Monotonically non-decreasing "last invalidated" timestamp
pub struct InvalidationSignal {
    last: AtomicU64,
}

impl InvalidationSignal {
    /// Create a signal marked as of process start
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(now_millis()),
        }
    }

    /// Record that a remote change was detected now. Watch loop only.
    pub fn bump(&self) {
        self.last.fetch_max(now_millis(), Ordering::SeqCst);
    }

    /// Whether an entry fetched at the given time is still fresh.
    ///
    /// An entry fetched in the same millisecond as an invalidation counts as
    /// fresh.
    pub fn is_fresh(&self, fetched_at: u64) -> bool {
        fetched_at >= self.last.load(Ordering::SeqCst)
    }

    /// The most recent invalidation timestamp, unix milliseconds
    pub fn last_invalidated_at(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

impl Default for InvalidationSignal {
    fn default() -> Self {
        Self::new()
    }
}
