//! In-memory caching layer
//!
//! Maps request paths to immutable cache entries for the process lifetime and
//! tracks the folder-wide invalidation timestamp. Entries are never evicted;
//! staleness is decided by comparing an entry's fetch time against the
//! invalidation signal, and a stale entry is replaced, never mutated.

pub mod invalidation;
pub mod store;

pub use invalidation::InvalidationSignal;
pub use store::{CacheEntry, CacheStore};
