//! Cache entries and the path-keyed store
//!
//! `CacheStore` is a concurrency-safe map from the exact request path to a
//! `CacheEntry`. Readers proceed concurrently; a write locks the map only for
//! the duration of the insert. Entries are published behind an `Arc`, so a
//! reader can never observe a half-constructed entry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::invalidation::now_millis;

/// Cached state of one request path
///
/// A negative entry (`exists == false`) records "this path does not exist"
/// and carries no revision, body, or content type.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Whether the path resolves to a regular file at the remote store
    pub exists: bool,
    /// Opaque revision token, served as the ETag; empty for negative entries
    pub rev: String,
    /// Remote-reported last modification time
    pub modified: DateTime<Utc>,
    /// Corrected MIME type; empty for negative entries
    pub content_type: String,
    /// Full cached body; empty for negative entries
    pub body: Bytes,
    /// Local wall-clock time the entry was populated, unix milliseconds.
    /// Set once at construction; staleness replaces the whole entry.
    pub fetched_at: u64,
}

impl CacheEntry {
    /// Build a positive entry for an existing file
    pub fn positive(rev: String, modified: DateTime<Utc>, content_type: String, body: Bytes) -> Self {
        Self {
            exists: true,
            rev,
            modified,
            content_type,
            body,
            fetched_at: now_millis(),
        }
    }

    /// Build a negative entry caching a not-found result
    pub fn negative() -> Self {
        Self {
            exists: false,
            rev: String::new(),
            modified: DateTime::UNIX_EPOCH,
            content_type: String::new(),
            body: Bytes::new(),
            fetched_at: now_millis(),
        }
    }
}

/// Path-keyed entry store, no eviction
pub struct CacheStore {
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the entry for a request path
    pub fn get(&self, path: &str) -> Option<Arc<CacheEntry>> {
        self.entries.read().unwrap().get(path).cloned()
    }

    /// Publish an entry for a request path, replacing any previous one.
    ///
    /// Returns the published entry so callers can serve exactly what was
    /// stored.
    pub fn insert(&self, path: &str, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        self.entries
            .write()
            .unwrap()
            .insert(path.to_string(), Arc::clone(&entry));
        debug!(path = path, exists = entry.exists, "Cache entry stored");
        entry
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether anything has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_miss_then_hit() {
        let store = CacheStore::new();
        assert!(store.is_empty());
        assert!(store.get("/a.txt").is_none());

        store.insert(
            "/a.txt",
            CacheEntry::positive(
                "rev1".to_string(),
                Utc::now(),
                "text/plain".to_string(),
                Bytes::from_static(b"hello"),
            ),
        );

        let entry = store.get("/a.txt").expect("entry should be present");
        assert!(entry.exists);
        assert_eq!(entry.rev, "rev1");
        assert_eq!(&entry.body[..], b"hello");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let store = CacheStore::new();
        store.insert(
            "/a.txt",
            CacheEntry::positive(
                "rev1".to_string(),
                Utc::now(),
                "text/plain".to_string(),
                Bytes::from_static(b"old"),
            ),
        );
        store.insert(
            "/a.txt",
            CacheEntry::positive(
                "rev2".to_string(),
                Utc::now(),
                "text/plain".to_string(),
                Bytes::from_static(b"new"),
            ),
        );

        let entry = store.get("/a.txt").unwrap();
        assert_eq!(entry.rev, "rev2");
        assert_eq!(&entry.body[..], b"new");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_are_exact() {
        let store = CacheStore::new();
        store.insert("/a.txt", CacheEntry::negative());
        assert!(store.get("/a.txt/").is_none());
        assert!(store.get("/A.txt").is_none());
    }

    #[test]
    fn test_negative_entry_carries_nothing() {
        let entry = CacheEntry::negative();
        assert!(!entry.exists);
        assert!(entry.rev.is_empty());
        assert!(entry.content_type.is_empty());
        assert!(entry.body.is_empty());
    }
}
