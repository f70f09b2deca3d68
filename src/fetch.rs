//! Fetch orchestration
//!
//! `Fetcher::resolve` is the path every request takes: cache lookup,
//! staleness check against the invalidation signal, metadata fetch,
//! revision-based body reuse, download, and content-type correction.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStore, InvalidationSignal};
use crate::remote::{Entry, RemoteError, RemoteStore};

/// The generic type Dropbox reports for content it cannot classify
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Resolves request paths to ready-to-serve cache entries
pub struct Fetcher {
    remote: Arc<dyn RemoteStore>,
    store: CacheStore,
    signal: Arc<InvalidationSignal>,
    /// Remote folder prefix request paths are appended to
    folder: String,
}

impl Fetcher {
    pub fn new(remote: Arc<dyn RemoteStore>, signal: Arc<InvalidationSignal>, folder: String) -> Self {
        Self {
            remote,
            store: CacheStore::new(),
            signal,
            folder,
        }
    }

    /// Resolve a request path to a cache entry, consulting the remote store
    /// only when the cached entry is absent or stale.
    ///
    /// Not-found paths and folders are cached as negative entries so missing
    /// paths stay cheap. Transient remote failures propagate without touching
    /// the cache.
    pub async fn resolve(&self, path: &str) -> Result<Arc<CacheEntry>, RemoteError> {
        let previous = self.store.get(path);
        if let Some(entry) = &previous {
            if self.signal.is_fresh(entry.fetched_at) {
                debug!(path = path, "Cache HIT");
                return Ok(Arc::clone(entry));
            }
            debug!(path = path, "Cache entry stale, revalidating");
        }

        let remote_path = format!("{}{}", self.folder, path);
        let meta = match self.remote.get_metadata(&remote_path).await {
            Ok(Entry::File(meta)) => meta,
            // Folders and deletion markers are served exactly like missing paths
            Ok(Entry::Folder) | Ok(Entry::Deleted) | Err(RemoteError::NotFound) => {
                debug!(path = path, "Caching not-found");
                return Ok(self.store.insert(path, CacheEntry::negative()));
            }
            Err(err) => return Err(err),
        };

        // Same revision as before: the folder-wide signal fired for some
        // unrelated path, so reuse the body we already have.
        if let Some(prev) = previous.filter(|p| p.exists && p.rev == meta.rev) {
            debug!(path = path, rev = %meta.rev, "Revision unchanged, reusing cached body");
            let entry = CacheEntry::positive(
                meta.rev,
                meta.server_modified,
                prev.content_type.clone(),
                prev.body.clone(),
            );
            return Ok(self.store.insert(path, entry));
        }

        let download = self.remote.download(&remote_path).await?;
        let content_type = corrected_content_type(path, download.content_type.as_deref());
        debug!(
            path = path,
            rev = %download.meta.rev,
            size = download.meta.size,
            content_type = %content_type,
            "Fetched body from remote store"
        );

        let entry = CacheEntry::positive(
            download.meta.rev,
            download.meta.server_modified,
            content_type,
            download.body,
        );
        Ok(self.store.insert(path, entry))
    }
}

/// Correct the remote-reported MIME type.
///
/// Dropbox hands out `application/octet-stream` for anything it cannot
/// classify (notably `.json` and `.html`). When we get the fallback, derive a
/// type from the path's extension instead; keep the fallback if the extension
/// is unknown too.
fn corrected_content_type(path: &str, reported: Option<&str>) -> String {
    let reported = reported.unwrap_or(FALLBACK_CONTENT_TYPE);
    if reported != FALLBACK_CONTENT_TYPE {
        return reported.to_string();
    }
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
