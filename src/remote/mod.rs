//! Remote store abstraction
//!
//! The `RemoteStore` trait is the seam between the caching layer and the
//! actual cloud storage API. Request handling and the watch loop only ever
//! talk to this trait; the Dropbox implementation lives in `crate::dropbox`.

pub mod errors;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use errors::RemoteError;

/// Metadata for a regular file at the remote store
#[derive(Debug, Clone)]
pub struct FileMeta {
    /// Opaque revision token, doubles as the HTTP ETag
    pub rev: String,
    /// Remote-reported last modification time
    pub server_modified: DateTime<Utc>,
    /// File size in bytes
    pub size: u64,
}

/// What a path resolves to at the remote store
#[derive(Debug, Clone)]
pub enum Entry {
    File(FileMeta),
    Folder,
    Deleted,
}

/// A downloaded file: fresh metadata plus the full body
#[derive(Debug)]
pub struct Download {
    pub meta: FileMeta,
    /// Content type as reported by the download transport, if any
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Result of a long-poll wait on the monitored folder
#[derive(Debug, Clone)]
pub struct LongpollOutcome {
    /// Whether the remote store reported a change before the timeout
    pub changed: bool,
    /// Server-mandated pause before polling again, in seconds
    pub backoff: Option<u64>,
}

/// Read-only view of the cloud storage account
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Resolve a path to file metadata, a folder, or a deletion marker
    async fn get_metadata(&self, path: &str) -> Result<Entry, RemoteError>;

    /// Download the full body of a file
    async fn download(&self, path: &str) -> Result<Download, RemoteError>;

    /// Get the current change cursor for a folder (recursive)
    async fn latest_cursor(&self, folder: &str) -> Result<String, RemoteError>;

    /// Block until the folder behind `cursor` changes or `timeout_secs` elapses
    async fn longpoll(&self, cursor: &str, timeout_secs: u64) -> Result<LongpollOutcome, RemoteError>;
}
