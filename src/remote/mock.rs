//! In-memory RemoteStore for tests
//!
//! Tracks per-operation call counts so tests can assert which remote calls a
//! request actually triggered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};

use super::{Download, Entry, FileMeta, LongpollOutcome, RemoteError, RemoteStore};

enum MockEntry {
    File(MockFile),
    Folder,
}

struct MockFile {
    rev: String,
    content_type: Option<String>,
    body: Bytes,
}

/// Scriptable remote store with call counters
pub struct MockStore {
    entries: Mutex<HashMap<String, MockEntry>>,
    longpoll_changed: AtomicBool,
    fail_metadata: AtomicBool,
    fail_cursor: AtomicBool,
    pub metadata_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub cursor_calls: AtomicUsize,
    pub longpoll_calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            longpoll_changed: AtomicBool::new(false),
            fail_metadata: AtomicBool::new(false),
            fail_cursor: AtomicBool::new(false),
            metadata_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            cursor_calls: AtomicUsize::new(0),
            longpoll_calls: AtomicUsize::new(0),
        }
    }

    /// Add or replace a file at the given remote path
    pub fn put_file(&self, path: &str, rev: &str, content_type: Option<&str>, body: &[u8]) {
        self.entries.lock().unwrap().insert(
            path.to_string(),
            MockEntry::File(MockFile {
                rev: rev.to_string(),
                content_type: content_type.map(String::from),
                body: Bytes::copy_from_slice(body),
            }),
        );
    }

    /// Add a folder marker at the given remote path
    pub fn put_folder(&self, path: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(path.to_string(), MockEntry::Folder);
    }

    /// Delete whatever sits at the given remote path
    pub fn remove(&self, path: &str) {
        self.entries.lock().unwrap().remove(path);
    }

    /// Make subsequent metadata calls fail with a server error
    pub fn fail_metadata(&self, fail: bool) {
        self.fail_metadata.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent cursor calls fail with a server error
    pub fn fail_cursor(&self, fail: bool) {
        self.fail_cursor.store(fail, Ordering::SeqCst);
    }

    /// Control what long-poll waits report
    pub fn set_longpoll_changed(&self, changed: bool) {
        self.longpoll_changed.store(changed, Ordering::SeqCst);
    }

    fn meta_for(file: &MockFile) -> FileMeta {
        FileMeta {
            rev: file.rev.clone(),
            server_modified: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            size: file.body.len() as u64,
        }
    }
}

#[async_trait]
impl RemoteStore for MockStore {
    async fn get_metadata(&self, path: &str) -> Result<Entry, RemoteError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(RemoteError::Server(503, "mock outage".to_string()));
        }
        match self.entries.lock().unwrap().get(path) {
            Some(MockEntry::File(file)) => Ok(Entry::File(Self::meta_for(file))),
            Some(MockEntry::Folder) => Ok(Entry::Folder),
            None => Err(RemoteError::NotFound),
        }
    }

    async fn download(&self, path: &str) -> Result<Download, RemoteError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        match self.entries.lock().unwrap().get(path) {
            Some(MockEntry::File(file)) => Ok(Download {
                meta: Self::meta_for(file),
                content_type: file.content_type.clone(),
                body: file.body.clone(),
            }),
            _ => Err(RemoteError::NotFound),
        }
    }

    async fn latest_cursor(&self, _folder: &str) -> Result<String, RemoteError> {
        self.cursor_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_cursor.load(Ordering::SeqCst) {
            return Err(RemoteError::Server(503, "mock outage".to_string()));
        }
        Ok("cursor-1".to_string())
    }

    async fn longpoll(&self, _cursor: &str, _timeout_secs: u64) -> Result<LongpollOutcome, RemoteError> {
        self.longpoll_calls.fetch_add(1, Ordering::SeqCst);
        Ok(LongpollOutcome {
            changed: self.longpoll_changed.load(Ordering::SeqCst),
            backoff: None,
        })
    }
}
