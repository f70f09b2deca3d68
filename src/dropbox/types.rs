//! Dropbox API wire types
//!
//! Request and response bodies for the Dropbox HTTP RPC API v2. Dropbox uses
//! snake_case field names and tags metadata unions with a `.tag` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::remote::{Entry, FileMeta};

/// Metadata union returned by `files/get_metadata`
///
/// Folder and deleted entries carry fields of their own on the wire, but the
/// server treats both exactly like a missing path, so only the tag matters.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum MetadataEntry {
    File(FileMetadata),
    Folder,
    Deleted,
}

/// File metadata from the Dropbox API
///
/// Also carried in the `Dropbox-API-Result` response header of downloads.
#[derive(Debug, Clone, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    /// Opaque per-file revision token
    pub rev: String,
    /// Last time the file content changed on Dropbox servers (RFC 3339)
    pub server_modified: DateTime<Utc>,
    pub size: u64,
}

impl From<FileMetadata> for FileMeta {
    fn from(meta: FileMetadata) -> Self {
        FileMeta {
            rev: meta.rev,
            server_modified: meta.server_modified,
            size: meta.size,
        }
    }
}

impl From<MetadataEntry> for Entry {
    fn from(entry: MetadataEntry) -> Self {
        match entry {
            MetadataEntry::File(meta) => Entry::File(meta.into()),
            MetadataEntry::Folder => Entry::Folder,
            MetadataEntry::Deleted => Entry::Deleted,
        }
    }
}

/// Argument for path-keyed RPC calls (`get_metadata`, `download`)
#[derive(Debug, Serialize)]
pub struct PathArg {
    pub path: String,
}

/// Argument for `files/list_folder/get_latest_cursor`
#[derive(Debug, Serialize)]
pub struct LatestCursorArg {
    pub path: String,
    pub recursive: bool,
}

/// Response from `files/list_folder/get_latest_cursor`
#[derive(Debug, Deserialize)]
pub struct LatestCursorResponse {
    pub cursor: String,
}

/// Argument for `files/list_folder/longpoll`
#[derive(Debug, Serialize)]
pub struct LongpollArg {
    pub cursor: String,
    /// Seconds to wait for a change before the server responds, max 480
    pub timeout: u64,
}

/// Response from `files/list_folder/longpoll`
#[derive(Debug, Deserialize)]
pub struct LongpollResponse {
    pub changes: bool,
    /// Seconds the caller must wait before polling again
    #[serde(default)]
    pub backoff: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_file_metadata() {
        let json = r#"{
            ".tag": "file",
            "name": "prime_numbers.txt",
            "id": "id:a4ayc_80_OEAAAAAAAAAXw",
            "client_modified": "2015-05-12T15:50:38Z",
            "server_modified": "2015-05-12T15:50:38Z",
            "rev": "a1c10ce0dd78",
            "size": 7212,
            "path_lower": "/homework/math/prime_numbers.txt",
            "is_downloadable": true,
            "content_hash": "e3b0c44298fc1c149afbf4c8996fb"
        }"#;
        let entry: MetadataEntry = serde_json::from_str(json).unwrap();
        match entry {
            MetadataEntry::File(meta) => {
                assert_eq!(meta.name, "prime_numbers.txt");
                assert_eq!(meta.rev, "a1c10ce0dd78");
                assert_eq!(meta.size, 7212);
                assert_eq!(meta.server_modified.to_rfc3339(), "2015-05-12T15:50:38+00:00");
            }
            other => panic!("expected file metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_folder_metadata() {
        let json = r#"{
            ".tag": "folder",
            "name": "math",
            "id": "id:a4ayc_80_OEAAAAAAAAAXz",
            "path_lower": "/homework/math"
        }"#;
        let entry: MetadataEntry = serde_json::from_str(json).unwrap();
        assert!(matches!(entry, MetadataEntry::Folder));
        assert!(matches!(Entry::from(entry), Entry::Folder));
    }

    #[test]
    fn test_deserialize_deleted_metadata() {
        let json = r#"{
            ".tag": "deleted",
            "name": "old.txt",
            "path_lower": "/old.txt"
        }"#;
        let entry: MetadataEntry = serde_json::from_str(json).unwrap();
        assert!(matches!(Entry::from(entry), Entry::Deleted));
    }

    #[test]
    fn test_deserialize_longpoll_response() {
        let with_backoff: LongpollResponse =
            serde_json::from_str(r#"{"changes": true, "backoff": 60}"#).unwrap();
        assert!(with_backoff.changes);
        assert_eq!(with_backoff.backoff, Some(60));

        let timeout: LongpollResponse = serde_json::from_str(r#"{"changes": false}"#).unwrap();
        assert!(!timeout.changes);
        assert_eq!(timeout.backoff, None);
    }

    #[test]
    fn test_serialize_latest_cursor_arg() {
        let arg = LatestCursorArg {
            path: "/Public".to_string(),
            recursive: true,
        };
        let json = serde_json::to_string(&arg).unwrap();
        assert!(json.contains(r#""path":"/Public""#));
        assert!(json.contains(r#""recursive":true"#));
    }
}
