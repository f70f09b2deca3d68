//! Dropbox API client
//!
//! Implements `RemoteStore` over the Dropbox HTTP RPC API v2 using a bearer
//! access token. Path-level failures come back as 409 responses with an
//! `error_summary` field; those are mapped in `RemoteError::from_status`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use super::types::{
    FileMetadata, LatestCursorArg, LatestCursorResponse, LongpollArg, LongpollResponse,
    MetadataEntry, PathArg,
};
use crate::remote::{Download, Entry, LongpollOutcome, RemoteError, RemoteStore};

/// Dropbox RPC endpoint base URL
const API_URL: &str = "https://api.dropboxapi.com/2";

/// Dropbox content endpoint base URL (downloads)
const CONTENT_URL: &str = "https://content.dropboxapi.com/2";

/// Dropbox notification endpoint base URL (long-poll, unauthenticated)
const NOTIFY_URL: &str = "https://notify.dropboxapi.com/2";

/// Timeout for metadata and cursor calls
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for body downloads
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Extra client-side slack on top of the long-poll wait, per Dropbox guidance
const LONGPOLL_SLACK: Duration = Duration::from_secs(90);

/// Dropbox API client for a single account
#[derive(Clone)]
pub struct DropboxClient {
    http: Client,
    access_token: String,
}

impl DropboxClient {
    /// Create a client from a Dropbox API access token.
    ///
    /// No global client timeout is set because the long-poll call must be
    /// allowed to block for minutes; every request carries its own timeout.
    pub fn new(access_token: &str) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            access_token: access_token.to_string(),
        })
    }

    /// Convert a non-success response into a RemoteError
    async fn error_from(response: reqwest::Response) -> RemoteError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        RemoteError::from_status(status, &body)
    }
}

#[async_trait]
impl RemoteStore for DropboxClient {
    async fn get_metadata(&self, path: &str) -> Result<Entry, RemoteError> {
        debug!(path = path, "Fetching metadata from Dropbox");

        let response = self
            .http
            .post(format!("{}/files/get_metadata", API_URL))
            .bearer_auth(&self.access_token)
            .timeout(RPC_TIMEOUT)
            .json(&PathArg {
                path: path.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let entry: MetadataEntry = response
            .json()
            .await
            .map_err(|e| RemoteError::Request(format!("Bad metadata response: {}", e)))?;

        Ok(entry.into())
    }

    async fn download(&self, path: &str) -> Result<Download, RemoteError> {
        debug!(path = path, "Downloading file from Dropbox");

        let arg = serde_json::to_string(&PathArg {
            path: path.to_string(),
        })
        .map_err(|e| RemoteError::Request(e.to_string()))?;

        let response = self
            .http
            .post(format!("{}/files/download", CONTENT_URL))
            .bearer_auth(&self.access_token)
            .timeout(DOWNLOAD_TIMEOUT)
            .header("Dropbox-API-Arg", arg)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        // File metadata rides along in a response header on content calls
        let meta: FileMetadata = response
            .headers()
            .get("Dropbox-API-Result")
            .and_then(|v| v.to_str().ok())
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RemoteError::Request(format!("Bad Dropbox-API-Result header: {}", e)))?
            .ok_or_else(|| RemoteError::Request("Missing Dropbox-API-Result header".to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body: Bytes = response.bytes().await?;

        debug!(
            path = path,
            name = %meta.name,
            size = meta.size,
            rev = %meta.rev,
            "Downloaded file from Dropbox"
        );

        Ok(Download {
            meta: meta.into(),
            content_type,
            body,
        })
    }

    async fn latest_cursor(&self, folder: &str) -> Result<String, RemoteError> {
        let response = self
            .http
            .post(format!("{}/files/list_folder/get_latest_cursor", API_URL))
            .bearer_auth(&self.access_token)
            .timeout(RPC_TIMEOUT)
            .json(&LatestCursorArg {
                path: folder.to_string(),
                recursive: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let cursor: LatestCursorResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Request(format!("Bad cursor response: {}", e)))?;

        Ok(cursor.cursor)
    }

    async fn longpoll(&self, cursor: &str, timeout_secs: u64) -> Result<LongpollOutcome, RemoteError> {
        // The notify endpoint takes no Authorization header; the cursor is
        // the credential.
        let response = self
            .http
            .post(format!("{}/files/list_folder/longpoll", NOTIFY_URL))
            .timeout(Duration::from_secs(timeout_secs) + LONGPOLL_SLACK)
            .json(&LongpollArg {
                cursor: cursor.to_string(),
                timeout: timeout_secs,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let poll: LongpollResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Request(format!("Bad longpoll response: {}", e)))?;

        Ok(LongpollOutcome {
            changed: poll.changes,
            backoff: poll.backoff,
        })
    }
}
