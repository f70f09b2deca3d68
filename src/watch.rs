//! Invalidation watch loop
//!
//! One long-lived task that long-polls the remote store for changes anywhere
//! in the monitored folder and bumps the invalidation signal when something
//! changed. Errors trigger a fixed backoff and the loop carries on; it only
//! stops when the shutdown channel fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::cache::InvalidationSignal;
use crate::remote::{RemoteError, RemoteStore};

/// Upper bound on a single long-poll wait, seconds
pub const LONGPOLL_TIMEOUT_SECS: u64 = 300;

/// Default pause after a cursor or long-poll failure before trying again
const ERROR_BACKOFF: Duration = Duration::from_secs(60);

/// Long-polls the monitored folder for the process lifetime
pub struct WatchLoop {
    remote: Arc<dyn RemoteStore>,
    signal: Arc<InvalidationSignal>,
    folder: String,
    shutdown: watch::Receiver<bool>,
    error_backoff: Duration,
}

impl WatchLoop {
    /// Create a loop with the default one-minute error backoff
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        signal: Arc<InvalidationSignal>,
        folder: String,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self::with_error_backoff(remote, signal, folder, shutdown, ERROR_BACKOFF)
    }

    /// Create a loop with a custom error backoff
    pub fn with_error_backoff(
        remote: Arc<dyn RemoteStore>,
        signal: Arc<InvalidationSignal>,
        folder: String,
        shutdown: watch::Receiver<bool>,
        error_backoff: Duration,
    ) -> Self {
        Self {
            remote,
            signal,
            folder,
            shutdown,
            error_backoff,
        }
    }

    /// Run until the shutdown channel fires.
    pub async fn run(self) {
        let WatchLoop {
            remote,
            signal,
            folder,
            mut shutdown,
            error_backoff,
        } = self;

        info!(folder = %folder, "Watch loop started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                result = watch_once(remote.as_ref(), &signal, &folder) => {
                    let pause = match result {
                        Ok(backoff) => backoff,
                        Err(err) => {
                            warn!(error = %err, "Watch iteration failed, backing off");
                            error_backoff
                        }
                    };
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(pause) => {}
                    }
                }
            }
        }

        info!("Watch loop stopped");
    }
}

/// One watch iteration: cursor, long-poll, maybe invalidate.
///
/// Returns how long to pause before the next iteration (the remote store's
/// mandated backoff, zero when it has none).
async fn watch_once(
    remote: &dyn RemoteStore,
    signal: &InvalidationSignal,
    folder: &str,
) -> Result<Duration, RemoteError> {
    let cursor = remote.latest_cursor(folder).await?;
    let outcome = remote.longpoll(&cursor, LONGPOLL_TIMEOUT_SECS).await?;

    if outcome.changed {
        info!(folder = %folder, "Remote change detected, invalidating cache");
        signal.bump();
    }

    Ok(Duration::from_secs(outcome.backoff.unwrap_or(0)))
}
