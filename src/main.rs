//! dropfront - caching HTTP front-end for a Dropbox folder
//!
//! Serves one Dropbox folder as a plain web origin: corrects the MIME types
//! Dropbox fails to classify, caches bodies and 404s in memory, and
//! revalidates when the folder-wide change long-poll fires.

mod cache;
mod config;
mod dropbox;
mod fetch;
mod http;
mod remote;
mod watch;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use futures::StreamExt;
use rustls_acme::{caches::DirCache, AcmeConfig};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use cache::InvalidationSignal;
use config::Config;
use dropbox::DropboxClient;
use fetch::Fetcher;
use http::AppState;
use remote::RemoteStore;
use watch::WatchLoop;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    debug!(
        app_key = config.client_id.is_some(),
        app_secret = config.client_secret.is_some(),
        "Client credentials loaded from environment"
    );

    let remote: Arc<dyn RemoteStore> = Arc::new(DropboxClient::new(&config.access_token)?);
    let signal = Arc::new(InvalidationSignal::new());
    let fetcher = Arc::new(Fetcher::new(
        Arc::clone(&remote),
        Arc::clone(&signal),
        config.folder.clone(),
    ));

    // The watch loop runs for the process lifetime; the channel lets us stop
    // it deterministically on shutdown.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let watch_handle = tokio::spawn(
        WatchLoop::new(
            Arc::clone(&remote),
            Arc::clone(&signal),
            config.folder.clone(),
            shutdown_rx,
        )
        .run(),
    );

    let app = http::build_router(AppState { fetcher });

    let serve = async {
        match config.hostname.clone() {
            Some(hostname) => serve_https(app, hostname, config.cert_cache.clone()).await,
            None => serve_http(app, config.port).await,
        }
    };

    tokio::select! {
        // Bind or serve failures are fatal; the non-zero exit comes from main
        result = serve => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = watch_handle.await;
    info!("Shutdown complete");
    Ok(())
}

async fn serve_http(app: Router, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(addr = %addr, "Listening on plain HTTP");
    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}

async fn serve_https(app: Router, hostname: String, cert_cache: PathBuf) -> Result<()> {
    let mut state = AcmeConfig::new(vec![hostname.clone()])
        .cache(DirCache::new(cert_cache))
        .directory_lets_encrypt(true)
        .state();
    let acceptor = state.axum_acceptor(state.default_rustls_config());

    tokio::spawn(async move {
        while let Some(event) = state.next().await {
            match event {
                Ok(ok) => info!(event = ?ok, "ACME event"),
                Err(err) => error!(error = %err, "ACME error"),
            }
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], 443));
    info!(hostname = %hostname, addr = %addr, "Listening on HTTPS with automatic certificates");
    axum_server::bind(addr)
        .acceptor(acceptor)
        .serve(app.into_make_service())
        .await
        .context("HTTPS server error")?;
    Ok(())
}
