//! Runtime configuration
//!
//! Folder and transport come from command-line flags; Dropbox credentials
//! come from the process environment.

use std::path::PathBuf;

use clap::Parser;

/// Caching HTTP front-end for a Dropbox folder
#[derive(Debug, Parser)]
#[command(name = "dropfront", version, about)]
pub struct Config {
    /// Dropbox folder to serve from
    #[arg(long, default_value = "/Public")]
    pub folder: String,

    /// Public hostname; when set, serve HTTPS on :443 with automatically
    /// provisioned certificates instead of plain HTTP
    #[arg(long)]
    pub hostname: Option<String>,

    /// Port for plain HTTP (ignored when --hostname is set)
    #[arg(long, default_value_t = 8889)]
    pub port: u16,

    /// Directory where provisioned TLS certificates are cached
    #[arg(long, default_value = "./acme-cache")]
    pub cert_cache: PathBuf,

    /// Dropbox API access token
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Dropbox app key (unused by the bearer-token flow)
    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Dropbox app secret (unused by the bearer-token flow)
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}
