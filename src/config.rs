//! # Configuration Management
//!
//! Configuration comes from the environment ("12-factor app"); a `.env`
//! file is honoured for local development.
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 4000)
//! - `DATABASE_URL`: SQLite connection string for snippets, users and sessions
//! - `SESSION_LIFETIME_HOURS`: Session lifetime, refreshed on every save (default: 12)
//! - `COOKIE_SECURE`: Set the `Secure` attribute on the session cookie (default: true)
//! - `REQUEST_TIMEOUT_SECS`: Deadline for the whole request pipeline (default: 10)
//! - `STATIC_DIR`: Directory served under `/static` (default: ui/static)
//! - `RUST_LOG`: Log filter (default: [`DEFAULT_LOG_FILTER`])

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Log filter used when `RUST_LOG` is unset.
///
/// tower-sessions logs its own store failures at ERROR; those reach us as
/// errors and are logged by the containment stage with the request
/// attached, so its copies are switched off.
pub const DEFAULT_LOG_FILTER: &str = "info,snippetbox=debug,tower_sessions_core=off";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    pub host: String,

    /// Server port number
    pub port: u16,

    /// SQLite database connection URL
    /// The "mode=rwc" suffix means: read, write, create if missing
    pub database_url: String,

    /// How long a session lives after its last save
    pub session_lifetime: Duration,

    /// Whether the session cookie is only sent over HTTPS
    pub cookie_secure: bool,

    /// Upper bound on the time one request may spend in the pipeline
    pub request_timeout: Duration,

    /// Location of CSS/JS/image assets
    pub static_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Missing variables fall back to defaults; present but unparseable
    /// values are an error so a typo doesn't silently change behaviour.
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=127.0.0.1
    /// PORT=4000
    /// DATABASE_URL=sqlite:snippetbox.db?mode=rwc
    /// SESSION_LIFETIME_HOURS=12
    /// COOKIE_SECURE=false
    /// ```
    pub fn from_env() -> Result<Self> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();

        // Durations are read as whole units, converted below
        let session_hours: u64 = parse_var("SESSION_LIFETIME_HOURS", "12")?;
        let timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", "10")?;

        Ok(Config {
            // Plain strings: any value is accepted as-is
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            // Typed values go through parse_var so a bad value fails startup
            port: parse_var("PORT", "4000")?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:snippetbox.db?mode=rwc".to_string()),
            session_lifetime: Duration::from_secs(session_hours * 60 * 60),
            // Turn off for local development over plain HTTP
            cookie_secure: parse_var("COOKIE_SECURE", "true")?,
            request_timeout: Duration::from_secs(timeout_secs),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "ui/static".to_string()),
        })
    }

    /// Socket address for `tokio::net::TcpListener::bind()`, e.g. "127.0.0.1:4000"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 4000,
            database_url: "sqlite:snippetbox.db?mode=rwc".to_string(),
            session_lifetime: Duration::from_secs(12 * 60 * 60),
            cookie_secure: true,
            request_timeout: Duration::from_secs(10),
            static_dir: "ui/static".to_string(),
        }
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    // Unset falls back to the default; set-but-empty does not
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    // Surrounding whitespace from .env files is ignored
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value for {name}: {raw:?}"))
}
