//! # Database Module
//!
//! SQLite persistence for the two things the site stores besides sessions:
//! - `models`: row types (Snippet)
//! - `users`: the [`users::UserStore`] used by authentication, and its SQLite implementation
//! - `snippets`: snippet queries
//!
//! Session records live in their own table managed by
//! `tower-sessions-sqlx-store`, not here.

pub mod models;
pub mod snippets;
pub mod users;

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Open the pool and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    // An in-memory database exists per connection, so keep exactly one.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // Migrations are embedded at compile time from ./migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Timestamps are stored as RFC3339 text in UTC with second precision,
/// which keeps lexical and chronological order identical.
pub(crate) fn timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
