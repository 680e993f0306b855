//! # Database Models
//!
//! Row types read back from SQLite. Dates are RFC3339 strings, the same
//! way SQLite stores them. Users are only ever read back as ids.

use serde::Serialize;

/// A shared text snippet
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: String,
    /// After this instant the snippet is no longer shown
    pub expires: String,
}
