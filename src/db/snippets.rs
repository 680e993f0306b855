use crate::db::{models::Snippet, timestamp};
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct SnippetModel {
    pool: SqlitePool,
}

impl SnippetModel {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, title: &str, content: &str, expires_days: i64) -> AppResult<i64> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO snippets (title, content, created, expires)
             VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(content)
        .bind(timestamp(now))
        .bind(timestamp(now + Duration::days(expires_days)))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// A snippet that exists and hasn't expired.
    pub async fn get(&self, id: i64) -> AppResult<Snippet> {
        sqlx::query_as::<_, Snippet>("SELECT * FROM snippets WHERE id = ? AND expires > ?")
            .bind(id)
            .bind(timestamp(Utc::now()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => AppError::NotFound,
                _ => AppError::Database(e),
            })
    }

    /// Ten most recently created live snippets, newest first.
    pub async fn latest(&self) -> AppResult<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>(
            "SELECT * FROM snippets WHERE expires > ?
             ORDER BY id DESC
             LIMIT 10",
        )
        .bind(timestamp(Utc::now()))
        .fetch_all(&self.pool)
        .await?;

        Ok(snippets)
    }
}
