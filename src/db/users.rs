//! # User Store
//!
//! The authentication layer only needs three things from the user
//! database, captured by [`UserStore`]. [`UserModel`] implements it on
//! SQLite; unit tests substitute a mock.

use crate::auth::password::PasswordService;
use crate::db::timestamp;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account. Fails with `DuplicateEmail` if the email is taken.
    async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<i64>;

    /// Id of the user with this email and password, `None` if either is wrong.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<i64>>;

    async fn exists(&self, id: i64) -> AppResult<bool>;
}

#[derive(Debug, Clone)]
pub struct UserModel {
    pool: SqlitePool,
}

impl UserModel {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserModel {
    async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<i64> {
        let hashed_password = PasswordService::hash(password)?;

        let result = sqlx::query(
            "INSERT INTO users (name, email, hashed_password, created)
             VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(&hashed_password)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::DuplicateEmail,
            _ => AppError::Database(e),
        })?;

        Ok(result.last_insert_rowid())
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<i64>> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, hashed_password FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, hashed_password)) = row else {
            PasswordService::verify_dummy(password);
            return Ok(None);
        };

        if PasswordService::verify(password, &hashed_password)? {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
