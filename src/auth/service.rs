//! # Auth Service
//!
//! A session is either `Anonymous` or `Authenticated(user_id)`; the only
//! thing stored is the user id under [`AUTH_USER_KEY`].
//!
//! ## Transitions
//! - `login`: verify credentials, rotate the session token and CSRF secret,
//!   store the id
//! - `logout`: rotate the session token and CSRF secret, remove the id
//!
//! Rotating on both transitions means a session token or CSRF token an
//! attacker planted or observed before the transition is worthless after it.

use crate::csrf;
use crate::db::users::UserStore;
use crate::error::{AppError, AppResult};
use crate::session::{Session, AUTH_USER_KEY};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(i64),
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// State as recorded in the session, without consulting the user store.
    pub async fn state(session: &Session) -> AppResult<AuthState> {
        Ok(match session.get::<i64>(AUTH_USER_KEY).await? {
            Some(id) => AuthState::Authenticated(id),
            None => AuthState::Anonymous,
        })
    }

    /// Log the session in. Wrong email and wrong password fail identically.
    pub async fn login(&self, session: &Session, email: &str, password: &str) -> AppResult<i64> {
        let Some(user_id) = self.users.authenticate(email, password).await? else {
            tracing::info!("login failed");
            return Err(AppError::InvalidCredentials);
        };

        rotate(session).await?;
        session.insert(AUTH_USER_KEY, user_id).await?;

        tracing::info!(user_id, "user logged in");
        Ok(user_id)
    }

    pub async fn logout(&self, session: &Session) -> AppResult<()> {
        let AuthState::Authenticated(user_id) = Self::state(session).await? else {
            return Err(AppError::NotAuthenticated);
        };

        rotate(session).await?;
        session.remove::<i64>(AUTH_USER_KEY).await?;

        tracing::info!(user_id, "user logged out");
        Ok(())
    }

    /// Whether this request counts as authenticated.
    ///
    /// A session pointing at a user that no longer exists is downgraded to
    /// anonymous and the stale id is dropped from it.
    pub async fn resolve(&self, session: &Session) -> AppResult<bool> {
        let AuthState::Authenticated(user_id) = Self::state(session).await? else {
            return Ok(false);
        };

        if self.users.exists(user_id).await? {
            return Ok(true);
        }

        tracing::warn!(user_id, "session refers to a missing user, clearing it");
        session.remove::<i64>(AUTH_USER_KEY).await?;
        Ok(false)
    }
}

/// New session token and new CSRF secret, same data otherwise.
async fn rotate(session: &Session) -> AppResult<()> {
    session.cycle_id().await?;
    csrf::rotate(session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::MockUserStore;
    use crate::session::{test_session, CSRF_SECRET_KEY};
    use mockall::predicate::eq;

    fn service(users: MockUserStore) -> AuthService {
        AuthService::new(Arc::new(users))
    }

    /// A session that has been saved once, so it has a token to rotate.
    async fn saved_session() -> Session {
        let session = test_session();
        csrf::ensure_secret(&session).await.unwrap();
        session.save().await.unwrap();
        session
    }

    #[tokio::test]
    async fn login_rotates_token_and_records_user() {
        let mut users = MockUserStore::new();
        users.expect_authenticate().returning(|email, password| {
            if email == "alice@example.com" && password == "pa55word" {
                Ok(Some(42))
            } else {
                Ok(None)
            }
        });
        let auth = service(users);
        let session = saved_session().await;
        let before = session.id();
        let token_before = csrf::token(&session).await.unwrap();

        let user_id = auth.login(&session, "alice@example.com", "pa55word").await.unwrap();

        assert_eq!(user_id, 42);
        assert_ne!(session.id(), before);
        assert!(!csrf::verify(&session, &token_before).await.unwrap());
        assert_eq!(
            AuthService::state(&session).await.unwrap(),
            AuthState::Authenticated(42)
        );
    }

    #[tokio::test]
    async fn failed_login_leaves_session_untouched() {
        let mut users = MockUserStore::new();
        users.expect_authenticate().returning(|_, _| Ok(None));
        let auth = service(users);
        let session = saved_session().await;
        let before = session.id();
        let secret = session.get::<String>(CSRF_SECRET_KEY).await.unwrap();

        let err = auth.login(&session, "alice@example.com", "nope").await.unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(session.id(), before);
        assert_eq!(session.get::<String>(CSRF_SECRET_KEY).await.unwrap(), secret);
        assert_eq!(AuthService::state(&session).await.unwrap(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn logout_rotates_token_and_clears_user() {
        let auth = service(MockUserStore::new());
        let session = saved_session().await;
        session.insert(AUTH_USER_KEY, 42_i64).await.unwrap();
        let before = session.id();

        auth.logout(&session).await.unwrap();

        assert_ne!(session.id(), before);
        assert_eq!(AuthService::state(&session).await.unwrap(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn logout_requires_an_authenticated_session() {
        let auth = service(MockUserStore::new());
        let session = saved_session().await;
        let before = session.id();

        let result = auth.logout(&session).await;

        assert!(matches!(result, Err(AppError::NotAuthenticated)));
        assert_eq!(session.id(), before);
    }

    #[tokio::test]
    async fn anonymous_session_resolves_without_a_lookup() {
        // No expectations: any store call would panic.
        let auth = service(MockUserStore::new());

        assert!(!auth.resolve(&test_session()).await.unwrap());
    }

    #[tokio::test]
    async fn stale_user_id_is_cleared() {
        let mut users = MockUserStore::new();
        users.expect_exists().with(eq(42)).returning(|_| Ok(false));
        let auth = service(users);
        let session = test_session();
        session.insert(AUTH_USER_KEY, 42_i64).await.unwrap();

        assert!(!auth.resolve(&session).await.unwrap());
        assert!(session.get::<i64>(AUTH_USER_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn live_user_id_resolves_authenticated() {
        let mut users = MockUserStore::new();
        users.expect_exists().with(eq(42)).returning(|_| Ok(true));
        let auth = service(users);
        let session = test_session();
        session.insert(AUTH_USER_KEY, 42_i64).await.unwrap();

        assert!(auth.resolve(&session).await.unwrap());
    }
}
