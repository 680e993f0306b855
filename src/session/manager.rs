use super::Session;
use crate::error::{AppError, AppResult};
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::fmt;
use std::sync::Arc;
use time::Duration;
use tower_sessions::{session::Id, Expiry, SessionStore};

/// Name of the cookie carrying the session token
pub const COOKIE_NAME: &str = "session";

type OpenSession = dyn Fn(Option<Id>) -> Session + Send + Sync;

/// Opens sessions on a [`SessionStore`] and commits them back.
#[derive(Clone)]
pub struct SessionManager {
    open: Arc<OpenSession>,
    lifetime: Duration,
    secure: bool,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("lifetime", &self.lifetime)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(store: impl SessionStore, lifetime: std::time::Duration, secure: bool) -> Self {
        let store = Arc::new(store);
        let lifetime = Duration::seconds(lifetime.as_secs() as i64);
        // The expiry is measured from each save.
        let expiry = Expiry::OnInactivity(lifetime);

        SessionManager {
            open: Arc::new(move |id: Option<Id>| {
                Session::new(id, store.clone(), Some(expiry.clone()))
            }),
            lifetime,
            secure,
        }
    }

    /// Session for the token in the request's `Cookie` header.
    ///
    /// Nothing is read from the store yet. A missing or malformed token
    /// gives a new empty session; an unknown or expired one turns into a
    /// new empty session on first access.
    pub fn load(&self, headers: &HeaderMap) -> Session {
        let id = CookieJar::from_headers(headers)
            .get(COOKIE_NAME)
            .and_then(|cookie| cookie.value().parse::<Id>().ok());
        (self.open)(id)
    }

    /// Persist the session's changes.
    ///
    /// Returns the cookie to send back, or `None` when nothing changed.
    /// A flushed session gets a removal cookie.
    pub async fn commit(&self, session: &Session) -> AppResult<Option<Cookie<'static>>> {
        if !session.is_modified() {
            return Ok(None);
        }

        if session.is_empty().await {
            return Ok(Some(self.removal_cookie()));
        }

        session.save().await?;
        let id = session
            .id()
            .ok_or_else(|| AppError::Internal("saved session has no id".into()))?;
        Ok(Some(self.session_cookie(id)))
    }

    fn session_cookie(&self, id: Id) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, id.to_string()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(self.lifetime)
            .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::ZERO)
            .build()
    }
}
