//! # Sessions
//!
//! Server-side session state tied to the client by an opaque token cookie.
//! The handle is [`tower_sessions::Session`]: handlers and stages read and
//! write named values through it, and it loads its record from the store
//! lazily on first access.
//!
//! [`SessionManager`] opens the session for the incoming cookie and, once
//! the response is ready, saves whatever changed and builds the
//! `Set-Cookie` header.
//!
//! ## Token rotation
//! `Session::cycle_id` gives the session a new token while keeping its
//! data, deleting the old record from the store. A token captured before
//! login or logout is useless afterwards.

mod manager;

pub use manager::{SessionManager, COOKIE_NAME};
pub use tower_sessions::Session;

/// One-shot notification shown on the next rendered page
pub const FLASH_KEY: &str = "flash";

/// Id of the logged-in user; absent for anonymous sessions
pub const AUTH_USER_KEY: &str = "authenticatedUserID";

/// Per-session key the CSRF tokens are derived from
pub const CSRF_SECRET_KEY: &str = "csrfSecret";

/// A fresh session over its own in-memory store.
#[cfg(test)]
pub(crate) fn test_session() -> Session {
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    Session::new(None, Arc::new(MemoryStore::default()), None)
}
