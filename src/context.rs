//! # Request Context
//!
//! Facts derived once per request by the middleware chain and read by
//! handlers and later stages through the request extensions:
//! - the [`Session`](crate::session::Session) handle (inserted by the
//!   session stage; tower-sessions supplies its extractor)
//! - [`RequestContext`] (inserted by the authenticate stage)
//!
//! Handlers take both as arguments.

use axum::{extract::FromRequestParts, http::request::Parts};

/// Per-request derived facts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The session belongs to a user that still exists
    pub is_authenticated: bool,
}

/// Missing context means the authenticate stage didn't run, which is the
/// anonymous case.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .copied()
            .unwrap_or_default())
    }
}
