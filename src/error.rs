//! # Error Handling
//!
//! This module defines the application error type and how each variant is
//! turned into an HTTP response.
//!
//! ## Three kinds of failure
//! - **Client errors** (bad input, CSRF mismatch, wrong credentials): a 4xx
//!   with the canonical status text. These are expected and never logged
//!   as server faults.
//! - **Authorization errors**: the visitor must log in first, so they get a
//!   redirect to the login page instead of an error page.
//! - **Server errors** (database, session store, rendering, ...): the
//!   client sees a bare `500 Internal Server Error`. The detailed cause is
//!   attached to the response as a [`ServerFault`] extension so that the
//!   panic/error containment stage can log it once, together with the
//!   request method and URI it knows about.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use thiserror::Error;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/user/login";

/// Application-wide error type
///
/// `#[from]` lets the `?` operator convert library errors automatically,
/// e.g. a failing `sqlx` query becomes `AppError::Database`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Snippet/user database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session could not be loaded, saved or (de)serialized
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// JSON (de)serialization of session values
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A template failed to parse when the cache was built
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// A page failed to render (including "no such template")
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// Password hashing failed (not a wrong password)
    #[error("Password hashing error: {0}")]
    Password(String),

    /// Unexpected internal condition
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Malformed request (bad form body, bad route parameter)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body over the size we are willing to buffer
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Missing or mismatched anti-forgery token
    #[error("CSRF token missing or invalid")]
    Csrf,

    /// Resource does not exist
    #[error("Not found")]
    NotFound,

    /// Email/password pair did not match. Deliberately says nothing about
    /// which half was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signup with an email that already has an account
    #[error("Duplicate email")]
    DuplicateEmail,

    /// An operation needs an authenticated session
    #[error("Authentication required")]
    NotAuthenticated,
}

impl AppError {
    /// Status code sent to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Csrf => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotAuthenticated => StatusCode::SEE_OTHER,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures that are the server's fault and must be logged.
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

/// Marker attached to responses produced from a server error.
///
/// Holds the internal description that must never reach the client.
/// The containment stage removes it and logs it.
#[derive(Debug, Clone)]
pub struct ServerFault(pub Arc<str>);

impl ServerFault {
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        ServerFault(description.into())
    }
}

/// Response with the canonical reason phrase as a plain-text body.
pub fn status_response(status: StatusCode) -> Response {
    let text = status.canonical_reason().unwrap_or("Error");
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::NotAuthenticated = self {
            return Redirect::to(LOGIN_PATH).into_response();
        }

        let status = self.status();
        let mut response = status_response(status);

        // Only the marker carries the detail; the body is the status text.
        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(ServerFault::new(self.to_string()));
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "client error");
        }

        response
    }
}

/// Shorthand for results that fail with [`AppError`]
pub type AppResult<T> = Result<T, AppError>;
