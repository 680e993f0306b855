//! # Snippetbox
//!
//! A server-rendered snippet-sharing site with user accounts.
//!
//! Requests pass through explicit middleware chains (see [`middleware`])
//! that establish panic containment, request logging, security headers,
//! the session, CSRF protection and the authentication state before a
//! handler runs.

pub mod auth;
pub mod config;
pub mod context;
pub mod csrf;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;
