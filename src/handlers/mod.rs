//! # HTTP Request Handlers
//!
//! Each handler renders a page or performs a form action. Handlers only
//! see what the middleware chain already established: the [`Session`]
//! and the [`RequestContext`] are ordinary extractor arguments.
//!
//! ## Submodules
//! - `health`: liveness check
//! - `snippets`: home, snippet view and creation
//! - `users`: signup, login, logout
//! - `forms`: form decoding and validation shared by the above
//!
//! [`Session`]: crate::session::Session
//! [`RequestContext`]: crate::context::RequestContext

pub mod forms;
pub mod health;
pub mod snippets;
pub mod users;
