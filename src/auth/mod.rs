//! # Authentication
//!
//! - `password`: Argon2 hashing and constant-time verification
//! - `service`: the per-session login state machine
//!   (`Anonymous` <-> `Authenticated(user_id)`)

pub mod password;
pub mod service;

pub use service::{AuthService, AuthState};
