//! Password hashing with Argon2
//!
//! `verify` goes through argon2's own constant-time comparison of the
//! derived hashes; never compare hash strings with `==`.

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Password(e.to_string()))
    }

    pub fn verify(password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AppError::Password(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Spend the same work as a real verification and always fail.
    ///
    /// Used when the email is unknown so response timing doesn't tell
    /// whether an account exists.
    pub fn verify_dummy(password: &str) {
        static DUMMY: OnceLock<Option<String>> = OnceLock::new();
        let dummy = DUMMY.get_or_init(|| Self::hash("not-a-real-password").ok());
        if let Some(hash) = dummy {
            let _ = Self::verify(password, hash);
        }
    }
}
