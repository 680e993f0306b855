//! # CSRF tokens
//!
//! Every session owns a random 32-byte secret stored under
//! [`CSRF_SECRET_KEY`]. The token handed to forms is
//! `base64url(HMAC-SHA256(secret, TOKEN_LABEL))`, so:
//! - it can be recomputed at any time, no token store is needed;
//! - it only verifies for the session holding that secret;
//! - [`rotate`] (on login/logout) invalidates every token issued before.
//!
//! Verification goes through `Mac::verify_slice`, which compares in
//! constant time.

use crate::error::{AppError, AppResult};
use crate::session::{Session, CSRF_SECRET_KEY};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hidden form field carrying the token
pub const FORM_FIELD: &str = "csrf_token";

/// Header alternative for non-form requests
pub const HEADER_NAME: &str = "x-csrf-token";

/// Message MACed with the secret to form the token
const TOKEN_LABEL: &[u8] = b"snippetbox csrf token v1";

/// The session's secret, generating and storing one if it has none yet.
pub async fn ensure_secret(session: &Session) -> AppResult<Vec<u8>> {
    if let Some(secret) = stored_secret(session).await? {
        return Ok(secret);
    }
    new_secret(session).await
}

/// Replace the secret, invalidating all earlier tokens.
pub async fn rotate(session: &Session) -> AppResult<()> {
    new_secret(session).await?;
    Ok(())
}

/// Token to embed in forms rendered for this session.
pub async fn token(session: &Session) -> AppResult<String> {
    let secret = ensure_secret(session).await?;
    let tag = keyed(&secret)?.finalize().into_bytes();
    Ok(URL_SAFE_NO_PAD.encode(tag))
}

/// Whether `submitted` is this session's current token.
///
/// A session without a secret has never issued a token, so nothing verifies.
pub async fn verify(session: &Session, submitted: &str) -> AppResult<bool> {
    let Some(secret) = stored_secret(session).await? else {
        return Ok(false);
    };
    let Ok(tag) = URL_SAFE_NO_PAD.decode(submitted.trim()) else {
        return Ok(false);
    };

    Ok(keyed(&secret)?.verify_slice(&tag).is_ok())
}

async fn new_secret(session: &Session) -> AppResult<Vec<u8>> {
    let secret: [u8; 32] = rand::random();
    session
        .insert(CSRF_SECRET_KEY, URL_SAFE_NO_PAD.encode(secret))
        .await?;
    Ok(secret.to_vec())
}

async fn stored_secret(session: &Session) -> AppResult<Option<Vec<u8>>> {
    let Some(encoded) = session.get::<String>(CSRF_SECRET_KEY).await? else {
        return Ok(None);
    };
    // A corrupted secret is treated as missing and will be replaced.
    Ok(URL_SAFE_NO_PAD.decode(encoded).ok().filter(|s| !s.is_empty()))
}

fn keyed(secret: &[u8]) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(format!("HMAC error: {e}")))?;
    mac.update(TOKEN_LABEL);
    Ok(mac)
}
