//! Liveness check.

/// GET /ping
///
/// Sits outside the session chain, so probing never creates sessions.
pub async fn ping() -> &'static str {
    "OK"
}
