//! Security response headers.
//!
//! Added to every response that comes back through the standard chain:
//! - `Content-Security-Policy`: only our own scripts, styles from us and
//!   Google Fonts
//! - `Referrer-Policy`: full URL same-origin, origin only cross-origin
//! - `X-Content-Type-Options`: no MIME sniffing
//! - `X-Frame-Options`: no framing (clickjacking)
//! - `X-XSS-Protection`: disabled, CSP supersedes it

use super::{Interceptor, Next};
use crate::error::AppResult;
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};

const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com",
    ),
    (header::REFERRER_POLICY, "origin-when-cross-origin"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "deny"),
    (header::X_XSS_PROTECTION, "0"),
];

pub struct SecureHeaders;

#[async_trait]
impl Interceptor for SecureHeaders {
    fn name(&self) -> &'static str {
        "secure_headers"
    }

    async fn intercept(&self, request: Request, next: Next) -> AppResult<Response> {
        let mut response = next.run(request).await?;
        apply(response.headers_mut());
        Ok(response)
    }
}

/// Also used by the containment stage for the responses it builds itself,
/// which never pass back through this stage.
pub(crate) fn apply(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}
