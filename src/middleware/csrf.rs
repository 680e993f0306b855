//! CSRF guard stage.
//!
//! Every request makes sure the session has a CSRF secret, so the page
//! being rendered can embed a token; this may create the session. Safe
//! methods then pass through. Unsafe methods must present this session's
//! token, either in the `X-CSRF-Token` header or in the `csrf_token` field
//! of a urlencoded form. Anything else is rejected with 400 before the
//! handler runs; a form too large to buffer gets 413.

use super::{Interceptor, Next};
use crate::csrf::{self, FORM_FIELD, HEADER_NAME};
use crate::error::{AppError, AppResult};
use crate::session::Session;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, Method},
    response::Response,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};

/// Forms bigger than this are rejected while looking for the token.
const MAX_FORM_BYTES: usize = 1024 * 1024;

pub struct CsrfProtect;

#[async_trait]
impl Interceptor for CsrfProtect {
    fn name(&self) -> &'static str {
        "csrf"
    }

    async fn intercept(&self, request: Request, next: Next) -> AppResult<Response> {
        let session = request
            .extensions()
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("csrf stage needs the session stage".into()))?;

        csrf::ensure_secret(&session).await?;
        if is_safe(request.method()) {
            return next.run(request).await;
        }

        let method = request.method().clone();
        let uri = request.uri().clone();
        let (submitted, request) = submitted_token(request).await?;

        let valid = match submitted {
            Some(token) => csrf::verify(&session, &token).await?,
            None => false,
        };
        if !valid {
            tracing::warn!(method = %method, uri = %uri, "CSRF token missing or invalid");
            return Err(AppError::Csrf);
        }

        next.run(request).await
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Token from the header or the form body, plus the request to hand on.
///
/// Reading the form consumes the body, so the buffered bytes are put back.
async fn submitted_token(request: Request) -> AppResult<(Option<String>, Request)> {
    if let Some(token) = request
        .headers()
        .get(HEADER_NAME)
        .and_then(|v| v.to_str().ok())
    {
        let token = token.to_string();
        return Ok((Some(token), request));
    }

    if !is_form(request.headers()) {
        return Ok((None, request));
    }

    let (parts, body) = request.into_parts();
    let bytes = Limited::new(body, MAX_FORM_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                AppError::PayloadTooLarge
            } else {
                AppError::BadRequest(format!("unreadable form body: {e}"))
            }
        })?
        .to_bytes();

    let token = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == FORM_FIELD)
        .map(|(_, value)| value.into_owned());

    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}
