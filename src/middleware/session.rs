//! Session lifecycle stage.
//!
//! Opens the session named by the request cookie (or starts a blank one),
//! makes it available to everything further in, and commits it once the
//! inner stages are done, whether they succeeded or not.
//!
//! The record itself is fetched on first access, so a store that fails to
//! load surfaces as an error from whichever stage reads the session first.

use super::{Interceptor, Next};
use crate::error::{AppError, AppResult};
use crate::session::SessionManager;
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

pub struct LoadAndSave {
    manager: SessionManager,
}

impl LoadAndSave {
    pub fn new(manager: SessionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Interceptor for LoadAndSave {
    fn name(&self) -> &'static str {
        "load_and_save"
    }

    async fn intercept(&self, mut request: Request, next: Next) -> AppResult<Response> {
        let session = self.manager.load(request.headers());
        request.extensions_mut().insert(session.clone());

        // A failed request still commits, so e.g. a flash set before the
        // error isn't lost. The error is turned into its response first.
        let mut response = next.run(request).await.unwrap_or_else(AppError::into_response);

        if let Some(cookie) = self.manager.commit(&session).await? {
            let value = HeaderValue::from_str(&cookie.to_string())
                .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))?;
            let headers = response.headers_mut();
            headers.append(header::SET_COOKIE, value);
            headers.append(header::VARY, HeaderValue::from_static("Cookie"));
            // Keep a stricter policy set further in (e.g. `no-store`).
            if !headers.contains_key(header::CACHE_CONTROL) {
                headers.insert(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static(r#"no-cache="Set-Cookie""#),
                );
            }
        }

        Ok(response)
    }
}
