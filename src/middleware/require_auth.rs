//! Authorization gate for routes that need a logged-in user.
//!
//! Reads only the [`RequestContext`] left by the authenticate stage, so it
//! must run after it. Anonymous requests get a 303 to the login page and
//! never reach the handler.

use super::{Interceptor, Next};
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, HeaderValue},
    response::Response,
};

pub struct RequireAuthentication;

#[async_trait]
impl Interceptor for RequireAuthentication {
    fn name(&self) -> &'static str {
        "require_auth"
    }

    async fn intercept(&self, request: Request, next: Next) -> AppResult<Response> {
        let authenticated = request
            .extensions()
            .get::<RequestContext>()
            .is_some_and(|ctx| ctx.is_authenticated);

        if !authenticated {
            tracing::debug!(uri = %request.uri(), "anonymous request to protected route");
            return Err(AppError::NotAuthenticated);
        }

        let mut response = next.run(request).await?;
        // Pages behind a login must not be served from a shared cache.
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        Ok(response)
    }
}
