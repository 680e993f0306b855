use super::{Interceptor, Next};
use crate::auth::AuthService;
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::session::Session;
use async_trait::async_trait;
use axum::{extract::Request, response::Response};

/// Works out whether the request is authenticated and records the answer
/// as a [`RequestContext`] for the gate, handlers and templates.
///
/// The user store is consulted at most once per request, and only when the
/// session claims a user.
pub struct Authenticate {
    auth: AuthService,
}

impl Authenticate {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl Interceptor for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn intercept(&self, mut request: Request, next: Next) -> AppResult<Response> {
        let session = request
            .extensions()
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("authenticate stage needs the session stage".into()))?;

        let is_authenticated = self.auth.resolve(&session).await?;
        request
            .extensions_mut()
            .insert(RequestContext { is_authenticated });

        next.run(request).await
    }
}
