//! # Middleware Module
//!
//! Middleware intercepts requests before they reach a handler and
//! responses on their way out. Each stage implements [`Interceptor`] and
//! receives the request plus a [`Next`] handle for the rest of the chain.
//! A stage can:
//! - call `next.run(request)` and post-process the response
//! - short-circuit with its own response, never calling `next`
//! - recover from a failure raised further in
//!
//! A [`Chain`] is an ordered list of stages folded around a terminal
//! endpoint: `[M1, M2, M3]` runs as `M1(M2(M3(endpoint)))`.
//!
//! ## Our chains
//! - standard: `recover` → `log_request` → `secure_headers` (every route)
//! - dynamic: `load_and_save` → `csrf` → `authenticate` (session-aware routes)
//! - protected: dynamic + `require_auth` (routes needing a login)
//!
//! Chains are mounted on an axum `Router` with
//! `axum::middleware::from_fn_with_state(chain, middleware::dispatch)`.

pub mod authenticate;
pub mod csrf;
pub mod headers;
pub mod logging;
pub mod recover;
pub mod require_auth;
pub mod session;

pub use authenticate::Authenticate;
pub use csrf::CsrfProtect;
pub use headers::SecureHeaders;
pub use logging::LogRequest;
pub use recover::RecoverPanic;
pub use require_auth::RequireAuthentication;
pub use session::LoadAndSave;

use crate::error::AppResult;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::sync::Arc;

/// One stage of a middleware chain.
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Short name, used in logs and tests.
    fn name(&self) -> &'static str;

    async fn intercept(&self, request: Request, next: Next) -> AppResult<Response>;
}

/// The handler a chain ends in.
pub type Endpoint = Box<dyn FnOnce(Request) -> BoxFuture<'static, AppResult<Response>> + Send>;

/// The remainder of a chain, as seen by one stage.
pub struct Next {
    stages: Arc<[Arc<dyn Interceptor>]>,
    position: usize,
    endpoint: Endpoint,
}

impl Next {
    /// Run the following stage, or the endpoint if this was the last one.
    pub async fn run(self, request: Request) -> AppResult<Response> {
        let Next {
            stages,
            position,
            endpoint,
        } = self;

        match stages.get(position).cloned() {
            Some(stage) => {
                let next = Next {
                    stages,
                    position: position + 1,
                    endpoint,
                };
                stage.intercept(request, next).await
            }
            None => endpoint(request).await,
        }
    }
}

/// Ordered, immutable list of stages.
#[derive(Clone)]
pub struct Chain {
    stages: Arc<[Arc<dyn Interceptor>]>,
}

impl Chain {
    pub fn new(stages: Vec<Arc<dyn Interceptor>>) -> Self {
        Chain {
            stages: stages.into(),
        }
    }

    /// A new chain: this one followed by `stage`. `self` is unchanged.
    pub fn append(&self, stage: Arc<dyn Interceptor>) -> Self {
        let mut stages: Vec<_> = self.stages.iter().cloned().collect();
        stages.push(stage);
        Chain::new(stages)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `request` through every stage and then `endpoint`.
    pub async fn run(&self, request: Request, endpoint: Endpoint) -> AppResult<Response> {
        Next {
            stages: self.stages.clone(),
            position: 0,
            endpoint,
        }
        .run(request)
        .await
    }
}

/// Adapter mounting a [`Chain`] as axum middleware.
///
/// The rest of the axum stack becomes the chain's endpoint. An error that
/// leaves the chain is turned into its response here; server errors keep
/// their fault marker so an outer `recover` stage still logs them.
pub async fn dispatch(
    State(chain): State<Chain>,
    request: Request,
    next: axum::middleware::Next,
) -> Response {
    let endpoint: Endpoint = Box::new(move |request| {
        Box::pin(async move { Ok(next.run(request).await) })
    });

    chain
        .run(request, endpoint)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}
