use super::{Interceptor, Next};
use crate::error::AppResult;
use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request},
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;

/// One line when a request arrives, one when its response is ready.
pub struct LogRequest;

#[async_trait]
impl Interceptor for LogRequest {
    fn name(&self) -> &'static str {
        "log_request"
    }

    async fn intercept(&self, request: Request, next: Next) -> AppResult<Response> {
        let ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "-".to_string());
        let proto = format!("{:?}", request.version());
        let method = request.method().clone();
        let uri = request.uri().clone();

        tracing::info!(ip = %ip, proto = %proto, method = %method, uri = %uri, "received request");

        let start = Instant::now();
        let result = next.run(request).await;

        if let Ok(response) = &result {
            tracing::debug!(
                method = %method,
                uri = %uri,
                status = response.status().as_u16(),
                latency_ms = start.elapsed().as_millis() as u64,
                "request completed"
            );
        }

        result
    }
}
