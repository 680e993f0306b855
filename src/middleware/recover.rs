//! # Panic/Error Containment
//!
//! Outermost stage. Whatever happens further in, the client gets exactly
//! one well-formed response and the process keeps serving:
//! - a panic unwinding out of a stage or handler
//! - an error nobody handled
//! - a response carrying a [`ServerFault`] marker
//! - the request deadline passing
//!
//! All of these are logged here, once, at ERROR with the request method and
//! URI. The client only ever sees the status text, with the same security
//! headers as any other response. After a panic or a timeout the response
//! also asks for the connection to be closed, since the inner code may have
//! left it in an unknown state.

use super::{headers, Interceptor, Next};
use crate::error::{status_response, AppResult, ServerFault};
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

pub struct RecoverPanic {
    deadline: Duration,
}

impl RecoverPanic {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

#[async_trait]
impl Interceptor for RecoverPanic {
    fn name(&self) -> &'static str {
        "recover"
    }

    async fn intercept(&self, request: Request, next: Next) -> AppResult<Response> {
        let method = request.method().clone();
        let uri = request.uri().clone();

        let guarded = AssertUnwindSafe(next.run(request)).catch_unwind();

        let response = match tokio::time::timeout(self.deadline, guarded).await {
            Ok(Ok(Ok(mut response))) => match response.extensions_mut().remove::<ServerFault>() {
                Some(fault) => {
                    log_fault(&method, &uri, &fault.0);
                    rebuilt(response.status())
                }
                None => response,
            },
            Ok(Ok(Err(err))) => {
                if err.is_server_error() {
                    log_fault(&method, &uri, &err.to_string());
                }
                // Client errors and redirects pass through with no fault marker.
                let mut response = err.into_response();
                response.extensions_mut().remove::<ServerFault>();
                headers::apply(response.headers_mut());
                response
            }
            Ok(Err(payload)) => {
                log_fault(&method, &uri, &format!("panic: {}", panic_message(&*payload)));
                closing(rebuilt(StatusCode::INTERNAL_SERVER_ERROR))
            }
            Err(_) => {
                log_fault(&method, &uri, &format!("request exceeded deadline of {:?}", self.deadline));
                closing(rebuilt(StatusCode::INTERNAL_SERVER_ERROR))
            }
        };

        Ok(response)
    }
}

fn log_fault(method: &Method, uri: &Uri, description: &str) {
    tracing::error!(method = %method, uri = %uri, "{description}");
}

/// Bare status response; nothing from the failed response survives.
fn rebuilt(status: StatusCode) -> Response {
    let mut response = status_response(status);
    headers::apply(response.headers_mut());
    response
}

fn closing(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::middleware::{Chain, Endpoint};
    use axum::body::Body;
    use std::sync::Arc;

    fn chain() -> Chain {
        Chain::new(vec![Arc::new(RecoverPanic::new(Duration::from_millis(200)))])
    }

    fn request() -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/snippet/create?x=1")
            .body(Body::empty())
            .unwrap()
    }

    fn ok_status(status: StatusCode) -> Endpoint {
        Box::new(move |_| Box::pin(async move { Ok::<_, AppError>(status.into_response()) }))
    }

    async fn explode() -> AppResult<Response> {
        panic!("boom")
    }

    #[tokio::test]
    async fn panic_becomes_500_with_connection_close() {
        let endpoint: Endpoint = Box::new(|_| Box::pin(explode()));

        let response = chain().run(request(), endpoint).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "deny");
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    }

    #[tokio::test]
    async fn fault_marker_is_stripped_and_body_is_generic() {
        let endpoint: Endpoint = Box::new(|_| {
            Box::pin(async {
                Ok::<_, AppError>(AppError::Internal("secret detail".into()).into_response())
            })
        });

        let response = chain().run(request(), endpoint).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ServerFault>().is_none());
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Internal Server Error");
    }

    #[tokio::test]
    async fn escaped_client_error_keeps_its_status() {
        let endpoint: Endpoint = Box::new(|_| Box::pin(async { Err::<Response, _>(AppError::Csrf) }));

        let response = chain().run(request(), endpoint).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::CONNECTION).is_none());
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "deny");
    }

    #[tokio::test]
    async fn slow_request_is_cut_off() {
        let endpoint: Endpoint = Box::new(|_| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AppError>(StatusCode::OK.into_response())
            })
        });

        let response = chain().run(request(), endpoint).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "deny");
    }

    #[tokio::test]
    async fn healthy_responses_pass_through() {
        let response = chain()
            .run(request(), ok_status(StatusCode::CREATED))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn panic_messages_are_extracted() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
    }
}
