#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use parking_lot::Mutex;
use snippetbox::{config::Config, db, routes, session::COOKIE_NAME, state::AppState};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "pa55word";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        request_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

pub async fn test_state() -> AppState {
    let config = test_config();
    let pool = db::connect(&config.database_url).await.unwrap();
    AppState::new(&config, pool, MemoryStore::default()).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers[header::LOCATION].to_str().unwrap()
    }

    /// The session cookie this response sets, if any.
    pub fn session_cookie(&self) -> Option<Cookie<'static>> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| Cookie::parse(v.to_str().ok()?.to_string()).ok())
            .find(|c| c.name() == COOKIE_NAME)
    }

    /// Value of the hidden CSRF field on the page.
    pub fn csrf_token(&self) -> String {
        let marker = "name='csrf_token' value='";
        let start = self.body.find(marker).expect("page has no csrf field") + marker.len();
        let end = self.body[start..].find('\'').unwrap();
        self.body[start..start + end].to_string()
    }
}

/// A browser-like client: remembers the session cookie between requests.
pub struct TestClient {
    pub router: Router,
    pub state: AppState,
    pub cookie: Option<String>,
}

impl TestClient {
    pub async fn new() -> Self {
        let state = test_state().await;
        TestClient {
            router: routes::router(state.clone()),
            state,
            cookie: None,
        }
    }

    pub async fn with_user() -> Self {
        let client = Self::new().await;
        client
            .state
            .users
            .insert("Alice", EMAIL, PASSWORD)
            .await
            .unwrap();
        client
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send(Method::POST, uri, Some(body)).await
    }

    /// GET /user/login, then submit the credentials with the page's token.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        let token = self.get("/user/login").await.csrf_token();
        self.post_form(
            "/user/login",
            &[("email", email), ("password", password), ("csrf_token", token.as_str())],
        )
        .await
    }

    async fn send(&mut self, method: Method, uri: &str, form: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, format!("{COOKIE_NAME}={cookie}"));
        }
        let request = match form {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };

        if let Some(cookie) = response.session_cookie() {
            self.cookie = (!cookie.value().is_empty()).then(|| cookie.value().to_string());
        }
        response
    }
}

/// Collects everything written by a `tracing` fmt subscriber.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Install as the default subscriber for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let capture = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
