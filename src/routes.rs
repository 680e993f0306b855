//! Route table.
//!
//! | Routes                                   | Chains                       |
//! |------------------------------------------|------------------------------|
//! | `/ping`, `/static/*`                     | standard                     |
//! | `/`, `/snippet/view/{id}`, signup, login | standard + dynamic           |
//! | `/snippet/create`, `/user/logout`        | standard + protected         |
//!
//! The standard chain wraps the whole router, so unmatched paths and 405s
//! also get contained, logged and the security headers.

use crate::handlers::{health, snippets, users};
use crate::middleware::dispatch;
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

pub fn router(state: AppState) -> Router {
    let dynamic = Router::new()
        .route("/", get(snippets::home))
        .route("/snippet/view/{id}", get(snippets::view))
        .route("/user/signup", get(users::signup).post(users::signup_post))
        .route("/user/login", get(users::login).post(users::login_post))
        .route_layer(from_fn_with_state(state.dynamic_chain(), dispatch));

    let protected = Router::new()
        .route(
            "/snippet/create",
            get(snippets::create).post(snippets::create_post),
        )
        .route("/user/logout", post(users::logout_post))
        .route_layer(from_fn_with_state(state.protected_chain(), dispatch));

    Router::new()
        .merge(dynamic)
        .merge(protected)
        .route("/ping", get(health::ping))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(from_fn_with_state(state.standard_chain(), dispatch))
        .with_state(state)
}
