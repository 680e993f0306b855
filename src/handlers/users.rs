//! Account pages: signup, login, logout.
//!
//! Login and logout go through [`crate::auth::AuthService`], which owns the
//! session's authentication state and rotates its token.

use super::forms::{FormState, LoginForm, PostForm, SignupForm};
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::session::{Session, FLASH_KEY};
use crate::state::AppState;
use crate::templates::TemplateData;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

/// GET /user/signup
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> AppResult<Response> {
    let form = FormState::<SignupForm>::default();
    let data = TemplateData::new(&session, ctx).await?.with_form(&form)?;

    state.templates.page(StatusCode::OK, "signup", &data)
}

/// POST /user/signup
///
/// A taken email is reported on the form like any other field error.
pub async fn signup_post(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    PostForm(input): PostForm<SignupForm>,
) -> AppResult<Response> {
    let mut form = FormState::check(input);

    if form.is_valid() {
        let values = &form.values;
        let created = state
            .users
            .insert(&values.name, &values.email, &values.password)
            .await;
        match created {
            Ok(user_id) => {
                tracing::info!(user_id, "user signed up");
                session
                    .insert(FLASH_KEY, "Your signup was successful. Please log in.")
                    .await?;
                return Ok(Redirect::to("/user/login").into_response());
            }
            Err(AppError::DuplicateEmail) => {
                form.add_field_error("email", "Email address is already in use");
            }
            Err(e) => return Err(e),
        }
    }

    let data = TemplateData::new(&session, ctx).await?.with_form(&form)?;
    state
        .templates
        .page(StatusCode::UNPROCESSABLE_ENTITY, "signup", &data)
}

/// GET /user/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> AppResult<Response> {
    let form = FormState::<LoginForm>::default();
    let data = TemplateData::new(&session, ctx).await?.with_form(&form)?;

    state.templates.page(StatusCode::OK, "login", &data)
}

/// POST /user/login
pub async fn login_post(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    PostForm(input): PostForm<LoginForm>,
) -> AppResult<Response> {
    let mut form = FormState::check(input);

    if form.is_valid() {
        let values = &form.values;
        let outcome = state
            .auth
            .login(&session, &values.email, &values.password)
            .await;
        match outcome {
            Ok(_) => return Ok(Redirect::to("/snippet/create").into_response()),
            Err(AppError::InvalidCredentials) => {
                form.non_field_errors
                    .push("Email or password is incorrect".to_string());
            }
            Err(e) => return Err(e),
        }
    }

    let data = TemplateData::new(&session, ctx).await?.with_form(&form)?;
    state
        .templates
        .page(StatusCode::UNPROCESSABLE_ENTITY, "login", &data)
}

/// POST /user/logout
pub async fn logout_post(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    state.auth.logout(&session).await?;
    session.insert(FLASH_KEY, "You've been logged out successfully!").await?;

    Ok(Redirect::to("/").into_response())
}
