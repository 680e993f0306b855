//! Snippet pages: home listing, single snippet, creation form.

use super::forms::{FormState, PostForm, SnippetCreateForm};
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::session::{Session, FLASH_KEY};
use crate::state::AppState;
use crate::templates::TemplateData;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

/// GET /
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> AppResult<Response> {
    let mut data = TemplateData::new(&session, ctx).await?;
    data.snippets = state.snippets.latest().await?;

    state.templates.page(StatusCode::OK, "home", &data)
}

/// GET /snippet/view/{id}
///
/// Ids that aren't positive integers are treated like unknown snippets.
pub async fn view(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = match id.parse::<i64>() {
        Ok(id) if id >= 1 => id,
        _ => return Err(AppError::NotFound),
    };

    let snippet = state.snippets.get(id).await?;

    let mut data = TemplateData::new(&session, ctx).await?;
    data.snippet = Some(snippet);

    state.templates.page(StatusCode::OK, "view", &data)
}

/// GET /snippet/create
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
) -> AppResult<Response> {
    let form = FormState::<SnippetCreateForm>::default();
    let data = TemplateData::new(&session, ctx).await?.with_form(&form)?;

    state.templates.page(StatusCode::OK, "create", &data)
}

/// POST /snippet/create
pub async fn create_post(
    State(state): State<AppState>,
    session: Session,
    ctx: RequestContext,
    PostForm(input): PostForm<SnippetCreateForm>,
) -> AppResult<Response> {
    let form = FormState::check(input);
    if !form.is_valid() {
        let data = TemplateData::new(&session, ctx).await?.with_form(&form)?;
        return state
            .templates
            .page(StatusCode::UNPROCESSABLE_ENTITY, "create", &data);
    }

    let values = &form.values;
    let id = state
        .snippets
        .insert(&values.title, &values.content, values.expires)
        .await?;
    tracing::info!(snippet_id = id, "snippet created");

    session.insert(FLASH_KEY, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}
