//! # Page Rendering
//!
//! Pages are handlebars templates compiled into the binary. Every page
//! fills the `base` layout through a partial block and shares the `nav`
//! partial. The layout's `page_title` hash parameter is scoped over the
//! whole page, so it must not collide with a field the page reads.
//!
//! A page is rendered to a `String` before anything is sent, so a render
//! failure still produces a clean 500 instead of half a page.

use crate::context::RequestContext;
use crate::csrf;
use crate::db::models::Snippet;
use crate::error::AppResult;
use crate::session::{Session, FLASH_KEY};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value;

const PARTIALS: [(&str, &str); 2] = [
    ("base", include_str!("../ui/html/base.hbs")),
    ("nav", include_str!("../ui/html/partials/nav.hbs")),
];

const PAGES: [(&str, &str); 5] = [
    ("home", include_str!("../ui/html/pages/home.hbs")),
    ("view", include_str!("../ui/html/pages/view.hbs")),
    ("create", include_str!("../ui/html/pages/create.hbs")),
    ("signup", include_str!("../ui/html/pages/signup.hbs")),
    ("login", include_str!("../ui/html/pages/login.hbs")),
];

/// Compiled templates, built once at startup.
pub struct TemplateCache {
    registry: Handlebars<'static>,
}

impl TemplateCache {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        for (name, source) in PARTIALS {
            registry.register_partial(name, source)?;
        }
        for (name, source) in PAGES {
            registry.register_template_string(name, source)?;
        }
        Ok(Self { registry })
    }

    /// Render `page` to a string. An unknown page is an error.
    pub fn render(&self, page: &str, data: &TemplateData) -> AppResult<String> {
        Ok(self.registry.render(page, data)?)
    }

    /// Render `page` as an HTML response with the given status.
    pub fn page(&self, status: StatusCode, page: &str, data: &TemplateData) -> AppResult<Response> {
        let body = self.render(page, data)?;
        Ok((status, Html(body)).into_response())
    }
}

/// Everything a page can show.
#[derive(Debug, Default, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    /// Submitted values and their errors, when re-showing a form
    pub form: Option<Value>,
}

impl TemplateData {
    /// Data common to every page of this request.
    ///
    /// Takes the flash message out of the session, so it is shown once.
    pub async fn new(session: &Session, ctx: RequestContext) -> AppResult<Self> {
        Ok(TemplateData {
            current_year: Utc::now().year(),
            flash: session.remove::<String>(FLASH_KEY).await?,
            is_authenticated: ctx.is_authenticated,
            csrf_token: csrf::token(session).await?,
            ..Default::default()
        })
    }

    pub fn with_form(mut self, form: &impl Serialize) -> AppResult<Self> {
        self.form = Some(serde_json::to_value(form)?);
        Ok(self)
    }
}
