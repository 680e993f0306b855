//! # Application State
//!
//! Shared by every request handler via `State<AppState>`. All fields are
//! cheap to clone: pool handles and `Arc`s.
//!
//! The middleware chains are built from the same pieces, so the session
//! manager and auth service the handlers see are the ones the chains use.

use crate::auth::AuthService;
use crate::config::Config;
use crate::db::{snippets::SnippetModel, users::{UserModel, UserStore}};
use crate::error::AppResult;
use crate::middleware::{
    Authenticate, Chain, CsrfProtect, LoadAndSave, LogRequest, RecoverPanic, RequireAuthentication,
    SecureHeaders,
};
use crate::session::SessionManager;
use crate::templates::TemplateCache;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub snippets: SnippetModel,
    pub auth: AuthService,
    pub sessions: SessionManager,
    pub templates: Arc<TemplateCache>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up the application around an open pool and a session store.
    ///
    /// Production passes the SQLite-backed store; tests pass a
    /// `MemoryStore`.
    pub fn new(config: &Config, db: SqlitePool, store: impl SessionStore) -> AppResult<Self> {
        // One user store, shared by the handlers and the auth service
        let users: Arc<dyn UserStore> = Arc::new(UserModel::new(db.clone()));

        Ok(AppState {
            // SqlitePool is a handle, cloning it shares the pool
            snippets: SnippetModel::new(db.clone()),
            auth: AuthService::new(users.clone()),
            // Lifetime and cookie flags come from config
            sessions: SessionManager::new(store, config.session_lifetime, config.cookie_secure),
            // Every page template is parsed up front
            templates: Arc::new(TemplateCache::new()?),
            config: Arc::new(config.clone()),
            users,
        })
    }

    /// recover → log_request → secure_headers, wrapping every route.
    pub fn standard_chain(&self) -> Chain {
        Chain::new(vec![
            // Outermost, so it also catches failures in the stages below
            Arc::new(RecoverPanic::new(self.config.request_timeout)),
            Arc::new(LogRequest),
            Arc::new(SecureHeaders),
        ])
    }

    /// load_and_save → csrf → authenticate, for pages that use the session.
    pub fn dynamic_chain(&self) -> Chain {
        Chain::new(vec![
            // The session must exist before CSRF and auth can read it
            Arc::new(LoadAndSave::new(self.sessions.clone())),
            Arc::new(CsrfProtect),
            Arc::new(Authenticate::new(self.auth.clone())),
        ])
    }

    /// The dynamic chain plus the login gate.
    pub fn protected_chain(&self) -> Chain {
        // The gate reads the context the authenticate stage publishes
        self.dynamic_chain().append(Arc::new(RequireAuthentication))
    }
}
