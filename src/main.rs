//! # Snippetbox server
//!
//! Startup:
//! 1. Set up logging
//! 2. Load configuration from the environment
//! 3. Open the database, run migrations for snippets, users and sessions
//! 4. Start a background task deleting expired sessions
//! 5. Build the router and serve

use snippetbox::{
    config::{Config, DEFAULT_LOG_FILTER},
    db, routes,
    state::AppState,
};
use std::net::SocketAddr;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        // Human-readable lines on stdout
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Reads .env too; a malformed value stops startup here
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    // Opens (or creates) the database and applies snippet/user migrations
    let pool = db::connect(&config.database_url).await?;

    // Session records live in their own table in the same database
    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;

    // Expired sessions are never loaded, but their rows stay until removed
    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        // Every 10 minutes; the first tick fires immediately
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            tracing::debug!("Running expired session cleanup");
            // A failed sweep is retried on the next tick
            if let Err(e) = cleanup_store.delete_expired().await {
                tracing::error!("Session cleanup failed: {:?}", e);
            }
        }
    });

    // Templates are parsed here, so a broken template fails startup
    let state = AppState::new(&config, pool, session_store)?;
    tracing::info!("Application state initialized");

    // Route table with the standard, dynamic and protected chains mounted
    let app = routes::router(state);

    // Bind before serving so a taken port is reported as a startup error
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    // Client addresses are needed for the request log
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
