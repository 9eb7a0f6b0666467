//! FormForge API - Form Builder Platform
//!
//! Owners design forms (fields, settings, quiz answers), publish them, collect
//! responses and read analytics. Submitters answer public forms without an account.
//!
//! Storage sits behind the `FormStore`/`UserStore` traits: PostgreSQL in
//! production, an in-process store for development (`STORAGE_BACKEND=memory`).

mod access;
mod analytics;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod state;
mod submission;
mod templates;

use crate::auth::SessionKeys;
use crate::config::{Settings, StorageBackend};
use crate::db::{FormStore, MemoryStore, PgStore, UserStore};
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Stores = (Arc<dyn FormStore>, Arc<dyn UserStore>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting FormForge - Form Builder Platform...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    let (forms, users) = match init_stores(&settings).await {
        Ok(stores) => stores,
        Err(e) => {
            error!("❌ FATAL: Failed to initialize storage: {}", e);
            return Err(e);
        }
    };

    let sessions = SessionKeys::new(&settings.auth.jwt_secret, settings.auth.session_ttl_hours);
    let state = Arc::new(AppState::new(
        forms,
        users,
        sessions,
        settings.auth.cookie_secure,
    ));

    // Build the router
    let app = create_router(state, &settings.cors);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Authentication ───");
    info!("   POST /api/auth/register        - Register new account");
    info!("   POST /api/auth/login           - Login with email/password");
    info!("   POST /api/auth/logout          - Clear the session cookie");
    info!("   GET  /api/auth/me              - Get current user");
    info!("   PUT  /api/auth/profile         - Update name, email or password");
    info!("");
    info!("   ─── Forms ───");
    info!("   GET  /api/forms                - List your forms");
    info!("   POST /api/forms                - Create a form");
    info!("   GET  /api/forms/{{id}}           - Read a form");
    info!("   PUT  /api/forms/{{id}}           - Update a form");
    info!("   DEL  /api/forms/{{id}}           - Delete a form and its responses");
    info!("");
    info!("   ─── Responses ───");
    info!("   POST /api/forms/{{id}}/responses - Submit a response");
    info!("   GET  /api/forms/{{id}}/responses - List responses (owner)");
    info!("   GET  /api/forms/{{id}}/analytics - Response analytics (owner)");
    info!("");
    info!("   ─── Templates ───");
    info!("   GET  /api/templates            - List templates");
    info!("   POST /api/templates            - Look up a template by templateId");
    info!("   POST /api/templates/{{id}}/instantiate - Create a form from a template");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,formforge_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Connect the configured storage backend
async fn init_stores(settings: &Settings) -> anyhow::Result<Stores> {
    match settings.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&settings.database).await?;
            info!("✅ Database pool created successfully");

            db::init_schema(&pool).await?;

            let store = Arc::new(PgStore::new(pool));
            let forms: Arc<dyn FormStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            Ok((forms, users))
        }
        StorageBackend::Memory => {
            warn!("⚠️  Using in-memory storage; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            let forms: Arc<dyn FormStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            Ok((forms, users))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
