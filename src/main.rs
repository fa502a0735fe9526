//! RAG Status Backend
//!
//! REST backend for weekly red/amber/green team status reports, with SQLite
//! persistence and dashboard analytics.

mod analytics;
mod api;
mod config;
mod db;
mod errors;
mod lifecycle;
mod models;

use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use lifecycle::Lifecycle;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub lifecycle: Lifecycle,
}

impl AppState {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            lifecycle: Lifecycle::new(repo.clone()),
            repo,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RAG Status Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    if config.seed_members {
        let seeded = repo.seed_default_members().await?;
        if seeded > 0 {
            tracing::info!("Seeded {} default team members", seeded);
        }
    }

    let state = AppState::new(repo);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/revision", get(api::get_revision))
        // Team members
        .route(
            "/team-members",
            get(api::list_members).post(api::create_member),
        )
        .route(
            "/team-members/{id}",
            get(api::get_member)
                .put(api::update_member)
                .delete(api::delete_member),
        )
        // Statuses
        .route(
            "/statuses",
            get(api::list_statuses)
                .post(api::create_status)
                .delete(api::clear_statuses),
        )
        .route(
            "/statuses/{id}",
            put(api::update_status)
                .get(api::get_status)
                .delete(api::delete_status),
        )
        // Dashboard
        .route("/analytics", get(api::get_analytics));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
