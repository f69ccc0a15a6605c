//! Purchasing & Inventory Management Platform - Backend Server
//!
//! Dashboard backend for small-business purchasing: purchase order
//! lifecycle, inventory batches with expiration tracking, and in-app
//! notifications.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

pub use config::Config;

use services::{ExpirationScheduler, ExpirationService};

/// Startup progress, reported by the root endpoint while the server
/// finishes initializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl InitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitState::Uninitialized => "uninitialized",
            InitState::Initializing => "initializing",
            InitState::Ready => "ready",
            InitState::Failed => "failed",
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub scheduler: Arc<ExpirationScheduler>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pim_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    let mut init_state = InitState::Uninitialized;
    tracing::info!(
        state = init_state.as_str(),
        "Starting Purchasing & Inventory Management Server"
    );
    tracing::info!("Environment: {}", config.environment);

    init_state = InitState::Initializing;
    tracing::info!(state = init_state.as_str(), "Connecting to database...");

    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            init_state = InitState::Failed;
            tracing::error!(state = init_state.as_str(), error = %err, "Database connection failed");
            return Err(err.into());
        }
    };

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // The sweep only starts once the database is reachable
    let scheduler = Arc::new(ExpirationScheduler::new(
        ExpirationService::new(db_pool.clone()),
        Duration::from_secs(config.sweep.interval_secs),
    ));
    scheduler.start();

    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        scheduler,
    };

    // Build application
    let app = create_app(state);

    init_state = InitState::Ready;
    tracing::info!(state = init_state.as_str(), "Initialization complete");

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Purchasing & Inventory Management API v1.0"
}
