//! CityU / Columbia Joint Degree Site Backend
//!
//! Serves the localized resource catalog and catalogued PDF downloads.

mod api;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod tracking;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog::Catalog;
use config::Config;
use db::DownloadCounterStore;
use tracking::{DownloadTracker, PendingDownloads, TrackingMode};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub tracker: DownloadTracker,
    pub pending_downloads: PendingDownloads,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Joint Degree Site Backend");
    tracing::info!("Catalog path: {:?}", config.catalog_path);
    tracing::info!("Public root: {:?}", config.public_root);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Load the catalog once for the process lifetime
    let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
    tracing::info!(
        "Catalog loaded with {} resources",
        catalog.resources().count()
    );

    tracing::info!("Download tracking: {}", config.tracking);
    let tracker = match config.tracking {
        TrackingMode::Log => DownloadTracker::Log,
        TrackingMode::Sqlite => {
            tracing::info!("Database path: {:?}", config.db_path);
            let pool = db::init_database(&config.db_path).await?;
            DownloadTracker::Persistent(DownloadCounterStore::new(pool))
        }
    };

    let pending_downloads = PendingDownloads::new();

    // Create application state
    let state = AppState {
        catalog,
        tracker: tracker.clone(),
        pending_downloads: pending_downloads.clone(),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Flush in-flight download records even if the server failed
    pending_downloads.wait().await;
    tracker.close().await;
    tracing::info!("Server stopped");

    served?;
    Ok(())
}

/// Resolve on Ctrl+C.
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    tracing::info!("Shutting down...");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Locale-prefixed API routes
    let locale_routes = Router::new()
        .route(
            "/api/resources/{university}",
            get(api::list_university_resources),
        )
        .route("/api/resource/{id}", get(api::get_resource))
        .route("/api/download/{id}", get(api::download_resource));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/{locale}", locale_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
