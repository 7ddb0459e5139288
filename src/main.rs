// =============================================================================
// ASSET CONSOLE - Main Entry Point
// =============================================================================
// This is the main entry point for the asset console API.
//
// WHAT THIS SERVICE DOES:
// - Serves the console's list views (products, serials, transactions, users)
//   with search, filters, sorting and page-number navigation
// - Validates user forms and guards them against double submission
// - Approves/rejects borrow requests and manages master data
// - Caches master-data lists in Redis
// - Exposes Prometheus metrics for observability
//
// LEARNING GOALS:
// - Keep the list logic in a pure library crate, the HTTP glue in the binary
// - Learn Axum web framework patterns
// - See how Prometheus metrics work in Rust
// =============================================================================

// -----------------------------------------------------------------------------
// MODULE DECLARATIONS
// -----------------------------------------------------------------------------
// The domain types and list pipeline live in the library (src/lib.rs) and
// are imported as `asset_console::...`. These modules are binary-only.
mod config;      // Configuration loading (config.rs)
mod db;          // Backend access (db.rs)
mod error;       // Error types (error.rs)
mod handlers;    // HTTP request handlers (handlers.rs)
mod metrics;     // Prometheus metrics setup (metrics.rs)

// -----------------------------------------------------------------------------
// IMPORTS (use statements)
// -----------------------------------------------------------------------------
use axum::{
    routing::{delete, get, post, put},
    Router,
};

use std::sync::Arc;

// Tower-HTTP provides common HTTP middleware
use tower_http::{
    cors::{Any, CorsLayer},  // CORS handling
    trace::TraceLayer,        // Request tracing/logging
};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asset_console::submit_lock::SubmitLocks;

use crate::config::Config;
use crate::db::Backend;
use crate::metrics::setup_metrics;

// -----------------------------------------------------------------------------
// APPLICATION STATE
// -----------------------------------------------------------------------------
// Shared by all request handlers through Arc.
//
// LEARNING NOTE:
// SubmitLocks holds one lock per user being submitted, so two admins saving
// different users never block each other. It is the only mutable state the
// handlers share.
pub struct AppState {
    // Backend connection pool (views + stored procedures)
    pub db: Backend,

    // Redis connection for the master-data cache
    pub redis: redis::aio::ConnectionManager,

    // Prometheus metrics handle
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,

    pub config: Config,

    // In-flight user form submissions, keyed by email (create) or id (edit)
    pub user_form_locks: SubmitLocks,
}

// -----------------------------------------------------------------------------
// MAIN FUNCTION
// -----------------------------------------------------------------------------
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -------------------------------------------------------------------------
    // STEP 1: Load environment variables
    // -------------------------------------------------------------------------
    dotenvy::dotenv().ok();  // .ok() ignores errors (file might not exist)

    // -------------------------------------------------------------------------
    // STEP 2: Initialize logging/tracing
    // -------------------------------------------------------------------------
    // Example: RUST_LOG=info,asset_console=debug
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,asset_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting asset console API...");

    // -------------------------------------------------------------------------
    // STEP 3: Load configuration
    // -------------------------------------------------------------------------
    let config = Config::from_env()?;
    info!(
        port = config.port,
        default_page_size = config.default_page_size,
        low_stock_threshold = config.low_stock_threshold,
        "Configuration loaded"
    );

    // -------------------------------------------------------------------------
    // STEP 4: Set up Prometheus metrics
    // -------------------------------------------------------------------------
    let metrics_handle = setup_metrics()?;
    info!("Prometheus metrics initialized");

    // -------------------------------------------------------------------------
    // STEP 5: Connect to the backend
    // -------------------------------------------------------------------------
    // The backend owns its schema; nothing is migrated from here.
    let db = Backend::connect(&config.database_url).await?;
    info!("Connected to backend database");

    // -------------------------------------------------------------------------
    // STEP 6: Connect to Redis
    // -------------------------------------------------------------------------
    // ConnectionManager handles reconnection automatically
    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;
    info!("Connected to Redis");

    // -------------------------------------------------------------------------
    // STEP 7: Create application state
    // -------------------------------------------------------------------------
    let port = config.port;
    let state = Arc::new(AppState {
        db,
        redis: redis_conn,
        metrics_handle,
        config,
        user_form_locks: SubmitLocks::new(),
    });

    // -------------------------------------------------------------------------
    // STEP 8: Define routes
    // -------------------------------------------------------------------------
    let app = Router::new()
        // ----- Health & Readiness Endpoints -----
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))

        // ----- Metrics Endpoint -----
        .route("/metrics", get(handlers::metrics_handler))

        // ----- List views -----
        .route("/api/v1/products", get(handlers::list_products))
        .route("/api/v1/products/low-stock", get(handlers::low_stock_products))
        .route("/api/v1/serials", get(handlers::list_serials))
        .route("/api/v1/transactions", get(handlers::list_transactions))

        // ----- Borrow workflow -----
        .route(
            "/api/v1/transactions/:id/approve",
            post(handlers::approve_transaction),
        )
        .route(
            "/api/v1/transactions/:id/reject",
            post(handlers::reject_transaction),
        )

        // ----- Users -----
        .route(
            "/api/v1/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/v1/users/password-strength",
            post(handlers::password_strength),
        )
        .route("/api/v1/users/:id", put(handlers::update_user))

        // ----- Master data -----
        .route(
            "/api/v1/master/:kind",
            get(handlers::list_master).post(handlers::create_master),
        )
        .route(
            "/api/v1/master/:kind/:id",
            delete(handlers::delete_master),
        )

        // ----- Middleware Layers -----
        .layer(
            CorsLayer::new()
                .allow_origin(Any)  // Allow any origin (configure for production!)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // -------------------------------------------------------------------------
    // STEP 9: Start the HTTP server
    // -------------------------------------------------------------------------
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(address = %addr, "Asset console API is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
