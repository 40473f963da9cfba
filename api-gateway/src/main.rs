// ==============================================================================
// main.rs - Genetics Upload Gateway Entry Point
// ==============================================================================
// Description: Axum web server for resumable genomic sample uploads
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;
mod handoff;
mod models;
mod state;

use state::AppState;

/// Default request body limit: a chunk plus multipart overhead
const DEFAULT_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genetics_api_gateway=info,genetics_upload=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    info!("Starting Genetics Upload Gateway v2.0.0");

    let server_port: u16 = std::env::var("GATEWAY_PORT")
        .ok()
        .map(|p| p.parse().context("GATEWAY_PORT must be a port number"))
        .transpose()?
        .unwrap_or(8099);

    let body_limit: usize = std::env::var("MAX_CHUNK_BODY")
        .ok()
        .map(|b| b.parse().context("MAX_CHUNK_BODY must be a byte count"))
        .transpose()?
        .unwrap_or(DEFAULT_BODY_LIMIT);

    // Initialize application state (fails fast on an unusable upload root)
    let state = AppState::new()
        .await
        .context("Failed to initialize application state")?;

    // Build router with all endpoints
    let app = build_router(state, body_limit);

    // Bind server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    info!("Upload gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server
    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

fn build_router(state: AppState, body_limit: usize) -> Router {
    // API routes
    let api_routes = Router::new()
        // Resumable upload: status check (GET) and chunk upload (POST)
        .route(
            "/upload",
            get(handlers::check_chunk).post(handlers::upload_chunk),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check));

    // Origins are configured via CORS_ALLOWED_ORIGINS env var (comma-separated)
    let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let allowed_origins: Vec<_> = cors_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_credentials(false)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api/genetics", api_routes)
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                // Request body size limit (one chunk per request)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
