//! # Catalog HTTP API Module
//!
//! The axum server that hosts the table catalog for the diagram viewer.
//!
//! ## Endpoints
//!
//! - `GET /erd_tables.json` - The catalog JSON (file passthrough)
//! - `GET /health` - Health check
//!
//! The catalog endpoint never fails: a missing or unreadable catalog file is
//! served as `{"tables": []}`, which the reconciler treats as an empty
//! catalog. The viewer runs on a different origin, so CORS is on.
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `ERDVIEW_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*"
//!   for all (default: the local viewer dev origins)

pub mod client;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use erdview_core::ErdError;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: where the catalog file lives.
#[derive(Clone)]
pub struct AppState {
    /// Path of the catalog JSON file to serve.
    pub tables_path: Arc<PathBuf>,
}

impl AppState {
    /// Create new app state for a catalog file.
    #[must_use]
    pub fn new(tables_path: PathBuf) -> Self {
        Self {
            tables_path: Arc::new(tables_path),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from environment configuration.
///
/// Reads `ERDVIEW_CORS_ORIGINS`:
/// - If "*": allows all origins (development mode)
/// - If not set: defaults to the local viewer dev-server origins
/// - Otherwise: parses a comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("ERDVIEW_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (ERDVIEW_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in ERDVIEW_CORS_ORIGINS, defaulting to viewer origins"
                );
                build_viewer_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => build_viewer_cors(),
    }
}

/// Restrictive CORS layer allowing only the local viewer dev origins.
fn build_viewer_cors() -> CorsLayer {
    let viewer_origins = vec![
        "http://localhost:5173".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:5173".parse::<HeaderValue>().ok(),
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = viewer_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            service: "erdview",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Serve the catalog file.
///
/// Always 200: the viewer's reconciler handles an empty catalog gracefully,
/// so a missing or unreadable file degrades to `{"tables": []}` instead of
/// surfacing a server error.
pub async fn tables_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = match tokio::fs::read_to_string(state.tables_path.as_ref()).await {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!(
                "catalog file {:?} not served ({}), returning empty catalog",
                state.tables_path,
                e
            );
            r#"{"tables": []}"#.to_string()
        }
    };

    (
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        body,
    )
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/erd_tables.json", get(tables_handler))
        .route("/health", get(health_handler))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the catalog HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), ErdError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ErdError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("erdview catalog server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| ErdError::Io(format!("Server error: {}", e)))
}
