//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/documents` - Document upload, extraction and Q&A
//! - `/api/worksheets` - Tabular review grid and remote sync
//! - `/api/health` - Health checks
//! - `/` - The web UI

pub mod documents;
pub mod health;
pub mod ui;
pub mod worksheets;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
///
/// API routes are prefixed with `/api/`; the UI is served from `/`.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let api_router = Router::new()
        .merge(documents::router(state.clone()))
        .merge(worksheets::router(state.clone()))
        .merge(health::router(state.clone()));

    Router::new()
        .merge(api_router)
        .merge(ui::router())
        .layer(cors_layer(&state.config.server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}
