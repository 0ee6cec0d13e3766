// Paperdesk - document Q&A and spreadsheet review backend

pub mod config;
pub mod extract;
pub mod grid;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod sheets;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
