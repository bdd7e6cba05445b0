//! HTTP route handlers for the catalog backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/health              - Readiness probe ("ok")
//!
//! # Catalog feed (JSON)
//! GET  /api/products            - Full catalog
//! GET  /api/products/featured   - Bestsellers and new arrivals
//! GET  /api/products/{id}       - Product detail (404 when unknown)
//! GET  /api/categories/{slug}   - Category listing ("all" lists everything)
//! GET  /api/search?q=           - Catalog search (empty query lists nothing)
//! ```

pub mod products;
pub mod search;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the backend router.
///
/// CORS is permissive so a browser shell on another origin can poll the
/// readiness endpoint and read the feed.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/products", get(products::index))
        .route("/api/products/featured", get(products::featured))
        .route("/api/products/{id}", get(products::show))
        .route("/api/categories/{slug}", get(products::category))
        .route("/api/search", get(search::search))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Readiness endpoint polled by the connectivity gate.
///
/// Returns "ok" once the catalog is loaded and the server is accepting
/// connections.
async fn health() -> &'static str {
    "ok"
}
