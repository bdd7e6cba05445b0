//! Oakmint Storefront - catalog backend.
//!
//! This binary serves the readiness endpoint polled by the connectivity gate
//! and the read-only catalog feed, on port 5000 by default.
//!
//! # Architecture
//!
//! - Axum web framework, JSON only
//! - Catalog loaded once at startup (bundled dataset or `STOREFRONT_CATALOG_PATH`)
//! - No database and no writes; cart and wallet state live in the client session

#![cfg_attr(not(test), forbid(unsafe_code))]

use oakmint_storefront::catalog::Catalog;
use oakmint_storefront::config::StorefrontConfig;
use oakmint_storefront::state::AppState;
use oakmint_storefront::{routes, telemetry};

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config.sentry);

    telemetry::init_tracing("oakmint_storefront=info,tower_http=debug");

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path),
        None => Catalog::bundled(),
    }
    .expect("Failed to load catalog");
    tracing::info!(products = catalog.len(), "Catalog loaded");

    let addr = config.socket_addr();
    let state = AppState::new(config, catalog);

    let app = routes::router(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
