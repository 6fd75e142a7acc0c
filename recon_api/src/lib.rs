//! HTTP host for the recon aggregator.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::http::Method;
use axum::{routing::get, Router};
use recon_core::SourceRegistry;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;

pub struct AppState {
    pub registry: Arc<SourceRegistry>,
}

impl AppState {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let threat_intel = Router::new()
        .route("/search", get(handlers::search))
        // Route name the dashboard has always called
        .route("/urlsearch", get(handlers::search))
        .route("/sources", get(handlers::list_sources));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/threat-intel", threat_intel)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(config.cors_origins.clone())
                .allow_methods([Method::GET, Method::OPTIONS]),
        )
        // Method + path only; query strings carry the searched keyword
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
