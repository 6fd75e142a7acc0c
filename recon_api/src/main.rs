//! recon-api: standalone HTTP server for the recon aggregator.
//!
//! Reads config from env vars:
//!   HOST, PORT, CORS_ORIGINS          see `ServerConfig`
//!   CENSYS_API_ID, CENSYS_API_SECRET  enable the Censys source
//!   SHODAN_API_KEY                    enable the Shodan source
//!   RECON_USER_AGENT                  outbound User-Agent
//!   LOG_FORMAT=json                   JSON log lines

use std::sync::Arc;

use recon_api::{build_router, AppState, ServerConfig};
use recon_core::{build_http_client, build_registry, Credentials};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recon_api=info,recon_core=info,tower_http=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = ServerConfig::from_env()?;
    let credentials = Credentials::from_env();
    let registry = build_registry(&credentials, build_http_client()?);

    let eligible: Vec<&str> = registry.eligible().iter().map(|s| s.name()).collect();
    info!(?credentials, sources = ?eligible, "source registry ready");

    let state = Arc::new(AppState::new(registry));
    let app = build_router(state, &config);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("recon-api listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
