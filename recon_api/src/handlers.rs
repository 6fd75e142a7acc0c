//! Route handlers.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use recon_core::federated::normalize_keyword;
use recon_core::{FederatedSearch, SearchError, SearchOutcome, SourceInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    /// Comma-separated source tags; absent means every eligible source
    pub sources: Option<String>,
}

/// `GET /api/threat-intel/search?keyword=...[&sources=a,b]`
///
/// A query string that does not deserialize (e.g. a repeated `keyword`) is
/// answered the same as a missing keyword.
pub async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        debug!(error = %rejection, "query string rejected");
        SearchError::MissingKeyword
    })?;
    let keyword = normalize_keyword(params.keyword.as_deref())?;
    let names: Vec<String> = params
        .sources
        .as_deref()
        .map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    info!(keyword = %keyword, sources = ?names, "url search");

    // Fan-out, merge and assembly run on their own task; a panic there is a 500.
    let registry = Arc::clone(&state.registry);
    let task = tokio::spawn(async move {
        let report = FederatedSearch::new(&registry)
            .search_adhoc(&keyword, &names)
            .await?;
        Ok::<_, SearchError>(report.into_outcome())
    });

    match task.await {
        Ok(outcome) => Ok(Json(outcome?)),
        Err(e) => {
            error!(error = %e, "search task failed");
            Err(ApiError::SearchFailed)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub count: usize,
    pub sources: Vec<SourceInfo>,
}

/// `GET /api/threat-intel/sources`
pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<SourcesResponse> {
    let sources = state.registry.list();
    Json(SourcesResponse {
        count: sources.len(),
        sources,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
