use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use recon_core::SearchError;
use serde_json::json;

/// Errors a handler turns into a JSON `{"error": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The search task died outside every source adapter.
    #[error("Failed to search URLs")]
    SearchFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Search(_) => StatusCode::BAD_REQUEST,
            ApiError::SearchFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
