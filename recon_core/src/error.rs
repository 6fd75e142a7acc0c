// src/error.rs
use std::time::Duration;

/// Failure of a single source adapter.
///
/// These never escape the fan-out executor: each one is rendered into a
/// `"<source>: <message>"` string on the search outcome.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Authentication rejected: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl SourceError {
    pub fn code_str(&self) -> &'static str {
        match self {
            SourceError::HttpRequest(e) if e.is_timeout() => "timeout",
            SourceError::Timeout(_) => "timeout",
            SourceError::Authentication(_) => "auth_failed",
            SourceError::RateLimited(_) => "rate_limited",
            SourceError::HttpRequest(_) | SourceError::Status { .. } => "upstream_error",
            SourceError::Parse(_) | SourceError::SerdeJson(_) => "parse_error",
            SourceError::Task(_) | SourceError::Other(_) => "internal_error",
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.code_str() == "timeout"
    }
}

/// Caller-side input errors, raised before any source is contacted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Missing keyword")]
    MissingKeyword,

    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_str() {
        assert_eq!(
            SourceError::Timeout(Duration::from_secs(15)).code_str(),
            "timeout"
        );
        assert_eq!(
            SourceError::Authentication("HTTP 401".into()).code_str(),
            "auth_failed"
        );
        assert_eq!(
            SourceError::Status {
                status: 502,
                message: "bad gateway".into()
            }
            .code_str(),
            "upstream_error"
        );
        assert_eq!(SourceError::Parse("x".into()).code_str(), "parse_error");
    }

    #[test]
    fn test_timeout_message() {
        let err = SourceError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Timeout after 1500ms");
        assert!(err.is_timeout());
    }
}
