//! Source adapters, one per OSINT provider.
//!
//! Every adapter turns a keyword into one logical outbound call and maps the
//! provider payload into [`UrlRecord`]s. Response shapes differ wildly (JSON,
//! NDJSON, CSV text, an HTML table) so each adapter owns its parser; what they
//! share is the status mapping and a few hostname helpers below.

pub mod alienvault;
pub mod censys;
pub mod commoncrawl;
pub mod crtsh;
pub mod hackertarget;
pub mod rapiddns;
pub mod shodan;
pub mod urlscan;
pub mod wayback;

use crate::error::SourceError;
use crate::record::UrlRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

const BODY_SNIPPET_LEN: usize = 160;

static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_]([a-z0-9_-]*[a-z0-9_])?(\.[a-z0-9_]([a-z0-9_-]*[a-z0-9_])?)+$")
        .expect("hostname pattern")
});

/// Send a request and return status plus body, without judging the status.
///
/// Transport errors lose their URL: some providers take the API key as a
/// query parameter, and these errors end up in responses and logs.
pub(crate) async fn fetch(request: RequestBuilder) -> Result<(StatusCode, String), SourceError> {
    let response = request.send().await.map_err(|e| e.without_url())?;
    let status = response.status();
    let body = response.text().await.map_err(|e| e.without_url())?;
    Ok((status, body))
}

/// Send a request and return the body of a 2xx response.
pub(crate) async fn fetch_text(request: RequestBuilder) -> Result<String, SourceError> {
    let (status, body) = fetch(request).await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(status_error(status, &body))
    }
}

pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, SourceError> {
    let body = fetch_text(request).await?;
    parse_json(&body)
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse(format!("invalid JSON: {}", e)))
}

/// Map a non-2xx status onto the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &str) -> SourceError {
    let message = body_snippet(body);
    match status.as_u16() {
        401 | 403 => SourceError::Authentication(format!("HTTP {}: {}", status.as_u16(), message)),
        429 => SourceError::RateLimited(format!("HTTP 429: {}", message)),
        code => SourceError::Status {
            status: code,
            message,
        },
    }
}

fn body_snippet(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "empty response body".to_string();
    }
    if collapsed.chars().count() > BODY_SNIPPET_LEN {
        let cut: String = collapsed.chars().take(BODY_SNIPPET_LEN).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}

/// Lowercase, strip a leading wildcard label and trailing dot, and validate.
pub(crate) fn clean_hostname(raw: &str) -> Option<String> {
    let name = raw.trim().trim_end_matches('.').to_lowercase();
    let name = name.strip_prefix("*.").unwrap_or(name.as_str());
    if HOSTNAME_RE.is_match(name) {
        Some(name.to_string())
    } else {
        None
    }
}

/// Record for a bare hostname, addressed over https.
pub(crate) fn host_record(host: &str, source: &str) -> Option<UrlRecord> {
    UrlRecord::new(format!("https://{}", host), host, source)
}
