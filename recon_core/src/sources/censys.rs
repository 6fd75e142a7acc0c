/// Censys hosts search source
///
/// Hosts whose HTTP response title or body contains the keyword. Each HTTP
/// service becomes `scheme://ip:port`; records are keyed on `ip:port` so the
/// same service is never listed under both schemes.
/// Requires `CENSYS_API_ID` and `CENSYS_API_SECRET` (HTTP Basic).
///
/// API: https://search.censys.io/api/v2/hosts/search?q=...&per_page=50
use super::fetch_json;
use crate::config::{CredentialField, CENSYS_API_ID, CENSYS_API_SECRET};
use crate::error::SourceError;
use crate::record::{RecordSet, UrlRecord};
use crate::{Source, SourceCategory};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const ENDPOINT: &str = "https://search.censys.io/api/v2/hosts/search";
const PER_PAGE: usize = 50;

const CREDENTIALS: &[CredentialField] = &[
    CredentialField {
        env: CENSYS_API_ID,
    },
    CredentialField {
        env: CENSYS_API_SECRET,
    },
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<HostHit>,
}

#[derive(Debug, Deserialize)]
struct HostHit {
    ip: String,
    #[serde(default)]
    services: Vec<HostService>,
}

#[derive(Debug, Deserialize)]
struct HostService {
    port: u16,
    #[serde(default)]
    service_name: Option<String>,
    #[serde(default)]
    extended_service_name: Option<String>,
}

impl HostService {
    fn is_http(&self) -> bool {
        self.service_name
            .as_deref()
            .map(|n| n.eq_ignore_ascii_case("http"))
            .unwrap_or(false)
    }

    fn scheme(&self) -> &'static str {
        let tls = self
            .extended_service_name
            .as_deref()
            .map(|n| n.eq_ignore_ascii_case("https"))
            .unwrap_or(false);
        if tls || self.port == 443 {
            "https"
        } else {
            "http"
        }
    }

    fn label(&self) -> Option<&str> {
        self.extended_service_name
            .as_deref()
            .or(self.service_name.as_deref())
    }
}

pub struct CensysSource {
    client: Client,
    endpoint: String,
    api_id: Option<String>,
    api_secret: Option<String>,
}

impl CensysSource {
    pub fn new(client: Client, api_id: Option<String>, api_secret: Option<String>) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            client,
            endpoint: ENDPOINT.to_string(),
            api_id: non_blank(api_id),
            api_secret: non_blank(api_secret),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn collect(&self, response: SearchResponse) -> Vec<UrlRecord> {
        let hits = response.result.map(|r| r.hits).unwrap_or_default();
        let mut records = RecordSet::new();

        for hit in hits.into_iter().take(PER_PAGE) {
            let ip = hit.ip.trim();
            if ip.is_empty() {
                continue;
            }
            // IPv6 literals need brackets before a port can follow
            let host = if ip.contains(':') {
                format!("[{}]", ip)
            } else {
                ip.to_string()
            };
            for service in hit.services.iter().filter(|s| s.is_http()) {
                let url = format!("{}://{}:{}", service.scheme(), host, service.port);
                let Some(mut record) = UrlRecord::new(url, ip, self.name()) else {
                    continue;
                };
                if let Some(label) = service.label() {
                    record = record.with_info(label);
                }
                records.push_keyed(format!("{}:{}", host, service.port), record);
            }
        }

        records.into_records()
    }
}

fn build_query(keyword: &str) -> String {
    let escaped = keyword.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "services.http.response.html_title: \"{0}\" or services.http.response.body: \"{0}\"",
        escaped
    )
}

#[async_trait]
impl Source for CensysSource {
    fn name(&self) -> &'static str {
        "censys"
    }

    fn description(&self) -> &'static str {
        "Censys hosts search over HTTP titles and bodies (requires Censys API ID and secret)"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::HostScan
    }

    fn required_credentials(&self) -> &'static [CredentialField] {
        CREDENTIALS
    }

    fn is_configured(&self) -> bool {
        self.api_id.is_some() && self.api_secret.is_some()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(25)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<UrlRecord>, SourceError> {
        let (Some(api_id), Some(api_secret)) = (&self.api_id, &self.api_secret) else {
            return Err(SourceError::Authentication(format!(
                "{} and {} must both be set",
                CENSYS_API_ID, CENSYS_API_SECRET
            )));
        };

        let query = build_query(keyword);
        let per_page = PER_PAGE.to_string();
        let request = self
            .client
            .get(&self.endpoint)
            .basic_auth(api_id, Some(api_secret))
            .query(&[("q", query.as_str()), ("per_page", per_page.as_str())]);

        let response: SearchResponse = fetch_json(request).await?;
        Ok(self.collect(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federated::execute_search;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn source() -> CensysSource {
        CensysSource::new(Client::new(), Some("id".into()), Some("secret".into()))
    }

    #[test]
    fn test_configured_needs_both_values() {
        assert!(source().is_configured());
        assert!(!CensysSource::new(Client::new(), Some("id".into()), None).is_configured());
        assert!(!CensysSource::new(Client::new(), Some("id".into()), Some("".into())).is_configured());
    }

    #[test]
    fn test_query_escapes_quotes() {
        assert_eq!(
            build_query(r#"acme "login""#),
            r#"services.http.response.html_title: "acme \"login\"" or services.http.response.body: "acme \"login\"""#
        );
    }

    #[test]
    fn test_collect_http_services() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"code": 200, "status": "OK", "result": {"total": 2, "hits": [
                {"ip": "203.0.113.7", "services": [
                    {"port": 80, "service_name": "HTTP", "transport_protocol": "TCP"},
                    {"port": 443, "service_name": "HTTP", "extended_service_name": "HTTPS"},
                    {"port": 22, "service_name": "SSH"},
                    {"port": 80, "service_name": "HTTP"}
                ]},
                {"ip": "198.51.100.2", "services": [
                    {"port": 8443, "service_name": "HTTP", "extended_service_name": "HTTPS"}
                ]}
            ]}}"#,
        )
        .unwrap();

        let records = source().collect(response);
        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://203.0.113.7:80",
                "https://203.0.113.7:443",
                "https://198.51.100.2:8443"
            ]
        );
        assert_eq!(records[0].domain, "203.0.113.7");
        assert_eq!(records[0].info.as_deref(), Some("HTTP"));
        assert_eq!(records[1].info.as_deref(), Some("HTTPS"));
    }

    #[test]
    fn test_ipv6_hosts_are_bracketed() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"result": {"hits": [
                {"ip": "2001:db8::1", "services": [
                    {"port": 80, "service_name": "HTTP"},
                    {"port": 443, "service_name": "HTTP", "extended_service_name": "HTTPS"}
                ]}
            ]}}"#,
        )
        .unwrap();

        let records = source().collect(response);
        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["http://[2001:db8::1]:80", "https://[2001:db8::1]:443"]);
        assert_eq!(records[0].domain, "[2001:db8::1]");
    }

    #[tokio::test]
    async fn test_rejected_credentials_surface_as_auth_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            let request = String::from_utf8_lossy(&buf[..read]).to_string();
            let body = r#"{"code": 401, "status": "Unauthorized", "error": "Invalid API ID or secret"}"#;
            let response = format!(
                "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            request
        });

        let source: Arc<dyn Source> = Arc::new(
            CensysSource::new(Client::new(), Some("id".into()), Some("wrong".into()))
                .with_endpoint(format!("http://{}/api/v2/hosts/search", addr)),
        );
        let report = execute_search("acme", vec![source]).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, "auth_failed");

        let errors = report.into_outcome().errors.unwrap();
        assert_eq!(
            errors,
            vec![
                r#"censys: Authentication rejected: HTTP 401: {"code": 401, "status": "Unauthorized", "error": "Invalid API ID or secret"}"#
                    .to_string()
            ]
        );

        let request = server.await.unwrap().to_lowercase();
        assert!(request.contains("authorization: basic "));
    }

    #[test]
    fn test_missing_result_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"code": 200}"#).unwrap();
        assert!(source().collect(response).is_empty());
    }
}
