//! Environment-sourced configuration for the source adapters.

use crate::error::ConfigError;
use serde::Serialize;
use std::env;
use std::time::Duration;

pub const CENSYS_API_ID: &str = "CENSYS_API_ID";
pub const CENSYS_API_SECRET: &str = "CENSYS_API_SECRET";
pub const SHODAN_API_KEY: &str = "SHODAN_API_KEY";
pub const USER_AGENT_VAR: &str = "RECON_USER_AGENT";

pub const DEFAULT_USER_AGENT: &str = concat!("recon_core/", env!("CARGO_PKG_VERSION"));

/// Provider credentials. An empty value is the same as an absent one.
#[derive(Clone, Default)]
pub struct Credentials {
    pub censys_api_id: Option<String>,
    pub censys_api_secret: Option<String>,
    pub shodan_api_key: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self {
            censys_api_id: non_empty_env(CENSYS_API_ID),
            censys_api_secret: non_empty_env(CENSYS_API_SECRET),
            shodan_api_key: non_empty_env(SHODAN_API_KEY),
        }
    }

    pub fn with_censys(mut self, api_id: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.censys_api_id = non_empty(api_id.into());
        self.censys_api_secret = non_empty(api_secret.into());
        self
    }

    pub fn with_shodan(mut self, api_key: impl Into<String>) -> Self {
        self.shodan_api_key = non_empty(api_key.into());
        self
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("censys_api_id", &mask(&self.censys_api_id))
            .field("censys_api_secret", &mask(&self.censys_api_secret))
            .field("shodan_api_key", &mask(&self.shodan_api_key))
            .finish()
    }
}

/// A credential a source needs before it becomes eligible.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CredentialField {
    /// Environment variable the value is read from
    pub env: &'static str,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(non_empty)
}

/// Shared outbound client. Per-source deadlines are applied by the executor,
/// so only the connect phase is bounded here.
pub fn build_http_client() -> Result<reqwest::Client, ConfigError> {
    let user_agent = non_empty_env(USER_AGENT_VAR).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}
