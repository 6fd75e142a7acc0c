pub mod search;
pub mod sources;

use recon_core::{build_http_client, build_registry, Credentials, SourceRegistry};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Search(#[from] recon_core::SearchError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] recon_core::ConfigError),

    #[error("Search task failed: {0}")]
    Task(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Registry of all sources, gated by credentials from the environment.
pub fn create_registry() -> Result<SourceRegistry> {
    let client = build_http_client()?;
    Ok(build_registry(&Credentials::from_env(), client))
}

/// Split a `-s a,b` list into trimmed, non-empty names.
pub fn parse_source_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
