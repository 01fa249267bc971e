//! Runtime configuration from environment variables

use std::env;
use std::path::PathBuf;

use crate::llm::client::DEFAULT_BASE_URL;

/// Model requested when none is configured
pub const DEFAULT_MODEL: &str = "reka-flash-research";

/// Server configuration, sourced from the environment (`.env` supported)
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API key (`REKA_API_KEY`); may be empty, in which case the
    /// upstream will reject calls
    pub api_key: String,
    /// Upstream base URL (`REKA_BASE_URL`)
    pub base_url: String,
    /// Model requested for completions (`REKA_MODEL`)
    pub model: String,
    /// SQLite storage file (`RESEARCH_DB_PATH`)
    pub db_path: PathBuf,
    /// HTTP listen port (`PORT`)
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("REKA_API_KEY").unwrap_or_default(),
            base_url: env::var("REKA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("REKA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            db_path: env::var("RESEARCH_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("research.db")),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(5000),
        }
    }
}
