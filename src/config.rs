//! Application configuration loaded from environment variables.

use crate::services::recommend::DEFAULT_TOP_N;
use std::env;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Cloud Firestore (or the emulator if FIRESTORE_EMULATOR_HOST is set)
    Firestore,
    /// Process-local store for development; nothing is persisted
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase/GCP project ID; ID tokens must name it as audience
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Cloud Storage bucket for profile pictures
    pub storage_bucket: String,
    pub store_backend: StoreBackend,
    /// HS256 secret for locally minted ID tokens; unset in production
    pub auth_shared_secret: Option<String>,
    /// Limit on the live events query
    pub event_feed_limit: u32,
    /// Public events considered per recommendation request
    pub recommendation_pool: u32,
    /// Recommendations returned by default
    pub recommendation_top_n: usize,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gcp_project_id =
            env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());
        let storage_bucket = env::var("STORAGE_BUCKET")
            .unwrap_or_else(|_| format!("{}.appspot.com", gcp_project_id));

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            storage_bucket,
            store_backend: match env::var("STORE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StoreBackend::Firestore,
            },
            auth_shared_secret: env::var("AUTH_SHARED_SECRET")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            event_feed_limit: parse_var("EVENT_FEED_LIMIT", 50)?,
            recommendation_pool: parse_var("RECOMMENDATION_POOL", 10)?,
            recommendation_top_n: parse_var("RECOMMENDATION_TOP_N", DEFAULT_TOP_N)?,
            gcp_project_id,
        })
    }

    /// Deterministic configuration for tests: in-memory store and a shared
    /// token secret.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            storage_bucket: "test-project.appspot.com".to_string(),
            store_backend: StoreBackend::Memory,
            auth_shared_secret: Some("test_auth_secret_32_bytes_minimum".to_string()),
            event_feed_limit: 50,
            recommendation_pool: 10,
            recommendation_top_n: DEFAULT_TOP_N,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw.clone())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
