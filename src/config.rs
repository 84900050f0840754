// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Which document/blob store pair the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Firestore + Cloud Storage
    Firestore,
    /// Process-local stores; data is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP / Firebase project ID
    pub gcp_project_id: String,
    /// Bucket holding player photos and team crests
    pub storage_bucket: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            storage_bucket: "test-project.appspot.com".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        let gcp_project_id = match (env::var("GCP_PROJECT_ID"), store_backend) {
            (Ok(id), _) => id,
            (Err(_), StoreBackend::Memory) => "local-dev".to_string(),
            (Err(_), StoreBackend::Firestore) => {
                return Err(ConfigError::Missing("GCP_PROJECT_ID"))
            }
        };

        let storage_bucket = env::var("STORAGE_BUCKET")
            .unwrap_or_else(|_| format!("{}.appspot.com", gcp_project_id));

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            gcp_project_id,
            storage_bucket,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port,
            store_backend,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(" Firestore ".parse::<StoreBackend>().unwrap(), StoreBackend::Firestore);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_config_from_env() {
        // Single test touching the environment to avoid races between tests.
        env::set_var("STORE_BACKEND", "memory");
        env::remove_var("GCP_PROJECT_ID");
        env::remove_var("STORAGE_BUCKET");
        env::set_var("PORT", "9090");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.gcp_project_id, "local-dev");
        assert_eq!(config.storage_bucket, "local-dev.appspot.com");
        assert_eq!(config.port, 9090);

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("PORT", _))
        ));

        env::set_var("STORE_BACKEND", "firestore");
        env::set_var("PORT", "8080");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("GCP_PROJECT_ID"))
        ));
    }
}
