//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup; a `.env` file is honored for local
//! development.

use std::env;
use std::path::PathBuf;

/// Connection string that selects the in-memory store instead of MongoDB.
pub const MEMORY_STORE_URI: &str = "memory://";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,

    // --- Storage ---
    /// MongoDB connection string (`memory://` for the in-memory store)
    pub mongo_uri: String,
    /// Database name
    pub db_name: String,
    /// Wrap follow/unfollow writes in a transaction (needs a replica set)
    pub mongo_transactions: bool,
    /// Directory holding uploaded images
    pub upload_dir: PathBuf,
    /// Body limit for multipart requests
    pub max_upload_bytes: usize,

    // --- Secrets ---
    /// JWT signing key for bearer tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Bearer token lifetime in seconds
    pub token_ttl_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 5000,
            frontend_url: "http://localhost:5173".to_string(),
            mongo_uri: MEMORY_STORE_URI.to_string(),
            db_name: "mini-social-test".to_string(),
            mongo_transactions: false,
            upload_dir: env::temp_dir().join("mini-social-uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            token_ttl_secs: 3600,
        }
    }
}

impl Config {
    /// Fixed configuration used by tests.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_or("PORT", 5000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            mongo_uri: env::var("MONGO_URI")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("MONGO_URI"))?,
            db_name: env::var("DB_NAME").unwrap_or_else(|_| "mini-social-app".to_string()),
            mongo_transactions: parse_or("MONGO_TRANSACTIONS", false),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),

            jwt_signing_key: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            token_ttl_secs: parse_or("TOKEN_TTL_SECS", 3600),
        })
    }

    /// Whether the configured store is the in-memory one.
    pub fn uses_memory_store(&self) -> bool {
        self.mongo_uri == MEMORY_STORE_URI
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
