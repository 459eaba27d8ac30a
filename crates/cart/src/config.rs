//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GO_MARKETPLACE_STORAGE_DIR` - Directory for the file-backed store (default: `.go-marketplace`)
//! - `GO_MARKETPLACE_CART_KEY` - Storage key for the cart snapshot (default: `@GoMarketplace:products`)

use std::path::PathBuf;

use thiserror::Error;

/// Storage key the cart snapshot lives under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "@GoMarketplace:products";

/// Storage directory used unless configured otherwise.
pub const DEFAULT_STORAGE_DIR: &str = ".go-marketplace";

const STORAGE_DIR_VAR: &str = "GO_MARKETPLACE_STORAGE_DIR";
const CART_KEY_VAR: &str = "GO_MARKETPLACE_CART_KEY";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory holding file-backed storage
    pub storage_dir: PathBuf,
    /// Key the cart snapshot is stored under
    pub cart_key: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            cart_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = non_empty(STORAGE_DIR_VAR, lookup(STORAGE_DIR_VAR))?
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);
        let cart_key = non_empty(CART_KEY_VAR, lookup(CART_KEY_VAR))?
            .unwrap_or_else(|| DEFAULT_CART_KEY.to_string());

        Ok(Self {
            storage_dir,
            cart_key,
        })
    }

    /// Use a different storage key.
    #[must_use]
    pub fn with_cart_key(mut self, key: impl Into<String>) -> Self {
        self.cart_key = key.into();
        self
    }

    /// Use a different storage directory.
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }
}

fn non_empty(name: &str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "must not be empty".to_string(),
        )),
        other => Ok(other),
    }
}
