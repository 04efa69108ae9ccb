//! # Checkout Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILLPOINT_BUSINESS_ID=corner-cafe                                  │
//! │     TILLPOINT_DB_PATH=/var/lib/tillpoint/tillpoint.db                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tillpoint/checkout.toml (Linux)                          │
//! │     ~/Library/Application Support/com.tillpoint.checkout/ (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! business_id = "corner-cafe"
//! user_id = "cashier-1"
//! name = "Corner Cafe"
//!
//! [checkout]
//! split_slots = 2
//! step_timeout_ms = 5000
//! settlement_retries = 3
//! settlement_initial_backoff_ms = 200
//! settlement_max_backoff_ms = 2000
//!
//! [database]
//! path = "/var/lib/tillpoint/tillpoint.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use tillpoint_core::validation::{
    validate_business_id, validate_split_slots, validate_user_id, MIN_SPLIT_SLOTS,
};
use tillpoint_core::ValidationError;
use tillpoint_db::DbConfig;

use crate::pipeline::{PipelineSettings, RetryPolicy};

const DEFAULT_DB_FILE: &str = "tillpoint.db";
const CONFIG_FILE: &str = "checkout.toml";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Who is selling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Tenant boundary for catalog, sequence and payment methods.
    #[serde(default = "default_business_id")]
    pub business_id: String,

    /// Operator recorded on sales.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Display name (receipts, logs).
    #[serde(default = "default_store_name")]
    pub name: String,
}

/// Pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Slots offered in split mode.
    #[serde(default = "default_split_slots")]
    pub split_slots: usize,

    /// Limit for each lookup, numbering, persistence and decrement call.
    #[serde(default = "default_step_timeout")]
    pub step_timeout_ms: u64,

    /// Extra settlement rounds after the first.
    #[serde(default = "default_settlement_retries")]
    pub settlement_retries: u32,

    #[serde(default = "default_initial_backoff")]
    pub settlement_initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub settlement_max_backoff_ms: u64,
}

/// Where the ledger lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_business_id() -> String {
    "demo-business".to_string()
}
fn default_user_id() -> String {
    "cashier".to_string()
}
fn default_store_name() -> String {
    "Tillpoint Demo Store".to_string()
}
fn default_split_slots() -> usize {
    MIN_SPLIT_SLOTS
}
fn default_step_timeout() -> u64 {
    5000
}
fn default_settlement_retries() -> u32 {
    3
}
fn default_initial_backoff() -> u64 {
    200
}
fn default_max_backoff() -> u64 {
    2000
}
fn default_max_connections() -> u32 {
    5
}
fn default_busy_timeout() -> u64 {
    5000
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            business_id: default_business_id(),
            user_id: default_user_id(),
            name: default_store_name(),
        }
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            split_slots: default_split_slots(),
            step_timeout_ms: default_step_timeout(),
            settlement_retries: default_settlement_retries(),
            settlement_initial_backoff_ms: default_initial_backoff(),
            settlement_max_backoff_ms: default_max_backoff(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`checkout.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections fall back to defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Checkout config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_business_id(&self.store.business_id)?;
        validate_user_id(&self.store.user_id)?;
        validate_split_slots(self.checkout.split_slots)?;

        if self.checkout.step_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "step_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.checkout.settlement_initial_backoff_ms > self.checkout.settlement_max_backoff_ms {
            return Err(ConfigError::Invalid(
                "settlement_initial_backoff_ms must not exceed settlement_max_backoff_ms".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `TILLPOINT_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("TILLPOINT_BUSINESS_ID") {
            debug!(business_id = %id, "Overriding business ID from environment");
            self.store.business_id = id;
        }

        if let Some(id) = lookup("TILLPOINT_USER_ID") {
            self.store.user_id = id;
        }

        if let Some(name) = lookup("TILLPOINT_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(path) = lookup("TILLPOINT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(slots) = lookup("TILLPOINT_SPLIT_SLOTS") {
            match slots.parse::<usize>() {
                Ok(n) => self.checkout.split_slots = n,
                Err(_) => warn!(value = %slots, "Ignoring non-numeric TILLPOINT_SPLIT_SLOTS"),
            }
        }

        if let Some(ms) = lookup("TILLPOINT_STEP_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(n) => self.checkout.step_timeout_ms = n,
                Err(_) => warn!(value = %ms, "Ignoring non-numeric TILLPOINT_STEP_TIMEOUT_MS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tillpoint", "checkout")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Database file: configured path, else the platform data directory.
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("com", "tillpoint", "checkout")
                .map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
        })
    }

    /// Pool configuration for [`tillpoint_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }

    /// Settings for [`crate::CheckoutPipeline`].
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            business_id: self.store.business_id.clone(),
            user_id: self.store.user_id.clone(),
            split_slots: self.checkout.split_slots,
            step_timeout: Duration::from_millis(self.checkout.step_timeout_ms),
            settlement_retry: RetryPolicy {
                max_retries: self.checkout.settlement_retries,
                initial_backoff: Duration::from_millis(self.checkout.settlement_initial_backoff_ms),
                max_backoff: Duration::from_millis(self.checkout.settlement_max_backoff_ms),
            },
        }
    }
}
