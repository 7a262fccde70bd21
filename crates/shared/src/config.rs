//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Signature workflow configuration.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection before giving up.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

/// Status codes the signature workflow transitions between.
///
/// The codes are keys into the externally seeded `document_statuses`
/// table. They are configurable so a deployment whose lookup table uses
/// different spellings does not need a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowConfig {
    /// Code of the state a document must be in to be signed or rejected.
    #[serde(default = "default_pending_code")]
    pub pending_status_code: String,
    /// Code of the terminal success state.
    #[serde(default = "default_signed_code")]
    pub signed_status_code: String,
    /// Code of the terminal rejection state.
    #[serde(default = "default_rejected_code")]
    pub rejected_status_code: String,
}

fn default_pending_code() -> String {
    "pending_signature".to_string()
}

fn default_signed_code() -> String {
    "signed".to_string()
}

fn default_rejected_code() -> String {
    "signature_rejected".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pending_status_code: default_pending_code(),
            signed_status_code: default_signed_code(),
            rejected_status_code: default_rejected_code(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CHANCERY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
