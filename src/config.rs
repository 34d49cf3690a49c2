//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the config directory overrides any
//! subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [endpoint]
//! base_url = "http://localhost:8080/api/"
//! upload_path = "barcode/upload"
//! timeout_secs = 30
//! # auth_token = "..."        # Sent as a bearer token when present
//!
//! [images]
//! max_dimension = 1280       # Longer edge of uploaded images, in pixels
//! quality = 80               # JPEG quality (1-100)
//!
//! [session]
//! settle_delay_ms = 1000     # Pause after a submit before leaving / re-enabling
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ResizeConstraints};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where submissions are sent.
    pub endpoint: EndpointConfig,
    /// Upload image bounds.
    pub images: ImagesConfig,
    /// Submit timing.
    pub session: SessionConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "endpoint.base_url must not be empty".into(),
            ));
        }
        if !(self.endpoint.base_url.starts_with("http://")
            || self.endpoint.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "endpoint.base_url must start with http:// or https://".into(),
            ));
        }
        if self.endpoint.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "endpoint.timeout_secs must be positive".into(),
            ));
        }
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.images.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "images.max_dimension must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Upload endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointConfig {
    /// API root, e.g. `https://api.example.com/v1/`.
    pub base_url: String,
    /// Path of the upload endpoint, relative to `base_url`.
    pub upload_path: String,
    /// Whole-request timeout. A timeout surfaces as a transport failure.
    pub timeout_secs: u64,
    /// Bearer token for the current user, if the endpoint requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Placeholder values for a local development server; deployments set `[endpoint]`.
impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/".to_string(),
            upload_path: "barcode/upload".to_string(),
            timeout_secs: 30,
            auth_token: None,
        }
    }
}

impl EndpointConfig {
    /// Join `base_url` and `upload_path` with exactly one slash between them.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.upload_path.trim_start_matches('/')
        )
    }
}

/// Upload image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Longer edge of an uploaded image, in pixels.
    pub max_dimension: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        let constraints = ResizeConstraints::default();
        Self {
            max_dimension: constraints.max_dimension,
            quality: constraints.quality.value(),
        }
    }
}

impl ImagesConfig {
    pub fn constraints(&self) -> ResizeConstraints {
        ResizeConstraints {
            max_dimension: self.max_dimension,
            quality: Quality::new(self.quality),
        }
    }
}

/// Submit timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// How long the success/failure notice stays up before the session
    /// navigates away or re-enables submitting.
    pub settle_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
        }
    }
}

impl SessionConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if there is no `config.toml` in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-submit configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Upload endpoint
# ---------------------------------------------------------------------------
[endpoint]
# API root. The upload path is appended to it.
base_url = "http://localhost:8080/api/"

# Path of the multipart upload endpoint, relative to base_url.
upload_path = "barcode/upload"

# Whole-request timeout in seconds.
timeout_secs = 30

# Bearer token sent with every upload, if the endpoint requires one.
# auth_token = "..."

# ---------------------------------------------------------------------------
# Upload images
# ---------------------------------------------------------------------------
[images]
# Longer edge of every uploaded image, in pixels. Smaller images are not
# upscaled.
max_dimension = 1280

# JPEG quality (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Submit timing
# ---------------------------------------------------------------------------
[session]
# Milliseconds the result notice stays up before leaving (on success) or
# re-enabling submit (on failure).
settle_delay_ms = 1000
"##
}
