// crates/formgate-config/src/config.rs
// ============================================================================
// Module: Formgate Configuration
// Description: Configuration loading and validation for Formgate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: formgate-core, formgate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. Every load validates the
//! parsed document before returning it; range checks keep the dedup window,
//! score threshold, and timeouts inside safe bounds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use formgate_core::DEFAULT_DEDUP_WINDOW_MS;
use formgate_core::DEFAULT_REGEX_SIZE_LIMIT;
use formgate_core::EngineConfig;
use formgate_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "formgate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "FORMGATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Minimum allowed dedup window in milliseconds.
pub(crate) const MIN_DEDUP_WINDOW_MS: u64 = 1_000;
/// Maximum allowed dedup window in milliseconds.
pub(crate) const MAX_DEDUP_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;
/// Maximum allowed regex size budget in bytes.
pub(crate) const MAX_REGEX_SIZE_LIMIT: usize = 10 * 1024 * 1024;
/// Minimum allowed collaborator timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum allowed collaborator timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file exceeded the size limit.
    #[error("config file too large: {actual} bytes (max {max})")]
    TooLarge {
        /// Maximum allowed bytes.
        max: usize,
        /// Actual file size in bytes.
        actual: usize,
    },
    /// Config file failed to parse.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Canonical Formgate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormgateConfig {
    /// Durable store settings.
    pub store: SqliteStoreConfig,
    /// Engine limit settings.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Anti-abuse verification settings.
    #[serde(default)]
    pub anti_abuse: AntiAbuseConfig,
    /// Notification delivery settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl FormgateConfig {
    /// Loads configuration from the given path, the `FORMGATE_CONFIG`
    /// environment variable, or `formgate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => env::var(CONFIG_ENV_VAR)
                .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from),
        };
        let metadata = fs::metadata(&path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                max: MAX_CONFIG_FILE_SIZE,
                actual: size,
            });
        }
        let raw = fs::read_to_string(&path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_toml(&raw)
    }

    /// Parses and validates configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any value is out of bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.anti_abuse.validate()?;
        self.notifications.validate()?;
        Ok(())
    }

    /// Returns the engine configuration derived from the limits.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            dedup_window_ms: self.limits.dedup_window_ms,
            regex_size_limit: self.limits.regex_size_limit,
        }
    }
}

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Engine limit settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Duplicate-submission window in milliseconds.
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
    /// Compiled-pattern size budget in bytes.
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            dedup_window_ms: DEFAULT_DEDUP_WINDOW_MS,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

impl LimitsConfig {
    /// Validates the limit ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.dedup_window_ms < MIN_DEDUP_WINDOW_MS || self.dedup_window_ms > MAX_DEDUP_WINDOW_MS
        {
            return Err(ConfigError::Invalid(format!(
                "limits.dedup_window_ms must be within {MIN_DEDUP_WINDOW_MS}..={MAX_DEDUP_WINDOW_MS}"
            )));
        }
        if self.regex_size_limit == 0 || self.regex_size_limit > MAX_REGEX_SIZE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "limits.regex_size_limit must be within 1..={MAX_REGEX_SIZE_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Returns the default dedup window.
const fn default_dedup_window_ms() -> u64 {
    DEFAULT_DEDUP_WINDOW_MS
}

/// Returns the default regex size budget.
const fn default_regex_size_limit() -> usize {
    DEFAULT_REGEX_SIZE_LIMIT
}

// ============================================================================
// SECTION: Anti-Abuse
// ============================================================================

/// Anti-abuse operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AntiAbuseMode {
    /// Accept every submission without verification.
    #[default]
    Bypass,
    /// Verify tokens against the configured endpoint.
    Live,
}

/// Anti-abuse verification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AntiAbuseConfig {
    /// Operating mode.
    #[serde(default)]
    pub mode: AntiAbuseMode,
    /// Shared secret for live verification.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Minimum accepted score, in [0, 1].
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for AntiAbuseConfig {
    fn default() -> Self {
        Self {
            mode: AntiAbuseMode::Bypass,
            secret_key: None,
            min_score: default_min_score(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl AntiAbuseConfig {
    /// Validates the anti-abuse settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigError::Invalid(
                "anti_abuse.min_score must be within 0.0..=1.0".to_string(),
            ));
        }
        if self.mode == AntiAbuseMode::Live
            && self.secret_key.as_deref().is_none_or(|key| key.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "anti_abuse.secret_key is required in live mode".to_string(),
            ));
        }
        validate_timeout("anti_abuse.connect_timeout_ms", self.connect_timeout_ms)?;
        validate_timeout("anti_abuse.request_timeout_ms", self.request_timeout_ms)?;
        Ok(())
    }
}

/// Returns the default minimum score.
const fn default_min_score() -> f64 {
    0.5
}

/// Returns the default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    500
}

/// Returns the default request timeout.
const fn default_request_timeout_ms() -> u64 {
    2_000
}

// ============================================================================
// SECTION: Notifications
// ============================================================================

/// Notification delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMode {
    /// No delivery; outcomes report unsent flags.
    #[default]
    Disabled,
    /// Post submission events to an operator webhook.
    Webhook,
}

/// Notification delivery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    /// Delivery mode.
    #[serde(default)]
    pub mode: NotificationMode,
    /// Webhook endpoint URL for webhook mode.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_notify_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            mode: NotificationMode::Disabled,
            webhook_url: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_notify_request_timeout_ms(),
        }
    }
}

impl NotificationConfig {
    /// Validates the notification settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == NotificationMode::Webhook
            && self.webhook_url.as_deref().is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "notifications.webhook_url is required in webhook mode".to_string(),
            ));
        }
        validate_timeout("notifications.connect_timeout_ms", self.connect_timeout_ms)?;
        validate_timeout("notifications.request_timeout_ms", self.request_timeout_ms)?;
        Ok(())
    }
}

/// Returns the default notification request timeout.
const fn default_notify_request_timeout_ms() -> u64 {
    5_000
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a timeout value against the shared bounds.
fn validate_timeout(name: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{name} must be within {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS}"
        )));
    }
    Ok(())
}
