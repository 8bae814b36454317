//! Configuration validation logic
//!
//! Validation methods for every configuration structure, so bad values are
//! rejected before any request reaches the provider.

use reqwest::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{FileSettings, GcmConfig, LoggerSettings, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl GcmConfig {
    /// Validate provider connection settings
    ///
    /// # Validation Rules
    /// - Endpoint must be an absolute http or https URL
    /// - Request, connect and chunk timeouts must be greater than 0
    /// - Chunk timeout must not be shorter than the request timeout
    /// - Backoff must be greater than 0 and not exceed the backoff cap
    /// - Proxy, if set, must be a valid URL
    ///
    /// The API key is not checked here; see [`GcmConfig::require_credentials`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("gcm.endpoint", &self.endpoint)?;

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "gcm.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "gcm.connect_timeout",
                "Connect timeout must be greater than 0 seconds.",
            ));
        }

        if self.chunk_timeout == 0 {
            return Err(ConfigError::validation(
                "gcm.chunk_timeout",
                "Chunk timeout must be greater than 0 seconds.",
            ));
        }

        if self.chunk_timeout < self.request_timeout {
            return Err(ConfigError::ValidationError {
                field: "gcm.chunk_timeout".to_string(),
                message: format!(
                    "Chunk timeout ({}s) cannot be shorter than the request timeout ({}s).",
                    self.chunk_timeout, self.request_timeout
                ),
            });
        }

        if self.backoff_ms == 0 {
            return Err(ConfigError::validation(
                "gcm.backoff_ms",
                "Retry backoff must be greater than 0 milliseconds.",
            ));
        }

        if self.backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::ValidationError {
                field: "gcm.max_backoff_ms".to_string(),
                message: format!(
                    "Max backoff ({}ms) cannot be lower than the base backoff ({}ms).",
                    self.max_backoff_ms, self.backoff_ms
                ),
            });
        }

        if let Some(proxy) = &self.proxy {
            validate_http_url("gcm.proxy", proxy)?;
        }

        Ok(())
    }

    /// Ensure an API key is present. Required before any send.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        require_api_key(&self.api_key)
    }
}

pub(crate) fn require_api_key(api_key: &str) -> Result<(), ConfigError> {
    if api_key.trim().is_empty() {
        return Err(ConfigError::validation(
            "gcm.api_key",
            "API key is required. Set gcm.api_key or GCM_PUSH_GCM__API_KEY.",
        ));
    }
    Ok(())
}

pub(crate) fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::ValidationError {
        field: field.to_string(),
        message: format!("Invalid URL format: '{}'", value),
    })?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: format!("URL must use http or https, got '{}'", url.scheme()),
        });
    }

    Ok(())
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    /// - At least one output must be enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first error found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gcm.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
