use thiserror::Error;

use crate::config::error::ConfigError;

/// Application-wide error type for everything outside the dispatch path.
///
/// Dispatching itself never fails (chunk failures are folded into the
/// summary), so these variants cover configuration, argument validation,
/// client construction and I/O at the edges of the program.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// File system error with the path involved
    #[error("I/O error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::ValidationError { field, message } => AppError::Validation {
                field,
                reason: message,
            },
            other => AppError::Configuration {
                key: "settings".to_string(),
                source: other.into(),
            },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_maps_to_validation() {
        let err: AppError = ConfigError::validation("gcm.api_key", "missing").into();
        assert!(
            matches!(err, AppError::Validation { ref field, .. } if field == "gcm.api_key")
        );
        assert_eq!(err.to_string(), "Validation failed for gcm.api_key: missing");
    }

    #[test]
    fn test_other_config_errors_map_to_configuration() {
        let err: AppError = ConfigError::file_not_found("config/default.toml").into();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_anyhow_maps_to_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
