//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use jiff::Timestamp;
use std::fs;
use std::path::PathBuf;

/// Upper bound for `--retries`; each retry may wait up to `gcm.max_backoff_ms`
const MAX_RETRIES: u32 = 10;

/// Validate that a file path is accessible (exists and is readable)
fn validate_readable_file(kind: &str, path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("{} does not exist: '{}'", kind, path_str));
    }

    if !path.is_file() {
        return Err(format!("{} is not a file: '{}'", kind, path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read {} '{}': {}", kind.to_lowercase(), path_str, e)),
    }
}

pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    validate_readable_file("Configuration file", path_str)
}

pub fn validate_tokens_file_path(path_str: &str) -> Result<PathBuf, String> {
    validate_readable_file("Tokens file", path_str)
}

pub fn validate_notification_file_path(path_str: &str) -> Result<PathBuf, String> {
    validate_readable_file("Notification file", path_str)
}

/// Validate a registration token: non-empty, no whitespace
pub fn validate_token(token_str: &str) -> Result<String, String> {
    let token = token_str.trim();

    if token.is_empty() {
        return Err("Registration token cannot be empty".to_string());
    }

    if token.chars().any(char::is_whitespace) {
        return Err(format!(
            "Registration token cannot contain whitespace: '{}'",
            token_str
        ));
    }

    Ok(token.to_string())
}

/// Validate retry count is within 0..=10
pub fn validate_retries(retries_str: &str) -> Result<u32, String> {
    let retries: u32 = retries_str.parse().map_err(|_| {
        format!(
            "Retries must be a number between 0 and {}, got: '{}'",
            MAX_RETRIES, retries_str
        )
    })?;

    if retries > MAX_RETRIES {
        return Err(format!("Retries cannot exceed {}", MAX_RETRIES));
    }

    Ok(retries)
}

/// Parse an expiry given as unix seconds or as an RFC 3339 timestamp
pub fn parse_expiry(expiry_str: &str) -> Result<i64, String> {
    let expiry = expiry_str.trim();

    if let Ok(seconds) = expiry.parse::<i64>() {
        return Ok(seconds);
    }

    expiry
        .parse::<Timestamp>()
        .map(|timestamp| timestamp.as_second())
        .map_err(|e| {
            format!(
                "Expiry must be unix seconds or an RFC 3339 timestamp, got '{}': {}",
                expiry_str, e
            )
        })
}
