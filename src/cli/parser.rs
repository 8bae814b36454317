//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::services::gcm::Priority;

/// Send push notifications through Google Cloud Messaging
#[derive(Parser, Debug)]
#[command(name = "gcm-push")]
#[command(about = "Send push notifications through Google Cloud Messaging")]
#[command(long_about = "
gcm-push sends one notification to any number of device registration tokens.
Recipients are split into batches of at most 1000 tokens, batches are sent
concurrently, and a JSON summary with one outcome per token is printed on
stdout.

EXAMPLES:
    # Send to two devices
    gcm-push send --token AAA --token BBB --title Hello --body World

    # Read recipients from a file, one token per line
    gcm-push send --tokens-file tokens.txt --notification-file message.json

    # Let the provider validate the request without delivering it
    gcm-push send --tokens-file tokens.txt --title Hi --dry-run --pretty

    # Use a custom configuration file
    gcm-push --config /etc/gcm-push/production.toml send --token AAA --title Hi

    # Check configuration without sending anything
    gcm-push --env production check

The API key is read from gcm.api_key or GCM_PUSH_GCM__API_KEY.
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load this TOML file instead of the layered files under config/.
    /// Environment variable overrides still apply.
    ///
    /// Example: --config /etc/gcm-push/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which config/{environment}.toml is layered over the defaults.
    ///
    /// Available values: development (dev), test, staging (stage), production (prod)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a notification to one or more devices
    ///
    /// Examples:
    ///   gcm-push send --token AAA --title Hi           # Single device
    ///   gcm-push send --tokens-file tokens.txt --title Hi --pretty
    Send(SendArgs),

    /// Validate configuration and exit
    ///
    /// Loads and validates configuration, checks that an API key is set and
    /// that an HTTP client can be built. Returns exit code 0 if ready to send.
    Check,
}

/// Arguments of the `send` command
#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("recipients")
        .required(true)
        .multiple(true)
        .args(["tokens", "tokens_file"])
))]
pub struct SendArgs {
    /// Registration token of a recipient, may be repeated
    #[arg(short = 't', long = "token", value_name = "TOKEN", value_parser = super::validation::validate_token)]
    pub tokens: Vec<String>,

    /// File with one registration token per line
    ///
    /// Blank lines and lines starting with '#' are skipped. Combined with
    /// any --token values, file tokens last.
    #[arg(long, value_name = "FILE", value_parser = super::validation::validate_tokens_file_path)]
    pub tokens_file: Option<PathBuf>,

    /// Notification title
    #[arg(long)]
    pub title: Option<String>,

    /// Notification body
    #[arg(long)]
    pub body: Option<String>,

    /// JSON file describing the notification (camelCase keys)
    ///
    /// Flags given on the command line override the values from this file.
    #[arg(short = 'n', long, value_name = "FILE", value_parser = super::validation::validate_notification_file_path)]
    pub notification_file: Option<PathBuf>,

    /// Delivery priority
    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Collapse key, newer messages replace pending ones with the same key
    #[arg(long, value_name = "KEY")]
    pub collapse_key: Option<String>,

    /// Time to live in seconds
    #[arg(long, value_name = "SECONDS")]
    pub ttl: Option<u32>,

    /// Absolute expiry, unix seconds or RFC 3339 timestamp; wins over --ttl
    #[arg(long, value_name = "TIME", value_parser = super::validation::parse_expiry)]
    pub expiry: Option<i64>,

    /// Provider retries per batch
    ///
    /// Must be between 0 and 10. Defaults to gcm.default_retries.
    #[arg(long, value_name = "COUNT", value_parser = super::validation::validate_retries)]
    pub retries: Option<u32>,

    /// Ask the provider to validate the request without delivering it
    #[arg(long)]
    pub dry_run: bool,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pub pretty: bool,

    /// Log level override
    ///
    /// Overrides both configuration file settings and global --verbose/--quiet flags.
    ///
    /// Available levels: error, warn, info, debug, trace
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

/// Priority options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityArg {
    #[value(name = "normal")]
    Normal,
    #[value(name = "high")]
    High,
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl From<PriorityArg> for Priority {
    fn from(priority: PriorityArg) -> Self {
        match priority {
            PriorityArg::Normal => Priority::Normal,
            PriorityArg::High => Priority::High,
        }
    }
}
