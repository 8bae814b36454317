//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{CheckCommandHandler, SendCommandHandler};
use super::parser::{Cli, Commands, SendArgs};
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};

/// Execute a CLI command with merged and validated settings
///
/// # Errors
/// Returns errors from command handlers or argument validation
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match &cli.command {
        Commands::Send(args) => {
            validate_send_args(args)?;
            SendCommandHandler::new(settings).execute(args).await
        }
        Commands::Check => CheckCommandHandler::new(settings).execute().await,
    }
}

/// Checks across arguments that clap cannot express
fn validate_send_args(args: &SendArgs) -> AppResult<()> {
    if args.notification_file.is_none() && args.title.is_none() && args.body.is_none() {
        return Err(AppError::Validation {
            field: "notification".to_string(),
            reason: "give --title, --body or --notification-file".to_string(),
        });
    }

    if let (Some(_), Some(_)) = (args.expiry, args.ttl) {
        tracing::warn!("--expiry takes precedence over --ttl");
    }

    Ok(())
}
