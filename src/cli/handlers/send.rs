//! Send command handler
//!
//! Collects recipients, builds the notification from file and flags, and
//! dispatches it. Ctrl-C cancels batches still in flight.

use std::fs;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::parser::SendArgs;
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::services::gcm::{DispatchSummary, Dispatcher, Notification};

pub struct SendCommandHandler {
    config: Settings,
}

impl SendCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Dispatch and print the summary as JSON on stdout
    pub async fn execute(&self, args: &SendArgs) -> AppResult<()> {
        let summary = self.run(args).await?;

        let rendered = if args.pretty {
            serde_json::to_string_pretty(&summary)
        } else {
            serde_json::to_string(&summary)
        }
        .map_err(|e| AppError::Internal { source: e.into() })?;

        println!("{}", rendered);
        Ok(())
    }

    /// Dispatch and return the summary
    ///
    /// # Errors
    /// - Missing API key
    /// - Unreadable tokens or notification file, malformed notification JSON
    /// - No recipients after reading the tokens file
    ///
    /// Delivery failures are not errors; they are reported in the summary.
    pub async fn run(&self, args: &SendArgs) -> AppResult<DispatchSummary> {
        self.config.gcm.require_credentials()?;

        let tokens = collect_tokens(args)?;
        if tokens.is_empty() {
            return Err(AppError::BadRequest {
                message: "no recipient tokens given".to_string(),
            });
        }
        let notification = build_notification(args)?;
        let dispatcher = Dispatcher::from_config(&self.config.gcm)?;

        info!(
            tokens = tokens.len(),
            dry_run = notification.dry_run,
            "sending notification"
        );

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling batches in flight");
                interrupt.cancel();
            }
        });

        let summary = dispatcher
            .dispatch_with_cancel(&tokens, &notification, &cancel)
            .await;
        watcher.abort();

        Ok(summary)
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

/// `--token` values followed by the tokens file, order preserved
pub fn collect_tokens(args: &SendArgs) -> AppResult<Vec<String>> {
    let mut tokens = args.tokens.clone();
    if let Some(path) = &args.tokens_file {
        tokens.extend(read_tokens_file(path)?);
    }
    Ok(tokens)
}

/// One token per line; blank lines and `#` comments are skipped
pub fn read_tokens_file(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Notification file, if any, with command line flags applied on top
pub fn build_notification(args: &SendArgs) -> AppResult<Notification> {
    let mut notification = match &args.notification_file {
        Some(path) => read_notification_file(path)?,
        None => Notification::default(),
    };

    if let Some(title) = &args.title {
        notification.title = Some(title.clone());
    }
    if let Some(body) = &args.body {
        notification.body = Some(body.clone());
    }
    if let Some(priority) = args.priority {
        notification.priority = Some(priority.into());
    }
    if let Some(collapse_key) = &args.collapse_key {
        notification.collapse_key = Some(collapse_key.clone());
    }
    if let Some(ttl) = args.ttl {
        notification.time_to_live = Some(ttl);
    }
    if let Some(expiry) = args.expiry {
        notification.expiry = Some(expiry);
    }
    if let Some(retries) = args.retries {
        notification.retries = Some(retries);
    }
    if args.dry_run {
        notification.dry_run = true;
    }

    Ok(notification)
}

fn read_notification_file(path: &Path) -> AppResult<Notification> {
    let content = fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|e| AppError::Validation {
        field: "notification_file".to_string(),
        reason: format!("{}: {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parser::{Cli, Commands};
    use crate::services::gcm::{DeliveryError, Priority};
    use clap::Parser;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn send_args(args: &[&str]) -> SendArgs {
        let mut argv = vec!["gcm-push", "send"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Send(args) => args,
            other => panic!("Expected Send command, got {:?}", other),
        }
    }

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn settings_for(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.gcm.api_key = "test-key".to_string();
        settings.gcm.endpoint = format!("{}/fcm/send", server.uri());
        settings.gcm.backoff_ms = 1;
        settings.gcm.max_backoff_ms = 5;
        settings
    }

    #[test]
    fn test_collect_tokens_from_flags_and_file() {
        let file = temp_file("# staging devices\nccc\n\n  ddd  \n");
        let args = send_args(&[
            "-t",
            "aaa",
            "-t",
            "bbb",
            "--tokens-file",
            file.path().to_str().unwrap(),
        ]);

        assert_eq!(collect_tokens(&args).unwrap(), vec!["aaa", "bbb", "ccc", "ddd"]);
    }

    #[test]
    fn test_flags_override_notification_file() {
        let file = temp_file(
            r#"{"title": "From file", "body": "File body", "sound": "ping", "timeToLive": 60, "retries": 1}"#,
        );
        let args = send_args(&[
            "-t",
            "a",
            "--notification-file",
            file.path().to_str().unwrap(),
            "--title",
            "From flag",
            "--priority",
            "high",
            "--retries",
            "3",
            "--dry-run",
        ]);

        let notification = build_notification(&args).unwrap();

        assert_eq!(notification.title.as_deref(), Some("From flag"));
        assert_eq!(notification.body.as_deref(), Some("File body"));
        assert_eq!(notification.sound.as_deref(), Some("ping"));
        assert_eq!(notification.time_to_live, Some(60));
        assert_eq!(notification.priority, Some(Priority::High));
        assert_eq!(notification.retries, Some(3));
        assert!(notification.dry_run);
    }

    #[test]
    fn test_malformed_notification_file() {
        let file = temp_file("{ not json");
        let args = send_args(&["-t", "a", "-n", file.path().to_str().unwrap()]);

        let err = build_notification(&args).unwrap_err();
        assert!(matches!(err, AppError::Validation { field, .. } if field == "notification_file"));
    }

    #[tokio::test]
    async fn test_run_requires_api_key() {
        let handler = SendCommandHandler::new(Settings::default());
        let args = send_args(&["-t", "a"]);

        let err = handler.run(&args).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field, .. } if field == "gcm.api_key"));
    }

    #[tokio::test]
    async fn test_run_rejects_empty_tokens_file() {
        let server = MockServer::start().await;
        let file = temp_file("# nobody here\n\n");
        let handler = SendCommandHandler::new(settings_for(&server));
        let args = send_args(&["--tokens-file", file.path().to_str().unwrap()]);

        let err = handler.run(&args).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_run_dispatches_to_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fcm/send"))
            .and(header("authorization", "key=test-key"))
            .and(body_partial_json(json!({
                "registration_ids": ["aaa", "bbb"],
                "dry_run": true,
                "data": {"title": "Hi"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "multicast_id": 77,
                "success": 1,
                "failure": 1,
                "canonical_ids": 0,
                "results": [
                    {"message_id": "0:1"},
                    {"error": "NotRegistered"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handler = SendCommandHandler::new(settings_for(&server));
        let args = send_args(&["-t", "aaa", "-t", "bbb", "--title", "Hi", "--dry-run"]);

        let summary = handler.run(&args).await.unwrap();

        assert_eq!(summary.multicast_ids, vec![77]);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.failure, 1);
        assert_eq!(summary.outcomes[0].message_id.as_deref(), Some("0:1"));
        assert_eq!(
            summary.outcomes[1].error,
            Some(DeliveryError::Provider("NotRegistered".to_string()))
        );
    }
}
