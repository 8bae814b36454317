//! GCM legacy HTTP sender.
//!
//! Posts one batch per request to the provider endpoint and retries
//! transient failures itself, up to the retry count the caller forwards.
//!
//! API Reference: https://firebase.google.com/docs/cloud-messaging/http-server-ref

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::message::GcmMessage;
use super::response::GcmResponse;
use super::sender::{GcmSender, SendError};
use crate::config::GcmConfig;
use crate::config::validation::{require_api_key, validate_http_url};
use crate::error::AppResult;
use crate::external::build_http_client;

/// Request body: the shared message plus this batch's recipients
#[derive(Serialize)]
struct SendRequest<'a> {
    registration_ids: &'a [String],
    #[serde(flatten)]
    message: &'a GcmMessage,
}

/// Sender for the GCM/FCM legacy HTTP endpoint
///
/// # Example
/// ```ignore
/// let client = GcmClient::from_config(&settings.gcm)?;
/// let deadline = Instant::now() + Duration::from_secs(30);
/// let response = client.send(&message, &tokens, 2, deadline).await?;
/// ```
#[derive(Clone)]
pub struct GcmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    backoff: Duration,
    max_backoff: Duration,
}

impl GcmClient {
    /// Creates a sender on top of an existing HTTP client
    pub fn new(http: reqwest::Client, config: &GcmConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            backoff: config.backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Builds the HTTP client from `config` as well
    pub fn from_config(config: &GcmConfig) -> AppResult<Self> {
        let client = Self::new(build_http_client(config)?, config);
        client.validate()?;
        Ok(client)
    }

    /// Checks that:
    /// - the API key is not empty
    /// - the endpoint is an http or https URL
    pub fn validate(&self) -> AppResult<()> {
        require_api_key(&self.api_key)?;
        validate_http_url("gcm.endpoint", &self.endpoint)?;
        Ok(())
    }

    /// One POST; a 200 comes back with its `Retry-After` hint, if any
    async fn send_once(
        &self,
        message: &GcmMessage,
        tokens: &[String],
    ) -> Result<(GcmResponse, Option<Duration>), SendError> {
        let body = SendRequest {
            registration_ids: tokens,
            message,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("key={}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        Self::read_response(response).await
    }

    async fn read_response(
        response: Response,
    ) -> Result<(GcmResponse, Option<Duration>), SendError> {
        let status = response.status();
        if status == StatusCode::OK {
            let hint = retry_after(&response);
            let body = response
                .json::<GcmResponse>()
                .await
                .map_err(|e| SendError::InvalidResponse(e.to_string()))?;
            Ok((body, hint))
        } else if status == StatusCode::BAD_REQUEST {
            let detail = response.text().await.unwrap_or_default();
            Err(SendError::BadRequest(detail))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(SendError::Unauthorized)
        } else if status.is_server_error() {
            Err(SendError::Server {
                status: status.as_u16(),
                retry_after: retry_after(&response),
            })
        } else {
            Err(SendError::UnexpectedStatus(status.as_u16()))
        }
    }

    /// Exponential backoff with up to 50% random jitter, capped
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff);
        let jitter_ms = exponential.as_millis() as u64 / 2;
        let jitter = Duration::from_millis(rand::rng().random_range(0..=jitter_ms));
        (exponential + jitter).min(self.max_backoff)
    }

    /// The provider's `Retry-After` when given, else backoff; both capped
    fn retry_delay(&self, hint: Option<Duration>, attempt: u32) -> Duration {
        hint.map(|delay| delay.min(self.max_backoff))
            .unwrap_or_else(|| self.backoff_delay(attempt))
    }
}

/// `Retry-After` given in seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl GcmSender for GcmClient {
    /// Sends one batch, retrying transient failures
    ///
    /// Whole-request failures that are retriable (network errors, 5xx) are
    /// retried first. Once a response arrives, tokens whose result is
    /// `Unavailable` or `InternalServerError` are resent on their own and
    /// their slots patched in place. Both kinds of retry share the budget.
    ///
    /// No retry starts that cannot finish its wait before `deadline`. A resend
    /// still pending at the deadline is abandoned and the last results kept.
    async fn send(
        &self,
        message: &GcmMessage,
        tokens: &[String],
        retries: u32,
        deadline: Instant,
    ) -> Result<GcmResponse, SendError> {
        let mut attempt = 0;

        let (mut response, mut hint) = loop {
            match self.send_once(message, tokens).await {
                Ok(accepted) => break accepted,
                Err(e) if e.is_retriable() && attempt < retries => {
                    let delay = self.retry_delay(e.retry_after(), attempt);
                    if Instant::now() + delay >= deadline {
                        warn!(
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "GCM request failed, no time left to retry"
                        );
                        return Err(e);
                    }
                    warn!(
                        attempt = attempt + 1,
                        retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "GCM request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        while attempt < retries {
            let pending: Vec<usize> = response
                .retriable_positions()
                .into_iter()
                .filter(|&index| index < tokens.len())
                .collect();
            if pending.is_empty() {
                break;
            }

            let delay = self.retry_delay(hint.take(), attempt);
            debug!(
                pending = pending.len(),
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "resending tokens with transient errors"
            );
            attempt += 1;

            let retry_tokens: Vec<String> =
                pending.iter().map(|&index| tokens[index].clone()).collect();
            let resend = async {
                tokio::time::sleep(delay).await;
                self.send_once(message, &retry_tokens).await
            };
            let Ok(outcome) = tokio::time::timeout_at(deadline, resend).await else {
                warn!(
                    pending = pending.len(),
                    "deadline reached during token resend, keeping previous results"
                );
                break;
            };

            match outcome {
                Ok((retry, retry_hint)) => {
                    response.patch(&pending, retry);
                    hint = retry_hint;
                }
                Err(e) if e.is_retriable() => {
                    warn!(error = %e, "token resend failed, keeping previous results");
                    hint = e.retry_after();
                }
                Err(e) => {
                    warn!(error = %e, "token resend rejected, keeping previous results");
                    break;
                }
            }
        }

        Ok(response)
    }

    fn name(&self) -> &'static str {
        "gcm"
    }
}
