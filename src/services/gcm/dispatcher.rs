//! Batch fan-out over a [`GcmSender`].

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use jiff::Timestamp;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::gcm_client::GcmClient;
use super::message::{GcmMessage, Notification};
use super::result::{ChunkOutcome, DispatchSummary};
use super::sender::{GcmSender, SendError};
use crate::config::GcmConfig;
use crate::error::AppResult;

/// Provider limit on registration tokens per request
pub const MAX_CHUNK_SIZE: usize = 1000;

const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(120);

/// Time a sender gets past its deadline to hand back partial results
const DEADLINE_GRACE: Duration = Duration::from_millis(250);

/// Split recipients into contiguous provider-sized batches.
///
/// An empty list yields no batches.
pub fn chunk_tokens(tokens: &[String]) -> Vec<&[String]> {
    tokens.chunks(MAX_CHUNK_SIZE).collect()
}

/// Sends one notification to any number of recipients.
///
/// Each chunk goes out as its own concurrent request. A chunk that fails,
/// times out or is cancelled only fails its own recipients; `dispatch`
/// itself always returns a summary.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn GcmSender>,
    chunk_timeout: Duration,
    default_retries: u32,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn GcmSender>) -> Self {
        Self {
            sender,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            default_retries: 0,
        }
    }

    /// Dispatcher backed by a [`GcmClient`] built from `config`
    pub fn from_config(config: &GcmConfig) -> AppResult<Self> {
        let client = GcmClient::from_config(config)?;
        Ok(Self::new(Arc::new(client))
            .with_chunk_timeout(config.chunk_timeout())
            .with_default_retries(config.default_retries))
    }

    /// Upper bound for one chunk, retries included.
    ///
    /// A chunk the provider already answered keeps that answer when its
    /// resends run out of time.
    pub fn with_chunk_timeout(mut self, timeout: Duration) -> Self {
        self.chunk_timeout = timeout;
        self
    }

    /// Retry count for notifications that do not set one
    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    pub async fn dispatch(&self, tokens: &[String], notification: &Notification) -> DispatchSummary {
        self.dispatch_with_cancel(tokens, notification, &CancellationToken::new())
            .await
    }

    /// Like [`Dispatcher::dispatch`], but stops waiting once `cancel` fires.
    ///
    /// Chunks still in flight at that point are dropped and reported as
    /// cancelled; chunks that already finished keep their results.
    pub async fn dispatch_with_cancel(
        &self,
        tokens: &[String],
        notification: &Notification,
        cancel: &CancellationToken,
    ) -> DispatchSummary {
        let chunks = chunk_tokens(tokens);
        let span = info_span!(
            "gcm_dispatch",
            dispatch_id = %Uuid::new_v4(),
            sender = self.sender.name(),
            tokens = tokens.len(),
            chunks = chunks.len(),
        );

        async move {
            if chunks.is_empty() {
                debug!("no recipients, nothing to send");
                return DispatchSummary::empty();
            }

            let message = GcmMessage::from_notification(notification, Timestamp::now());
            let retries = notification.retries.unwrap_or(self.default_retries);

            let sends = chunks
                .iter()
                .enumerate()
                .map(|(index, chunk)| self.send_chunk(index, &message, chunk, retries, cancel));
            let summary = DispatchSummary::merge(join_all(sends).await);

            info!(
                success = summary.success,
                failure = summary.failure,
                multicast_ids = summary.multicast_ids.len(),
                "dispatch finished"
            );
            summary
        }
        .instrument(span)
        .await
    }

    async fn send_chunk(
        &self,
        index: usize,
        message: &GcmMessage,
        chunk: &[String],
        retries: u32,
        cancel: &CancellationToken,
    ) -> ChunkOutcome {
        debug!(chunk = index, size = chunk.len(), "sending chunk");

        let deadline = Instant::now() + self.chunk_timeout;
        let send = tokio::time::timeout_at(
            deadline + DEADLINE_GRACE,
            self.sender.send(message, chunk, retries, deadline),
        );
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SendError::Cancelled),
            outcome = send => outcome.unwrap_or_else(|_| Err(SendError::Timeout(self.chunk_timeout))),
        };

        if let Err(e) = &result {
            warn!(chunk = index, size = chunk.len(), error = %e, "chunk failed");
        }

        ChunkOutcome::from_response(chunk.to_vec(), result)
    }
}

/// One-shot send: build a GCM client from `config` and dispatch.
///
/// Only configuration problems are returned as errors; delivery failures
/// are reported inside the summary.
pub async fn send_gcm(
    tokens: &[String],
    notification: &Notification,
    config: &GcmConfig,
) -> AppResult<DispatchSummary> {
    let dispatcher = Dispatcher::from_config(config)?;
    Ok(dispatcher.dispatch(tokens, notification).await)
}
