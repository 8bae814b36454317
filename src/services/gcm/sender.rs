//! Provider seam.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

use super::message::GcmMessage;
use super::response::GcmResponse;

/// Failure of a whole provider request, as opposed to a single token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("chunk timed out after {0:?}")]
    Timeout(Duration),

    #[error("dispatch cancelled")]
    Cancelled,

    #[error("provider rejected the request: {0}")]
    BadRequest(String),

    #[error("provider rejected the API key")]
    Unauthorized,

    #[error("provider server error (status {status})")]
    Server {
        status: u16,
        retry_after: Option<Duration>,
    },

    #[error("unexpected provider status {0}")]
    UnexpectedStatus(u16),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl SendError {
    /// Whether resending the same request may succeed
    pub fn is_retriable(&self) -> bool {
        matches!(self, SendError::Transport(_) | SendError::Server { .. })
    }

    /// Delay requested by the provider, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SendError::Server { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Sends one message to one batch of registration tokens.
///
/// `tokens` holds at most one provider batch. `retries` is the number of
/// extra attempts the implementation may make on transient failures; callers
/// forward it and do not retry themselves.
///
/// `deadline` bounds the whole call. Once the provider has answered, an
/// implementation must stop retrying at the deadline and return the results
/// it has; callers may drop the call shortly after the deadline passes.
///
/// # Example Implementation
/// ```ignore
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl GcmSender for AlwaysOk {
///     async fn send(
///         &self,
///         _: &GcmMessage,
///         tokens: &[String],
///         _: u32,
///         _: Instant,
///     ) -> Result<GcmResponse, SendError> {
///         Ok(GcmResponse { success: tokens.len() as u32, ..Default::default() })
///     }
///
///     fn name(&self) -> &'static str {
///         "always-ok"
///     }
/// }
/// ```
#[async_trait]
pub trait GcmSender: Send + Sync {
    async fn send(
        &self,
        message: &GcmMessage,
        tokens: &[String],
        retries: u32,
        deadline: Instant,
    ) -> Result<GcmResponse, SendError>;

    /// Sender name for logging
    fn name(&self) -> &'static str;
}
