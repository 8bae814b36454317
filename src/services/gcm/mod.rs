//! GCM push delivery with batch fan-out.
//!
//! `Dispatcher` splits a recipient list into provider-sized chunks, sends
//! them concurrently through a `GcmSender`, and folds every chunk's result
//! into one `DispatchSummary`. `GcmClient` is the HTTP implementation of
//! `GcmSender`; tests substitute their own.

mod dispatcher;
mod gcm_client;
mod message;
mod response;
mod result;
mod sender;

pub use dispatcher::{Dispatcher, MAX_CHUNK_SIZE, chunk_tokens, send_gcm};
pub use gcm_client::GcmClient;
pub use message::{
    DEFAULT_TIME_TO_LIVE, GcmMessage, MessageData, Notification, Priority, compute_time_to_live,
};
pub use response::{GcmResponse, GcmResult};
pub use result::{ChunkOutcome, ChunkReport, DeliveryError, DeliveryOutcome, DispatchSummary, METHOD};
pub use sender::{GcmSender, SendError};
