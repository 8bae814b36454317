pub mod gcm;

pub use gcm::{DispatchSummary, Dispatcher, GcmClient, GcmSender, Notification, send_gcm};
