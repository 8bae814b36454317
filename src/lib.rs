//! gcm-push library
//!
//! Sends push notifications to many devices through the GCM/FCM legacy HTTP
//! endpoint, splitting recipients into provider-sized batches.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod services;

pub use services::gcm::{DispatchSummary, Dispatcher, Notification, send_gcm};

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
