//! Notification payload and its GCM wire representation.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Provider default and maximum time-to-live: 28 days in seconds
pub const DEFAULT_TIME_TO_LIVE: u32 = 28 * 86_400;

/// Delivery priority understood by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

/// A push notification as callers describe it, independent of any recipient.
///
/// Deserializes from camelCase JSON so the CLI can read it from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Android
    pub icon: Option<String>,
    pub sound: Option<String>,
    /// iOS
    pub badge: Option<u32>,
    /// Android, replaces an existing notification with the same tag
    pub tag: Option<String>,
    /// Android, `#rrggbb`
    pub color: Option<String>,
    /// Free-form payload, forwarded as-is under `data.custom`
    pub custom: Option<serde_json::Value>,
    pub click_action: Option<String>,
    /// Used as click action when none is set
    pub category: Option<String>,
    pub loc_key: Option<String>,
    pub loc_args: Option<Vec<String>>,
    pub title_loc_key: Option<String>,
    pub title_loc_args: Option<Vec<String>>,

    pub priority: Option<Priority>,
    pub collapse_key: Option<String>,
    pub content_available: bool,
    pub delay_while_idle: bool,
    /// Seconds the provider keeps the message while the device is offline
    pub time_to_live: Option<u32>,
    /// Absolute expiry as a unix timestamp in seconds; wins over `time_to_live`
    pub expiry: Option<i64>,
    pub restricted_package_name: Option<String>,
    pub dry_run: bool,
    /// Provider-side retries for each chunk
    pub retries: Option<u32>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Effective time-to-live at `now`
    pub fn time_to_live_at(&self, now: Timestamp) -> u32 {
        compute_time_to_live(self.expiry, self.time_to_live, now.as_second())
    }
}

/// Resolve the time-to-live sent to the provider.
///
/// Sources in order: seconds remaining until `expiry`, explicit
/// `time_to_live`, then [`DEFAULT_TIME_TO_LIVE`]. A source yielding zero or
/// less falls through to the next one, so an already-expired notification and
/// an explicit ttl of 0 both end up with the default.
pub fn compute_time_to_live(expiry: Option<i64>, time_to_live: Option<u32>, now: i64) -> u32 {
    expiry
        .map(|expiry| expiry.saturating_sub(now))
        .filter(|remaining| *remaining > 0)
        .map(|remaining| u32::try_from(remaining).unwrap_or(u32::MAX))
        .or(time_to_live.filter(|ttl| *ttl > 0))
        .unwrap_or(DEFAULT_TIME_TO_LIVE)
}

/// `data` object of a GCM message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_loc_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_args: Option<Vec<String>>,
}

/// Message body shared by every chunk of one dispatch.
///
/// Recipients are not part of it; the sender adds `registration_ids` per chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcmMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub content_available: bool,
    pub delay_while_idle: bool,
    pub time_to_live: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_package_name: Option<String>,
    pub dry_run: bool,
    pub data: MessageData,
}

impl GcmMessage {
    /// Translate a notification into the provider's wire shape
    pub fn from_notification(notification: &Notification, now: Timestamp) -> Self {
        let n = notification;
        Self {
            collapse_key: n.collapse_key.clone(),
            priority: n.priority,
            content_available: n.content_available,
            delay_while_idle: n.delay_while_idle,
            time_to_live: n.time_to_live_at(now),
            restricted_package_name: n.restricted_package_name.clone(),
            dry_run: n.dry_run,
            data: MessageData {
                title: n.title.clone(),
                message: n.body.clone(),
                icon: n.icon.clone(),
                sound: n.sound.clone(),
                badge: n.badge,
                tag: n.tag.clone(),
                color: n.color.clone(),
                custom: n.custom.clone(),
                click_action: n.click_action.clone().or_else(|| n.category.clone()),
                body_loc_key: n.loc_key.clone(),
                body_loc_args: n.loc_args.clone(),
                title_loc_key: n.title_loc_key.clone(),
                title_loc_args: n.title_loc_args.clone(),
            },
        }
    }
}
