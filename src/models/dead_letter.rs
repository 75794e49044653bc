use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    message::NotificationRequest,
    status::{ChannelType, DeliveryStatus},
};

pub const EXHAUSTED_REASON: &str = "All retry attempts failed";

/// One terminal outcome of a channel send, as stored in `failed_notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterRecord {
    pub id: Uuid,
    pub channel_type: ChannelType,
    pub recipient: String,
    pub original_payload: String,
    pub attempt_count: i32,
    pub last_attempt: DateTime<Utc>,
    pub failure_reason: Option<String>,
    pub failed_at: Option<DateTime<Utc>>,
    pub status: DeliveryStatus,
}

impl DeadLetterRecord {
    pub fn success(
        channel_type: ChannelType,
        recipient: String,
        original_payload: String,
        attempt_count: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_type,
            recipient,
            original_payload,
            attempt_count: attempt_count as i32,
            last_attempt: Utc::now(),
            failure_reason: None,
            failed_at: None,
            status: DeliveryStatus::Success,
        }
    }

    pub fn dead_letter(
        channel_type: ChannelType,
        recipient: String,
        original_payload: String,
        attempt_count: u32,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            channel_type,
            recipient,
            original_payload,
            attempt_count: attempt_count as i32,
            last_attempt: now,
            failure_reason: Some(EXHAUSTED_REASON.to_string()),
            failed_at: Some(now),
            status: DeliveryStatus::DeadLetter,
        }
    }

    pub fn payload(&self) -> Result<NotificationRequest, serde_json::Error> {
        serde_json::from_str(&self.original_payload)
    }
}

/// Snapshot of the request for `original_payload`. An unserializable request is
/// stored as an empty string rather than blocking the record.
pub fn snapshot_payload(request: &NotificationRequest) -> String {
    serde_json::to_string(request).unwrap_or_default()
}
