use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use tracing::{error, info, warn};

use crate::{
    clients::{database::DeadLetterRecorder, fcm::PushGateway},
    config::Config,
    models::{
        dead_letter::{DeadLetterRecord, snapshot_payload},
        fcm::FcmMessage,
        message::NotificationRequest,
        outcome::SendOutcome,
        retry::{Attempted, RetryConfig},
        status::ChannelType,
    },
    utils::retry_with_backoff,
};

pub const MISSING_REQUEST: &str = "Notification request is null";
pub const MISSING_USER_INFO: &str = "User info is missing in the notification request";

pub struct PushSender {
    gateway: Arc<dyn PushGateway>,
    recorder: Arc<dyn DeadLetterRecorder>,
    retry_config: RetryConfig,
}

impl PushSender {
    pub fn new(
        gateway: Arc<dyn PushGateway>,
        recorder: Arc<dyn DeadLetterRecorder>,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            gateway,
            recorder,
            retry_config,
        }
    }

    pub fn from_config(
        config: &Config,
        gateway: Arc<dyn PushGateway>,
        recorder: Arc<dyn DeadLetterRecorder>,
    ) -> Self {
        Self::new(gateway, recorder, config.retry_config())
    }

    /// Pushes the request's header and message to the user's device.
    ///
    /// A missing request or user section is rejected up front: no attempt is
    /// made and nothing is recorded. A missing body or device id is an ordinary
    /// attempt failure and goes through retry and dead-lettering.
    pub async fn send_push(
        &self,
        request: Option<&NotificationRequest>,
    ) -> Result<SendOutcome, Error> {
        let Some(request) = request else {
            warn!(channel = %ChannelType::Push, "Push rejected: {}", MISSING_REQUEST);
            return Ok(SendOutcome::Rejected(MISSING_REQUEST.to_string()));
        };

        if request.user_info.is_none() {
            warn!(channel = %ChannelType::Push, "Push rejected: {}", MISSING_USER_INFO);
            return Ok(SendOutcome::Rejected(MISSING_USER_INFO.to_string()));
        }

        let result = retry_with_backoff(&self.retry_config, move || self.attempt(request)).await;

        match result {
            Ok(Attempted {
                value: message_id,
                attempts,
            }) => {
                let record = DeadLetterRecord::success(
                    ChannelType::Push,
                    recipient(request),
                    snapshot_payload(request),
                    attempts,
                );
                self.recorder.record(&record).await?;

                info!(
                    channel = %ChannelType::Push,
                    record_id = %record.id,
                    message_id = %message_id,
                    attempts,
                    "Push notification sent successfully"
                );

                Ok(SendOutcome::Delivered(vec![
                    "Message :Successfully sent message".to_string(),
                    format!("Response :{}", message_id),
                ]))
            }
            Err(e) => {
                self.recover(request, &e).await?;
                Ok(SendOutcome::DeadLettered)
            }
        }
    }

    async fn attempt(&self, request: &NotificationRequest) -> Result<String, Error> {
        let device_id = request
            .user_info
            .as_ref()
            .and_then(|user| user.device_id.as_deref())
            .ok_or_else(|| anyhow!("Device ID is missing in the notification request"))?;

        let body = request
            .notification_body
            .as_ref()
            .ok_or_else(|| anyhow!("Notification body is missing in the notification request"))?;

        let message = FcmMessage::new(device_id, &body.header, &body.message);

        self.gateway.send(&message).await
    }

    async fn recover(&self, request: &NotificationRequest, cause: &Error) -> Result<(), Error> {
        warn!(
            channel = %ChannelType::Push,
            error = %cause,
            "Push delivery exhausted retries, recording dead letter"
        );

        let record = DeadLetterRecord::dead_letter(
            ChannelType::Push,
            recipient(request),
            snapshot_payload(request),
            self.retry_config.max_attempts,
        );

        self.recorder.record(&record).await.inspect_err(|e| {
            error!(
                record_id = %record.id,
                error = %e,
                "Failed to record push dead letter"
            );
        })
    }
}

fn recipient(request: &NotificationRequest) -> String {
    request
        .user_info
        .as_ref()
        .and_then(|user| user.device_id.clone())
        .unwrap_or_default()
}
