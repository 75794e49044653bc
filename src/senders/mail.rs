use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use tracing::{error, info, warn};

use crate::{
    clients::{brevo::MailGateway, database::DeadLetterRecorder},
    config::Config,
    models::{
        dead_letter::{DeadLetterRecord, snapshot_payload},
        mail::{MailContact, MailPayload, MailReceipt},
        message::NotificationRequest,
        outcome::SendOutcome,
        retry::{Attempted, RetryConfig},
        status::ChannelType,
    },
    utils::retry_with_backoff,
};

/// Delivers rendered email through the mail provider and records the terminal
/// outcome of every send.
pub struct MailSender {
    gateway: Arc<dyn MailGateway>,
    recorder: Arc<dyn DeadLetterRecorder>,
    sender: MailContact,
    retry_config: RetryConfig,
}

impl MailSender {
    pub fn new(
        gateway: Arc<dyn MailGateway>,
        recorder: Arc<dyn DeadLetterRecorder>,
        sender: MailContact,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            gateway,
            recorder,
            sender,
            retry_config,
        }
    }

    pub fn from_config(
        config: &Config,
        gateway: Arc<dyn MailGateway>,
        recorder: Arc<dyn DeadLetterRecorder>,
    ) -> Self {
        let sender = MailContact {
            name: config.mail_sender_name.clone(),
            email: config.mail_sender_email.clone(),
        };

        Self::new(gateway, recorder, sender, config.retry_config())
    }

    /// Sends `html` (possibly absent) to the request's user.
    ///
    /// Every attempt failure, including a missing subject or a response without a
    /// message id, is retried. Once the budget is spent the failure is recorded as a
    /// dead letter and reported as [`SendOutcome::DeadLettered`]. Only recorder
    /// errors are returned as `Err`.
    pub async fn send_mail(
        &self,
        request: &NotificationRequest,
        html: Option<&str>,
    ) -> Result<SendOutcome, Error> {
        let result = retry_with_backoff(&self.retry_config, move || self.attempt(request, html)).await;

        match result {
            Ok(Attempted {
                value: receipt,
                attempts,
            }) => {
                let record = DeadLetterRecord::success(
                    ChannelType::Email,
                    recipient(request),
                    snapshot_payload(request),
                    attempts,
                );
                self.recorder.record(&record).await?;

                info!(
                    channel = %ChannelType::Email,
                    record_id = %record.id,
                    message_id = %receipt.message_id,
                    attempts,
                    "Email sent successfully"
                );

                Ok(SendOutcome::Delivered(vec![
                    format!("Message :{}", receipt.message_id),
                    format!("Response :{}", receipt.summary),
                ]))
            }
            Err(e) => {
                self.recover(request, &e).await?;
                Ok(SendOutcome::DeadLettered)
            }
        }
    }

    async fn attempt(
        &self,
        request: &NotificationRequest,
        html: Option<&str>,
    ) -> Result<MailReceipt, Error> {
        let payload = self.build_payload(request, html)?;
        self.gateway.send(&payload).await
    }

    fn build_payload(
        &self,
        request: &NotificationRequest,
        html: Option<&str>,
    ) -> Result<MailPayload, Error> {
        let user = request
            .user_info
            .as_ref()
            .ok_or_else(|| anyhow!("User info is missing in the notification request"))?;

        let subject = request
            .notification_body
            .as_ref()
            .and_then(|body| body.subject.clone())
            .ok_or_else(|| anyhow!("Email subject is missing"))?;

        Ok(MailPayload {
            sender: self.sender.clone(),
            to: vec![MailContact {
                name: user.username.clone(),
                email: user.email.clone(),
            }],
            subject,
            html_content: html.map(str::to_string),
        })
    }

    async fn recover(&self, request: &NotificationRequest, cause: &Error) -> Result<(), Error> {
        warn!(
            channel = %ChannelType::Email,
            error = %cause,
            "Email delivery exhausted retries, recording dead letter"
        );

        let record = DeadLetterRecord::dead_letter(
            ChannelType::Email,
            recipient(request),
            snapshot_payload(request),
            self.retry_config.max_attempts,
        );

        self.recorder.record(&record).await.inspect_err(|e| {
            error!(
                record_id = %record.id,
                error = %e,
                "Failed to record email dead letter"
            );
        })
    }
}

fn recipient(request: &NotificationRequest) -> String {
    request
        .user_info
        .as_ref()
        .map(|user| user.email.clone())
        .unwrap_or_default()
}
