use anyhow::{Error, Result};
use tracing::{debug, info};

use crate::{
    models::{message::NotificationRequest, outcome::SendOutcome, status::ChannelType},
    senders::{MailSender, PushSender},
};

/// Routes a content-ready request to the channel senders named in the user's
/// preferences, in order.
pub struct NotificationDispatcher {
    mail_sender: MailSender,
    push_sender: PushSender,
}

impl NotificationDispatcher {
    pub fn new(mail_sender: MailSender, push_sender: PushSender) -> Self {
        Self {
            mail_sender,
            push_sender,
        }
    }

    /// One outcome per recognized channel token. Repeated tokens are sent again;
    /// unrecognized tokens are skipped. Sends run sequentially.
    pub async fn dispatch(&self, request: &NotificationRequest) -> Result<Vec<SendOutcome>, Error> {
        let mut outcomes = Vec::new();

        for token in request.channel_tokens() {
            let Some(channel) = ChannelType::from_token(token) else {
                debug!(token = %token, "Skipping unrecognized channel");
                continue;
            };

            let outcome = match channel {
                ChannelType::Email => {
                    self.mail_sender
                        .send_mail(request, request.html_string.as_deref())
                        .await?
                }
                ChannelType::Push => self.push_sender.send_push(Some(request)).await?,
            };

            outcomes.push(outcome);
        }

        info!(
            channels = outcomes.len(),
            delivered = outcomes.iter().filter(|o| o.is_delivered()).count(),
            "Dispatch finished"
        );

        Ok(outcomes)
    }
}
