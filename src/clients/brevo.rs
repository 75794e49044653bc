use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, info};

use crate::{
    config::Config,
    models::mail::{MailPayload, MailReceipt},
};

#[async_trait]
pub trait MailGateway: Send + Sync {
    async fn send(&self, payload: &MailPayload) -> Result<MailReceipt, Error>;
}

/// Transactional email provider client.
pub struct BrevoClient {
    http_client: Client,
    api_url: String,
    api_key: String,
}

impl BrevoClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(api_url = %api_url, "Mail provider client initialized");

        Ok(Self {
            http_client,
            api_url,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(
            config.mail_api_url.clone(),
            config.brevo_api_key.clone(),
            Duration::from_secs(config.http_timeout_seconds),
        )
    }
}

#[async_trait]
impl MailGateway for BrevoClient {
    async fn send(&self, payload: &MailPayload) -> Result<MailReceipt, Error> {
        debug!(subject = %payload.subject, "Posting email to provider");

        let response = self
            .http_client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Mail provider request failed ({}): {}", status, error_text));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse mail provider response: {}", e))?;

        let message_id = body
            .get("messageId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Mail provider response is missing messageId"))?
            .to_string();

        Ok(MailReceipt {
            message_id,
            summary: format!("{} {}", status, body),
        })
    }
}
