use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use gcp_auth::TokenProvider;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::Config,
    models::fcm::{FcmMessage, FcmRequest, FcmResponse},
};

const FCM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/firebase.messaging"];

#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Returns the provider-assigned message identifier.
    async fn send(&self, message: &FcmMessage) -> Result<String, Error>;
}

pub struct FcmClient {
    http_client: Client,
    base_url: String,
    fcm_project_id: String,
    token_provider: Arc<dyn TokenProvider>,
}

impl FcmClient {
    pub fn new(
        base_url: String,
        fcm_project_id: String,
        token_provider: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(project_id = %fcm_project_id, "FCM client initialized");

        Ok(Self {
            http_client,
            base_url,
            fcm_project_id,
            token_provider,
        })
    }

    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        let token_provider = gcp_auth::provider()
            .await
            .map_err(|e| anyhow!("Failed to load Google credentials: {}", e))?;

        Self::new(
            config.fcm_api_base_url.clone(),
            config.fcm_project_id.clone(),
            token_provider,
            Duration::from_secs(config.http_timeout_seconds),
        )
    }
}

#[async_trait]
impl PushGateway for FcmClient {
    async fn send(&self, message: &FcmMessage) -> Result<String, Error> {
        debug!(device_token = %message.token, "Sending FCM push notification");

        let token = self.token_provider.token(FCM_SCOPES).await?;

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url.trim_end_matches('/'),
            self.fcm_project_id
        );

        let request = FcmRequest {
            message: message.clone(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("FCM request failed: {}", error_text));
        }

        let body: FcmResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse FCM response: {}", e))?;

        body.name
            .ok_or_else(|| anyhow!("FCM response is missing message name"))
    }
}
