use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use notification_dispatch::{
    api::{AppState, run_api_server},
    clients::{
        brevo::BrevoClient, database::PostgresRecorder, fcm::FcmClient, health::HealthChecker,
    },
    config::Config,
    dispatcher::NotificationDispatcher,
    models::retry::RetryConfig,
    senders::{MailSender, PushSender},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let config = Config::load()?;
    let retry_config: RetryConfig = config.retry_config();

    info!(
        max_attempts = retry_config.max_attempts,
        initial_delay_ms = retry_config.initial_delay_ms,
        "Configuration loaded"
    );

    let recorder = Arc::new(PostgresRecorder::connect(&config.database_url).await?);
    recorder.ensure_table().await?;

    let mail_gateway = Arc::new(BrevoClient::from_config(&config)?);
    let push_gateway = Arc::new(FcmClient::from_config(&config).await?);

    let mail_sender = MailSender::from_config(&config, mail_gateway, recorder.clone());
    let push_sender = PushSender::from_config(&config, push_gateway, recorder.clone());

    let state = Arc::new(AppState {
        dispatcher: NotificationDispatcher::new(mail_sender, push_sender),
        health_checker: HealthChecker::new(recorder),
    });

    run_api_server(state, config.server_port).await
}
