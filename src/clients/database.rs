use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::{
    dead_letter::DeadLetterRecord,
    status::{ChannelType, DeliveryStatus},
};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS failed_notifications (
    id UUID PRIMARY KEY,
    channel_type TEXT NOT NULL,
    recipient TEXT NOT NULL,
    original_payload TEXT NOT NULL,
    attempt_count INTEGER NOT NULL,
    last_attempt TIMESTAMPTZ NOT NULL,
    failure_reason TEXT,
    failed_at TIMESTAMPTZ,
    status TEXT NOT NULL
)
"#;

/// Append-only store of channel send outcomes.
///
/// Implementations only ever insert. Ids are generated by the caller, so
/// concurrent appends never collide.
#[async_trait]
pub trait DeadLetterRecorder: Send + Sync {
    async fn record(&self, record: &DeadLetterRecord) -> Result<(), Error>;

    /// Fails when the backing store cannot be reached.
    async fn health_check(&self) -> Result<(), Error>;
}

pub struct PostgresRecorder {
    client: Client,
}

impl PostgresRecorder {
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        info!("Connecting to PostgreSQL database");

        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection error");
            }
        });

        info!("PostgreSQL connection established");

        Ok(Self { client })
    }

    pub async fn ensure_table(&self) -> Result<(), Error> {
        self.client
            .batch_execute(CREATE_TABLE)
            .await
            .map_err(|e| anyhow!("Failed to create failed_notifications table: {}", e))?;

        Ok(())
    }

    pub async fn find(&self, id: &Uuid) -> Result<Option<DeadLetterRecord>, Error> {
        let row = self
            .client
            .query_opt(
                r#"
                SELECT id, channel_type, recipient, original_payload, attempt_count,
                       last_attempt, failure_reason, failed_at, status
                FROM failed_notifications
                WHERE id = $1
                "#,
                &[id],
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let channel_type: String = row.get("channel_type");
        let status: String = row.get("status");

        Ok(Some(DeadLetterRecord {
            id: row.get("id"),
            channel_type: ChannelType::from_token(&channel_type)
                .ok_or_else(|| anyhow!("Unknown channel type '{}'", channel_type))?,
            recipient: row.get("recipient"),
            original_payload: row.get("original_payload"),
            attempt_count: row.get("attempt_count"),
            last_attempt: row.get("last_attempt"),
            failure_reason: row.get("failure_reason"),
            failed_at: row.get("failed_at"),
            status: DeliveryStatus::from_stored(&status)
                .ok_or_else(|| anyhow!("Unknown record status '{}'", status))?,
        }))
    }
}

#[async_trait]
impl DeadLetterRecorder for PostgresRecorder {
    async fn record(&self, record: &DeadLetterRecord) -> Result<(), Error> {
        let channel_type = record.channel_type.as_str();
        let status = record.status.as_str();

        self.client
            .execute(
                r#"
                INSERT INTO failed_notifications (
                    id,
                    channel_type,
                    recipient,
                    original_payload,
                    attempt_count,
                    last_attempt,
                    failure_reason,
                    failed_at,
                    status
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
                &[
                    &record.id,
                    &channel_type,
                    &record.recipient,
                    &record.original_payload,
                    &record.attempt_count,
                    &record.last_attempt,
                    &record.failure_reason,
                    &record.failed_at,
                    &status,
                ],
            )
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    record_id = %record.id,
                    channel = %channel_type,
                    "Failed to write notification record to database"
                );
                anyhow!("Database write failed: {}", e)
            })?;

        debug!(
            record_id = %record.id,
            channel = %channel_type,
            status = %status,
            "Notification record written to database"
        );

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| anyhow!("Database health check failed: {}", e))?;

        Ok(())
    }
}
