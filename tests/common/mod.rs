use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use notification_dispatch::{
    clients::{brevo::MailGateway, database::DeadLetterRecorder, fcm::PushGateway},
    models::{
        dead_letter::DeadLetterRecord,
        fcm::FcmMessage,
        mail::{MailContact, MailPayload, MailReceipt},
        message::{NotificationBody, NotificationRequest, UserInfo, UserPreferences},
        retry::RetryConfig,
        status::DeliveryStatus,
    },
};

pub const HEADER: &str = "Your weekly account summary is ready";
pub const SUBJECT: &str = "Here is everything that happened on your account during the past week";
pub const MESSAGE: &str = "We have put together a summary of your recent activity, including new messages, upcoming payments and a few suggestions tailored to the way you use the app.";
pub const DEVICE_ID: &str = "device-7f3a9c21";

pub fn notification_request(channels: &[&str]) -> NotificationRequest {
    NotificationRequest {
        user_info: Some(UserInfo {
            user_id: "7d9c3f0e-2b1a-4c5d-9e8f-0a1b2c3d4e5f".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            device_id: Some(DEVICE_ID.to_string()),
            preferences: UserPreferences {
                notification_type: channels.iter().map(|c| c.to_string()).collect(),
                notification_enabled: true,
            },
        }),
        notification_body: Some(NotificationBody {
            header: HEADER.to_string(),
            subject: Some(SUBJECT.to_string()),
            message: MESSAGE.to_string(),
        }),
        html_string: Some("<p>Hi ada</p>".to_string()),
    }
}

pub fn sender_contact() -> MailContact {
    MailContact {
        name: "Dispatch".to_string(),
        email: "noreply@example.com".to_string(),
    }
}

/// Exact 1s/2s backoff; use with a paused clock.
pub fn production_retry() -> RetryConfig {
    RetryConfig::default()
}

/// Short real-time delays for tests that talk to a mock HTTP server.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay_ms: 10,
        max_delay_ms: 40,
        backoff_multiplier: 2,
        jitter: 0.0,
    }
}

#[derive(Default)]
pub struct MemoryRecorder {
    records: Mutex<Vec<DeadLetterRecord>>,
    failing: AtomicBool,
}

impl MemoryRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let recorder = Self::default();
        recorder.failing.store(true, Ordering::SeqCst);
        Arc::new(recorder)
    }

    pub fn records(&self) -> Vec<DeadLetterRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn with_status(&self, status: DeliveryStatus) -> Vec<DeadLetterRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.status == status)
            .collect()
    }
}

#[async_trait]
impl DeadLetterRecorder for MemoryRecorder {
    async fn record(&self, record: &DeadLetterRecord) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("Database write failed: connection refused"));
        }

        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.id == record.id) {
            return Err(anyhow!("duplicate key value violates unique constraint"));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

/// Push gateway that fails the first N sends per device token.
#[derive(Default)]
pub struct ScriptedPushGateway {
    failures: HashMap<String, u32>,
    attempts: Mutex<HashMap<String, u32>>,
    sent: Mutex<Vec<FcmMessage>>,
}

impl ScriptedPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_first(mut self, token: &str, failures: u32) -> Self {
        self.failures.insert(token.to_string(), failures);
        self
    }

    pub fn always_fail(self, token: &str) -> Self {
        self.fail_first(token, u32::MAX)
    }

    pub fn calls(&self) -> u32 {
        self.attempts.lock().unwrap().values().sum()
    }

    pub fn sent(&self) -> Vec<FcmMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushGateway for ScriptedPushGateway {
    async fn send(&self, message: &FcmMessage) -> Result<String, Error> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(message.token.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let failures = self.failures.get(&message.token).copied().unwrap_or(0);
        if attempt <= failures {
            return Err(anyhow!("FCM request failed: UNAVAILABLE"));
        }

        self.sent.lock().unwrap().push(message.clone());
        Ok(format!("projects/test/messages/{}-{}", message.token, attempt))
    }
}

#[derive(Default)]
pub struct RecordingMailGateway {
    payloads: Mutex<Vec<MailPayload>>,
}

impl RecordingMailGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payloads(&self) -> Vec<MailPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailGateway for RecordingMailGateway {
    async fn send(&self, payload: &MailPayload) -> Result<MailReceipt, Error> {
        let mut payloads = self.payloads.lock().unwrap();
        payloads.push(payload.clone());

        Ok(MailReceipt {
            message_id: format!("<mail-{}@smtp.example.com>", payloads.len()),
            summary: "201 Created".to_string(),
        })
    }
}
