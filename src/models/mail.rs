use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailContact {
    pub name: String,
    pub email: String,
}

/// Body of the transactional email send call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailPayload {
    pub sender: MailContact,
    pub to: Vec<MailContact>,
    pub subject: String,
    pub html_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MailReceipt {
    pub message_id: String,
    pub summary: String,
}
