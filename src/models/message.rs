use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub user_info: Option<UserInfo>,
    pub notification_body: Option<NotificationBody>,

    /// Rendered email body, filled in by content preparation when EMAIL is requested.
    #[serde(default, alias = "HTMLString")]
    pub html_string: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub username: String,
    pub email: String,

    #[serde(default)]
    pub device_id: Option<String>,

    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Channel tokens in dispatch order, e.g. `["EMAIL", "PUSH"]`.
    pub notification_type: Vec<String>,
    pub notification_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    pub header: String,

    #[serde(default)]
    pub subject: Option<String>,

    pub message: String,
}

impl NotificationRequest {
    pub fn channel_tokens(&self) -> &[String] {
        self.user_info
            .as_ref()
            .map(|user| user.preferences.notification_type.as_slice())
            .unwrap_or_default()
    }

    pub fn requests_channel(&self, token: &str) -> bool {
        self.channel_tokens().iter().any(|t| t == token)
    }
}
