use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChannelType {
    Email,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Success,
    DeadLetter,
}

impl ChannelType {
    /// Exact, case-sensitive match. Anything else is not a channel.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "EMAIL" => Some(ChannelType::Email),
            "PUSH" => Some(ChannelType::Push),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChannelType::Email => "EMAIL",
            ChannelType::Push => "PUSH",
        }
    }
}

impl DeliveryStatus {
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(DeliveryStatus::Success),
            "DEAD_LETTER" => Some(DeliveryStatus::DeadLetter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeliveryStatus::Success => "SUCCESS",
            DeliveryStatus::DeadLetter => "DEAD_LETTER",
        }
    }
}

impl Display for ChannelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}
