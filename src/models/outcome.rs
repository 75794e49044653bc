use serde::Serialize;

/// What a channel sender reports for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "lines", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Message line followed by response line.
    Delivered(Vec<String>),
    /// Input contract violation, reported without retry or record.
    Rejected(String),
    /// Attempts exhausted, dead-letter record written.
    DeadLettered,
}

impl SendOutcome {
    pub fn lines(&self) -> Vec<String> {
        match self {
            SendOutcome::Delivered(lines) => lines.clone(),
            SendOutcome::Rejected(reason) => vec![reason.clone()],
            SendOutcome::DeadLettered => Vec::new(),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered(_))
    }
}
