use anyhow::{Result, anyhow};

use crate::models::message::{NotificationBody, NotificationRequest};

pub fn validate_device_id(device_id: &str) -> Result<()> {
    if device_id.is_empty() {
        return Err(anyhow!("Device ID cannot be empty"));
    }

    let valid_chars = device_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-');

    if !valid_chars {
        return Err(anyhow!("Invalid device ID"));
    }

    Ok(())
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(anyhow!(
            "{} must be between {} and {} characters long",
            field,
            min,
            max
        ));
    }
    Ok(())
}

fn validate_body(body: &NotificationBody) -> Result<()> {
    check_length("Header", &body.header, 30, 50)?;

    if let Some(subject) = &body.subject {
        check_length("Subject", subject, 60, 80)?;
    }

    check_length("Message", &body.message, 150, 200)
}

/// Intake checks run before content preparation. Channels the dispatcher relies on
/// must have their required fields: a subject for EMAIL, a device ID for PUSH.
pub fn validate_request(request: &NotificationRequest) -> Result<()> {
    let user = request
        .user_info
        .as_ref()
        .ok_or_else(|| anyhow!("User info is required"))?;
    let body = request
        .notification_body
        .as_ref()
        .ok_or_else(|| anyhow!("Notification body is required"))?;

    if user.username.trim().is_empty() {
        return Err(anyhow!("Username is required"));
    }

    if user.email.trim().is_empty() {
        return Err(anyhow!("Email is required"));
    }

    if !user.email.contains('@') {
        return Err(anyhow!("Invalid email format"));
    }

    if let Some(device_id) = &user.device_id {
        validate_device_id(device_id)?;
    }

    if request.requests_channel("EMAIL") && body.subject.is_none() {
        return Err(anyhow!("Subject is required for EMAIL notification type"));
    }

    if request.requests_channel("PUSH") && user.device_id.is_none() {
        return Err(anyhow!("Device ID is required for PUSH notification type"));
    }

    validate_body(body)
}
