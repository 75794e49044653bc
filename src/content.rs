use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use tracing::{debug, warn};

use crate::models::message::NotificationRequest;

const EMAIL_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 24px;">
    <div style="max-width: 600px; margin: 0 auto; background: #ffffff; padding: 24px; border-radius: 8px;">
      <p style="font-size: 16px; color: #333333;">{{body}}</p>
      <a href="{{button_url}}" style="display: inline-block; padding: 12px 24px; background-color: #1a73e8; color: #ffffff; text-decoration: none; border-radius: 4px;">Open</a>
    </div>
  </body>
</html>
"#;

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn replace_variables(template: &str, variables: &HashMap<&str, String>) -> Result<String, Error> {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, &escape_html(value));
    }

    if let Some(start) = result.find("{{") {
        if let Some(offset) = result[start..].find("}}") {
            let missing_var = &result[start..start + offset + 2];

            warn!(
                missing_variable = %missing_var,
                "Template contains unreplaced variable"
            );

            return Err(anyhow!("Missing variable in template: {}", missing_var));
        }
    }

    Ok(result)
}

/// Renders the email body for the request's user.
pub fn build_html(request: &NotificationRequest, button_url: Option<&str>) -> Result<String, Error> {
    let user = request
        .user_info
        .as_ref()
        .ok_or_else(|| anyhow!("User info is missing in the notification request"))?;
    let body = request
        .notification_body
        .as_ref()
        .ok_or_else(|| anyhow!("Notification body is missing in the notification request"))?;

    let variables = HashMap::from([
        ("body", format!("Hi {}, {}", user.username, body.message)),
        ("button_url", button_url.unwrap_or_default().to_string()),
    ]);

    let html = replace_variables(EMAIL_TEMPLATE, &variables)?;
    debug!(username = %user.username, "Email content rendered");

    Ok(html)
}

/// Puts the username into the push header and message, in place.
pub fn personalize_push(request: &mut NotificationRequest) -> Result<(), Error> {
    let username = request
        .user_info
        .as_ref()
        .map(|user| user.username.clone())
        .ok_or_else(|| anyhow!("User info is missing in the notification request"))?;
    let body = request
        .notification_body
        .as_mut()
        .ok_or_else(|| anyhow!("Notification body is missing in the notification request"))?;

    body.header = format!("{}, {}", username, body.header);
    body.message = format!("Hi {}, {}", username, body.message);

    Ok(())
}

/// Renders HTML when EMAIL is requested and personalizes the body once when PUSH
/// is requested.
pub fn prepare(request: &mut NotificationRequest, button_url: Option<&str>) -> Result<(), Error> {
    if request.requests_channel("EMAIL") {
        let html = build_html(request, button_url)?;
        request.html_string = Some(html);
    }

    if request.requests_channel("PUSH") {
        personalize_push(request)?;
    }

    Ok(())
}
