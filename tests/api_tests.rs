use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use notification_dispatch::{
    api::{AppState, router},
    clients::health::HealthChecker,
    dispatcher::NotificationDispatcher,
    models::message::NotificationRequest,
    senders::{MailSender, PushSender},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::{
    HEADER, MESSAGE, MemoryRecorder, RecordingMailGateway, ScriptedPushGateway, fast_retry,
    notification_request, sender_contact,
};

struct TestApp {
    state: Arc<AppState>,
    mail_gateway: Arc<RecordingMailGateway>,
    push_gateway: Arc<ScriptedPushGateway>,
}

fn test_app(recorder: Arc<MemoryRecorder>) -> TestApp {
    let mail_gateway = Arc::new(RecordingMailGateway::new());
    let push_gateway = Arc::new(ScriptedPushGateway::new());

    let mail_sender = MailSender::new(
        mail_gateway.clone(),
        recorder.clone(),
        sender_contact(),
        fast_retry(),
    );
    let push_sender = PushSender::new(push_gateway.clone(), recorder.clone(), fast_retry());

    let state = Arc::new(AppState {
        dispatcher: NotificationDispatcher::new(mail_sender, push_sender),
        health_checker: HealthChecker::new(recorder),
    });

    TestApp {
        state,
        mail_gateway,
        push_gateway,
    }
}

fn post_notification(request: &NotificationRequest) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/notifications")
        .header("content-type", "application/json")
        .header("origin", "https://app.example.com")
        .body(Body::from(serde_json::to_vec(request)?))?)
}

async fn json_body(response: axum::response::Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Test: A valid request is prepared, dispatched and answered per channel
#[tokio::test]
async fn test_send_notification_dispatches_all_channels() -> Result<()> {
    let app = test_app(MemoryRecorder::new());
    let mut request = notification_request(&["EMAIL", "PUSH"]);
    request.html_string = None;

    let response = router(app.state.clone())
        .oneshot(post_notification(&request)?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0][0], "Message :<mail-1@smtp.example.com>");
    assert_eq!(data[1][0], "Message :Successfully sent message");

    let payloads = app.mail_gateway.payloads();
    let html = payloads[0].html_content.as_deref().unwrap();
    assert!(html.contains("Hi ada, "));
    assert!(html.contains(r#"href="https://app.example.com""#));

    let pushed = app.push_gateway.sent();
    assert_eq!(pushed[0].notification.title, format!("ada, {}", HEADER));

    Ok(())
}

/// Test: EMAIL without a subject is rejected before dispatch
#[tokio::test]
async fn test_email_without_subject_is_bad_request() -> Result<()> {
    let app = test_app(MemoryRecorder::new());
    let mut request = notification_request(&["EMAIL"]);
    request.notification_body.as_mut().unwrap().subject = None;

    let response = router(app.state.clone())
        .oneshot(post_notification(&request)?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Subject is required for EMAIL notification type");
    assert!(app.mail_gateway.payloads().is_empty());

    Ok(())
}

/// Test: PUSH without a device id is rejected before dispatch
#[tokio::test]
async fn test_push_without_device_is_bad_request() -> Result<()> {
    let app = test_app(MemoryRecorder::new());
    let mut request = notification_request(&["PUSH"]);
    request.user_info.as_mut().unwrap().device_id = None;

    let response = router(app.state.clone())
        .oneshot(post_notification(&request)?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.push_gateway.calls(), 0);

    Ok(())
}

/// Test: A body that leaves a template placeholder unfilled is unprocessable
#[tokio::test]
async fn test_unrenderable_content_is_unprocessable() -> Result<()> {
    let app = test_app(MemoryRecorder::new());
    let mut request = notification_request(&["EMAIL"]);
    request.notification_body.as_mut().unwrap().message = format!("{} {{{{code}}}}", MESSAGE);

    let response = router(app.state.clone())
        .oneshot(post_notification(&request)?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing variable in template: {{code}}");
    assert!(app.mail_gateway.payloads().is_empty());

    Ok(())
}

/// Test: Recorder failure is reported as a server error
#[tokio::test]
async fn test_recorder_failure_is_server_error() -> Result<()> {
    let app = test_app(MemoryRecorder::failing());
    let request = notification_request(&["PUSH"]);

    let response = router(app.state.clone())
        .oneshot(post_notification(&request)?)
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}

/// Test: Health reflects the recorder store
#[tokio::test]
async fn test_health_reflects_recorder() -> Result<()> {
    let healthy = test_app(MemoryRecorder::new());
    let response = router(healthy.state.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["checks"]["database"]["status"], "healthy");

    let unhealthy = test_app(MemoryRecorder::failing());
    let response = router(unhealthy.state.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    Ok(())
}
