use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::ORIGIN},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    clients::health::HealthChecker,
    content,
    dispatcher::NotificationDispatcher,
    models::{
        health::HealthStatus, message::NotificationRequest, response::ApiResponse,
        validation::validate_request,
    },
};

pub struct AppState {
    pub dispatcher: NotificationDispatcher,
    pub health_checker: HealthChecker,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/notifications", post(send_notification))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(state: Arc<AppState>, port: u16) -> Result<(), anyhow::Error> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification dispatch server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn send_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut request): Json<NotificationRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_request(&request) {
        warn!(error = %e, "Notification request rejected");
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Vec<Vec<String>>>::error(
                e.to_string(),
                "Invalid notification request".to_string(),
            )),
        );
    }

    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());

    if let Err(e) = content::prepare(&mut request, origin) {
        warn!(error = %e, "Content preparation failed");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(
                e.to_string(),
                "Error in building content".to_string(),
            )),
        );
    }

    match state.dispatcher.dispatch(&request).await {
        Ok(outcomes) => {
            let results: Vec<Vec<String>> = outcomes.iter().map(|o| o.lines()).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    results,
                    "Notification dispatched".to_string(),
                )),
            )
        }
        Err(e) => {
            error!(error = %e, "Notification dispatch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    e.to_string(),
                    "Error processing notification".to_string(),
                )),
            )
        }
    }
}
