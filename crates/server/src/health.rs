use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use standup_core::StandupDispatcher;
use tracing::error;

#[derive(Clone)]
pub struct HealthState {
    dispatcher: Arc<StandupDispatcher>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_interviews: Option<usize>,
    pub report_channel_configured: bool,
    pub checked_at: String,
}

pub fn router(dispatcher: Arc<StandupDispatcher>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { dispatcher })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let active_interviews = match state.dispatcher.active_interviews().await {
        Ok(count) => Some(count),
        Err(error) => {
            error!(
                event_name = "system.health.store_failed",
                error = %error,
                "failed to count active interviews"
            );
            None
        }
    };
    let ready = active_interviews.is_some();

    let payload = HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        active_interviews,
        report_channel_configured: state.dispatcher.report_channel().is_configured().await,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}
