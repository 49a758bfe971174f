use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tally_core::config::RemoteConfig;

#[derive(Clone, Debug)]
pub struct HealthState {
    remote_configured: bool,
    dataset_deals: usize,
}

impl HealthState {
    pub fn new(remote: &RemoteConfig, dataset_deals: usize) -> Self {
        Self { remote_configured: remote.active_url().is_some(), dataset_deals }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub remote: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// The remote tier is optional, so its state never degrades the service.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let remote = if state.remote_configured {
        HealthCheck { status: "configured", detail: "remote analysis webhook enabled".to_string() }
    } else {
        HealthCheck {
            status: "local_only",
            detail: "no webhook configured; answering from the bundled dataset".to_string(),
        }
    };

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: format!("tally-server serving {} deals", state.dataset_deals),
        },
        remote,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
