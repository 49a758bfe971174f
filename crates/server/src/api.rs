//! JSON API for the chat front end. Conversation history lives with the
//! client; every request is resolved independently.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tally_agent::{QueryResolver, ResolutionOutcome, UploadedRows};
use tally_core::{DatasetSummary, InterfaceError, Row};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    resolver: QueryResolver,
}

impl ApiState {
    pub fn new(resolver: QueryResolver) -> Self {
        Self { resolver }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    #[serde(default)]
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    #[serde(default)]
    pub rows: Vec<Row>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/query", post(query))
        .route("/api/transcript", post(transcript))
        .route("/api/upload", post(upload))
        .route("/api/dataset", get(dataset))
        .with_state(state)
}

pub async fn query(
    State(state): State<ApiState>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<ResolutionOutcome> {
    answer(&state, &request.question, "question").await
}

/// Voice transcripts are answered exactly like typed questions.
pub async fn transcript(
    State(state): State<ApiState>,
    Json(request): Json<TranscriptRequest>,
) -> ApiResult<ResolutionOutcome> {
    answer(&state, &request.transcript, "transcript").await
}

pub async fn upload(
    State(state): State<ApiState>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<ResolutionOutcome> {
    if request.filename.trim().is_empty() {
        return Err(bad_request("filename must not be empty"));
    }

    let upload = UploadedRows::new(request.filename, request.rows);
    info!(
        event_name = "api.upload.received",
        filename = %upload.filename,
        rows = upload.rows.len(),
        "upload received"
    );
    answer(&state, &upload.announcement(), "upload").await
}

pub async fn dataset(State(state): State<ApiState>) -> Json<DatasetSummary> {
    Json(state.resolver.dataset().summary())
}

async fn answer(state: &ApiState, text: &str, field: &str) -> ApiResult<ResolutionOutcome> {
    let text = text.trim();
    if text.is_empty() {
        return Err(bad_request(format!("{field} must not be empty")));
    }

    Ok(Json(state.resolver.resolve_query(text).await))
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    let interface = InterfaceError::bad_request(message, Uuid::new_v4().to_string());
    warn!(
        event_name = "api.request.rejected",
        correlation_id = %interface.correlation_id(),
        error = %interface,
        "request rejected"
    );
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: interface.to_string(),
            correlation_id: interface.correlation_id().to_string(),
        }),
    )
}
