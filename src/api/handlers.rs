//! Request handlers. Thin: decode, call the service, encode. Anything that
//! touches the history file runs on the blocking pool.

use super::error::ApiResult;
use super::state::AppState;
use crate::service::{Stats, Status};
use crate::session::Session;
use crate::stress::ClassificationResult;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub success: bool,
    pub session_id: String,
    pub model_available: bool,
    pub message: String,
}

/// Start a monitoring session. The body is optional.
pub async fn start_session(
    State(state): State<AppState>,
    body: Option<Json<StartSessionRequest>>,
) -> Json<StartSessionResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session_id = state.service.sessions().start(request.session_id);
    Json(StartSessionResponse {
        success: true,
        session_id,
        model_available: state.service.model().is_available(),
        message: "session started".to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RecordEventsRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordEventsResponse {
    pub success: bool,
    pub events_recorded: usize,
    pub total_events: usize,
}

pub async fn record_events(
    State(state): State<AppState>,
    payload: Result<Json<RecordEventsRequest>, JsonRejection>,
) -> ApiResult<Json<RecordEventsResponse>> {
    let Json(request) = payload?;
    let session_id = request.session_id.unwrap_or_default();
    let (events_recorded, total_events) = state
        .service
        .sessions()
        .record_events(&session_id, request.events)?;
    Ok(Json(RecordEventsResponse {
        success: true,
        events_recorded,
        total_events,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: Session,
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.service.sessions().get(&id)?;
    Ok(Json(SessionResponse {
        success: true,
        session,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub features: Map<String, Value>,
}

/// Classify client metrics. Always 200; failures are described in the body.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<ClassificationResult>> {
    let Json(request) = payload?;
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || {
        service.analyze(&request.features, request.session_id.as_deref())
    })
    .await?;
    Ok(Json(result))
}

pub async fn test_analysis(State(state): State<AppState>) -> Json<ClassificationResult> {
    Json(state.service.analyze_sample())
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<ClassificationResult>,
    pub total: usize,
}

/// Most recent `limit` results, most recent last. Unparseable limits use the default.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let limit = query
        .limit
        .and_then(|l| l.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_HISTORY_LIMIT);
    let service = state.service.clone();
    let (data, total) = tokio::task::spawn_blocking(move || {
        let log = service.history();
        (log.read_recent(limit), log.total())
    })
    .await?;
    Ok(Json(HistoryResponse {
        success: true,
        data,
        total,
    }))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: Stats,
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let service = state.service.clone();
    let stats = tokio::task::spawn_blocking(move || service.stats()).await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: Status,
    pub timestamp: String,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        status: state.service.status(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub model_loaded: bool,
    pub total_sessions: usize,
}

pub async fn api_test(State(state): State<AppState>) -> Json<TestResponse> {
    Json(TestResponse {
        success: true,
        message: "API running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        model_loaded: state.service.model().is_available(),
        total_sessions: state.service.sessions().len(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub timestamp: String,
    pub version: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.service.model().is_available(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: &[
            "POST /api/start_session",
            "POST /api/record_events",
            "GET /api/session/:id",
            "POST /api/analyze",
            "GET|POST /api/test_analysis",
            "GET /api/history?limit=N",
            "GET /api/stats",
            "GET /api/status",
            "GET /api/test",
            "GET /health",
        ],
    })
}
