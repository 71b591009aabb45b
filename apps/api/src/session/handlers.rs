use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::criteria::SearchCriteria;
use crate::session::wait::{PollPolicy, WaitOutcome};
use crate::session::{SessionSnapshot, SessionStatus};
use crate::state::AppState;

/// Longest a single wait request may block.
const MAX_WAIT_SECS: u64 = 30;

#[derive(Serialize, Deserialize)]
pub struct StartSearchResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
}

#[derive(Deserialize)]
pub struct WaitQuery {
    pub timeout_secs: Option<u64>,
}

/// POST /api/v1/searches
pub async fn handle_start_search(
    State(state): State<AppState>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<(StatusCode, Json<StartSearchResponse>), AppError> {
    let snapshot = state.sessions.start(criteria).await?;
    Ok((
        StatusCode::CREATED,
        Json(StartSearchResponse {
            session_id: snapshot.session_id,
            status: snapshot.status,
        }),
    ))
}

/// GET /api/v1/searches/:id/status
pub async fn handle_search_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.status(id).await?))
}

/// GET /api/v1/searches/:id/result
pub async fn handle_search_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let report = state.sessions.result(id).await?;
    Ok(Json(report.as_ref()).into_response())
}

/// GET /api/v1/searches/:id/wait?timeout_secs=N
/// 200 once settled, 202 with the latest snapshot if the deadline passed first.
pub async fn handle_search_wait(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<WaitQuery>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let secs = query.timeout_secs.unwrap_or(MAX_WAIT_SECS).min(MAX_WAIT_SECS);
    let policy = PollPolicy {
        timeout: Duration::from_secs(secs),
        ..PollPolicy::default()
    };
    let outcome = state.sessions.wait(id, policy).await?;
    let status = match outcome {
        WaitOutcome::Settled(_) => StatusCode::OK,
        WaitOutcome::TimedOut(_) => StatusCode::ACCEPTED,
    };
    Ok((status, Json(outcome.snapshot().clone())))
}
