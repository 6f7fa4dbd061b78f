//! Offline queue API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use storefront_core::{ActionRequest, OfflineAction, ReplayReport};
use tracing::info;

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct QueueListResponse {
    pub actions: Vec<OfflineAction>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ReplayResponse {
    #[serde(flatten)]
    pub report: ReplayReport,
    /// False when another replay pass already held the queue.
    pub ran: bool,
}

/// GET /api/v1/queue
pub async fn list_queue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QueueListResponse>, impl IntoResponse> {
    match state.queue().pending().await {
        Ok(actions) => {
            let count = actions.len();
            Ok(Json(QueueListResponse { actions, count }))
        }
        Err(e) => Err(ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

/// POST /api/v1/queue
///
/// Persist an outbound request for later replay.
pub async fn enqueue(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActionRequest>,
) -> Result<(StatusCode, Json<OfflineAction>), impl IntoResponse> {
    if request.url.trim().is_empty() {
        return Err(ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            "url must not be empty",
        ));
    }

    let action = OfflineAction::new(request);
    match state.queue().enqueue(action.clone()).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(action))),
        Err(e) => Err(ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

/// POST /api/v1/queue/replay
///
/// Run a replay pass now unless one is already running. The pass runs on its
/// own task and finishes even if the client disconnects.
pub async fn replay(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReplayResponse>, impl IntoResponse> {
    let pass = tokio::spawn(async move { state.queue().try_replay(state.executor()).await });

    match pass.await {
        Ok(Ok(Some(report))) => {
            info!(
                "Manual replay: {} processed, {} failed",
                report.processed, report.failed
            );
            Ok(Json(ReplayResponse { report, ran: true }))
        }
        Ok(Ok(None)) => Ok(Json(ReplayResponse {
            report: ReplayReport::default(),
            ran: false,
        })),
        Ok(Err(e)) => Err(ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e)),
        Err(e) => Err(ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

/// POST /api/v1/queue/drain
///
/// Remove and return every pending action without executing it.
pub async fn drain(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QueueListResponse>, impl IntoResponse> {
    match state.queue().drain().await {
        Ok(actions) => {
            let count = actions.len();
            Ok(Json(QueueListResponse { actions, count }))
        }
        Err(e) => Err(ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}
