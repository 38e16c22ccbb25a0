use super::state::AppState;
use crate::sensing::{MetricsBatch, PermissionState};
use crate::session::{AccumulatedStats, SessionError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StartMonitoringResponse {
    pub session_id: Option<String>,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StopMonitoringResponse {
    pub session_id: Option<String>,
    pub status: String,
    pub message: String,
    pub stats: AccumulatedStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PushMetricsResponse {
    /// False when monitoring is off and the batch was discarded
    pub accepted: bool,
    pub stats: AccumulatedStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetPermissionRequest {
    pub state: PermissionState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /vitals/start
/// Start vitals monitoring
pub async fn start_monitoring(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.start().await {
        Ok(()) => {
            let snapshot = state.service.snapshot().await;
            info!("Monitoring started via API");

            (
                StatusCode::OK,
                Json(StartMonitoringResponse {
                    session_id: snapshot.session_id,
                    status: "enabled".to_string(),
                    message: "Vitals monitoring started".to_string(),
                }),
            )
                .into_response()
        }
        Err(e @ SessionError::PermissionDenied) => {
            warn!("Start rejected: {}", e);
            (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /vitals/stop
/// Stop vitals monitoring and return the session summary
pub async fn stop_monitoring(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.service.stop().await;
    let snapshot = state.service.snapshot().await;

    info!("Monitoring stopped via API");

    (
        StatusCode::OK,
        Json(StopMonitoringResponse {
            session_id: snapshot.session_id,
            status: "disabled".to_string(),
            message: "Vitals monitoring stopped".to_string(),
            stats,
        }),
    )
}

/// GET /vitals/status
/// Get session state and current stats
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.service.snapshot().await))
}

/// POST /vitals/metrics
/// Push a metrics batch as if it came from the sensing feed
pub async fn push_metrics(
    State(state): State<AppState>,
    Json(batch): Json<MetricsBatch>,
) -> impl IntoResponse {
    let result = state.service.push_batch(&batch).await;
    let stats = match result {
        Some(stats) => stats,
        None => state.service.snapshot().await.stats,
    };

    (
        StatusCode::OK,
        Json(PushMetricsResponse {
            accepted: result.is_some(),
            stats,
        }),
    )
}

/// PUT /vitals/permission
/// Record the camera permission decided out-of-band
pub async fn set_permission(
    State(state): State<AppState>,
    Json(req): Json<SetPermissionRequest>,
) -> impl IntoResponse {
    state.service.set_permission_state(req.state).await;
    (StatusCode::OK, Json(state.service.snapshot().await))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
