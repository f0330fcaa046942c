//! HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// GET /api/v1/cluster
///
/// Serves the last good snapshot even while the source is failing; the
/// `stale` flag and `last_error` say so.
pub async fn cluster_health(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.health.view().await)
}

/// GET /api/v1/autoscaler
pub async fn autoscaler_status(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.autoscaler.status().await)
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = kubepulse_metrics::render_prometheus(&state.registry.readings());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
