//! kubepulse-api — HTTP surface for kubepulse.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition of every gauge |
//! | GET | `/healthz` | Liveness probe |
//! | GET | `/api/v1/cluster` | Last cluster health snapshot and loop status |
//! | GET | `/api/v1/autoscaler` | Replica counter, policy and last decision |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use kubepulse_autoscale::AutoscaleEngine;
use kubepulse_health::HealthHandle;
use kubepulse_metrics::GaugeRegistry;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<GaugeRegistry>,
    pub health: HealthHandle,
    pub autoscaler: Arc<AutoscaleEngine>,
}

/// Build the complete router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/cluster", get(handlers::cluster_health))
        .route("/autoscaler", get(handlers::autoscaler_status));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
