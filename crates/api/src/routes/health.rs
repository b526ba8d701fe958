//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use telemetry::{health, metrics, ComponentHealthReport, HealthStatus, MetricsSnapshot};

use crate::response::ApiError;
use crate::routes::run_blocking;
use crate::state::AppState;

/// Full health reply: component health plus a metrics snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub store_reachable: bool,
    pub schema_ready: bool,
    pub components: Vec<ComponentHealthReport>,
    pub metrics: MetricsSnapshot,
}

/// GET /health - Full health check with a live store probe.
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let store = state.store.clone();
    let (reachable, schema_ready) =
        run_blocking(move || Ok((store.ping(), store.schema_ready()))).await?;

    if reachable {
        health().store.set_healthy();
    } else {
        health().store.set_unhealthy("store ping failed");
    }

    let report = health().report();
    Ok(Json(HealthResponse {
        status: report.status,
        store_reachable: reachable,
        schema_ready,
        components: report.components,
        metrics: metrics().snapshot(),
    }))
}

/// GET /health/ready - Readiness probe (can accept traffic).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    StatusCode::OK
}
