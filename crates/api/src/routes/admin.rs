//! Administrative reload endpoints.
//!
//! `/initialize` runs the four-step reload in one call; the `/admin/*`
//! routes expose the same steps individually.

use axum::{extract::State, Json};
use matchday_core::BatchReport;
use pipeline::{InitializeReport, RecomputeReport};
use tracing::info;

use crate::response::{ApiError, ReferenceResponse, StatusResponse};
use crate::routes::run_blocking;
use crate::state::AppState;

/// GET /initialize - Reset, load reference data, ingest the event file,
/// recompute sessions.
pub async fn initialize_handler(
    State(state): State<AppState>,
) -> Result<Json<InitializeReport>, ApiError> {
    let store = state.store.clone();
    let paths = state.paths.clone();
    let cancel = state.recompute_cancel.clone();

    let report = run_blocking(move || {
        pipeline::initialize(&store, &paths.events, &paths.timezones, &cancel)
    })
    .await?;

    Ok(Json(report))
}

/// POST /admin/reset - Drop and recreate all tables.
pub async fn reset_handler(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let store = state.store.clone();
    run_blocking(move || store.reset()).await?;
    info!("Store reset via admin endpoint");
    Ok(Json(StatusResponse::ok("reset")))
}

/// POST /admin/reference - Reload the timezone reference file.
pub async fn reference_handler(
    State(state): State<AppState>,
) -> Result<Json<ReferenceResponse>, ApiError> {
    let store = state.store.clone();
    let path = state.paths.timezones.clone();
    let countries = run_blocking(move || pipeline::load_reference_file(&store, &path)).await?;
    Ok(Json(ReferenceResponse::loaded(countries)))
}

/// POST /admin/ingest - Ingest the configured event file.
pub async fn ingest_handler(
    State(state): State<AppState>,
) -> Result<Json<BatchReport>, ApiError> {
    let store = state.store.clone();
    let path = state.paths.events.clone();
    let report = run_blocking(move || pipeline::ingest_file(&store, &path)).await?;
    Ok(Json(report))
}

/// POST /admin/recompute - Batch-recompute all session assignments.
pub async fn recompute_handler(
    State(state): State<AppState>,
) -> Result<Json<RecomputeReport>, ApiError> {
    let store = state.store.clone();
    let cancel = state.recompute_cancel.clone();
    let report = run_blocking(move || pipeline::recompute_all(&store, &cancel)).await?;
    Ok(Json(report))
}
