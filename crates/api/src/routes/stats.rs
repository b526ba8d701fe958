//! Stats query endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use stats::{GameStats, UserStats};
use validator::Validate;

use crate::response::ApiError;
use crate::routes::run_blocking;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UserStatsQuery {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub user_id: String,
    /// Optional `YYYY-MM-DD` day filter.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GameStatsQuery {
    /// Optional `YYYY-MM-DD` day filter.
    pub date: Option<String>,
}

/// GET /user_stats?user_id=...&date=... - Per-user stats reply.
pub async fn user_stats_handler(
    State(state): State<AppState>,
    Query(query): Query<UserStatsQuery>,
) -> Result<Json<UserStats>, ApiError> {
    query.validate()?;
    let store = state.store.clone();
    let reply =
        run_blocking(move || stats::user_stats(&store, &query.user_id, query.date.as_deref()))
            .await?;
    Ok(Json(reply))
}

/// GET /game_stats?date=... - Game-wide stats reply.
pub async fn game_stats_handler(
    State(state): State<AppState>,
    Query(query): Query<GameStatsQuery>,
) -> Result<Json<GameStats>, ApiError> {
    let store = state.store.clone();
    let reply = run_blocking(move || stats::game_stats(&store, query.date.as_deref())).await?;
    Ok(Json(reply))
}
