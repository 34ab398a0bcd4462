//! Baseline handlers

use axum::{extract::{Path, State}, Json};
use chrono::Utc;

use riskscore_core::{baseline, load_event_log};

use crate::{AppState, AppError, AppResult};
use crate::models::{BaselineResponse, RebuildBaselineResponse};

/// Get a single user's baseline
pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<BaselineResponse>> {
    let baselines = state.baselines();
    let profile = baselines
        .get(&user_id)
        .copied()
        .ok_or_else(|| AppError::UserNotFound(user_id.clone()))?;

    Ok(Json(BaselineResponse {
        user_id,
        baseline: profile,
    }))
}

/// Rebuild every baseline from the configured event log
pub async fn rebuild(
    State(state): State<AppState>,
) -> AppResult<Json<RebuildBaselineResponse>> {
    let path = state.config.event_log_path.clone();

    let (table, events) = tokio::task::spawn_blocking(move || {
        load_event_log(&path).map(|events| (baseline::build(&events), events.len()))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Rebuild task failed: {}", e)))??;

    let users = table.len();
    state.replace_baselines(table);

    tracing::info!("Baselines rebuilt: {} users from {} events", users, events);

    Ok(Json(RebuildBaselineResponse {
        users,
        events,
        rebuilt_at: Utc::now(),
    }))
}
