//! Prediction handlers

use axum::{extract::State, Json};
use validator::Validate;

use riskscore_core::{BatchTable, Event, Verdict};

use crate::{AppState, AppResult};
use crate::extract::AppJson;
use crate::models::{BatchReportResponse, PredictRequest};

/// Score one event against the user's baseline
pub async fn predict(
    State(state): State<AppState>,
    AppJson(req): AppJson<PredictRequest>,
) -> AppResult<Json<Verdict>> {
    req.validate()?;

    let event: Event = req.into();
    let baselines = state.baselines();
    let verdict = riskscore_core::score(&event, &baselines)?;

    tracing::debug!(
        "Prediction for {}: {:.3} ({})",
        verdict.user_id,
        verdict.anomaly_score,
        verdict.risk_level.as_str()
    );

    Ok(Json(verdict))
}

/// Score a JSON array of rows with the outlier model
pub async fn predict_batch(
    State(state): State<AppState>,
    AppJson(rows): AppJson<Vec<serde_json::Map<String, serde_json::Value>>>,
) -> AppResult<Json<BatchReportResponse>> {
    let bundle = state.require_model()?;
    let table = BatchTable::from_json_rows(&rows);
    let report = riskscore_core::score_batch(&table, &bundle)?;

    Ok(Json(BatchReportResponse::new(report)))
}
