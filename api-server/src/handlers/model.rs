//! Model info handler

use axum::{extract::State, Json};

use riskscore_core::ModelInfo;

use crate::{AppState, AppResult};

/// Describe the loaded outlier model
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelInfo>> {
    let bundle = state.require_model()?;
    Ok(Json(bundle.info()))
}
