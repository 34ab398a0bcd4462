//! Reports handlers

use axum::{
    extract::{
        rejection::{QueryRejection, StringRejection},
        Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use riskscore_core::BatchTable;

use crate::{AppState, AppError, AppResult};
use crate::models::{BatchReportResponse, ReportFormat, ReportQuery};

/// Score an uploaded CSV of events and return the risk report
pub async fn batch(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
    body: Result<String, StringRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let body = body?;
    let bundle = state.require_model()?;

    if body.trim().is_empty() {
        return Err(AppError::ValidationError("Empty upload, expected a CSV file".to_string()));
    }

    let table = BatchTable::read_csv(body.as_bytes())?;
    let report = riskscore_core::score_batch(&table, &bundle)?;

    match query.format.unwrap_or_default() {
        ReportFormat::Json => Ok(Json(BatchReportResponse::new(report)).into_response()),
        ReportFormat::Csv => {
            let csv = report.to_csv()?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"results.csv\""),
                ],
                csv,
            )
                .into_response())
        }
    }
}
