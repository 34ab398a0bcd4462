//! Batch report models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use riskscore_core::BatchReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReportQuery {
    pub format: Option<ReportFormat>,
}

#[derive(Debug, Serialize)]
pub struct BatchReportResponse {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: BatchReport,
}

impl BatchReportResponse {
    pub fn new(report: BatchReport) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            report,
        }
    }
}
