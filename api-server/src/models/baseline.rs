//! Baseline models

use serde::Serialize;
use chrono::{DateTime, Utc};

use riskscore_core::UserBaseline;

#[derive(Debug, Serialize)]
pub struct BaselineResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub baseline: UserBaseline,
}

#[derive(Debug, Serialize)]
pub struct RebuildBaselineResponse {
    pub users: usize,
    pub events: usize,
    pub rebuilt_at: DateTime<Utc>,
}
