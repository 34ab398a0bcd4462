//! Online Deviation Scorer
//!
//! Scores one incoming event against the owning user's baseline: the sum of
//! the three normalized absolute deviations (latitude, longitude, daily
//! logins), mapped to a risk tier by [`DeviationThresholds`].

use serde::{Deserialize, Serialize};

use crate::logic::baseline::{BaselineTable, UserBaseline};
use crate::logic::events::Event;
use crate::logic::model::{DeviationThresholds, RiskLevel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("user_not_found: {0}")]
    UserNotFound(String),
}

/// Per-feature normalized deviations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationDetails {
    pub lat_diff: f64,
    pub lon_diff: f64,
    pub login_diff: f64,
}

impl DeviationDetails {
    pub fn total(&self) -> f64 {
        self.lat_diff + self.lon_diff + self.login_diff
    }
}

/// Scoring outcome for a single event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub user_id: String,
    pub anomaly_score: f64,
    pub risk_level: RiskLevel,
    pub details: DeviationDetails,
}

/// Score with the default thresholds
pub fn score(event: &Event, baselines: &BaselineTable) -> Result<Verdict, ScoreError> {
    score_with(event, baselines, &DeviationThresholds::default())
}

pub fn score_with(
    event: &Event,
    baselines: &BaselineTable,
    thresholds: &DeviationThresholds,
) -> Result<Verdict, ScoreError> {
    let baseline = baselines
        .get(&event.user_id)
        .ok_or_else(|| ScoreError::UserNotFound(event.user_id.clone()))?;

    let details = deviations(event, baseline);
    let anomaly_score = details.total();
    let risk_level = thresholds.classify(anomaly_score);

    log::debug!(
        "Scored event for {}: {:.4} ({})",
        event.user_id,
        anomaly_score,
        risk_level.as_str()
    );

    Ok(Verdict {
        user_id: event.user_id.clone(),
        anomaly_score,
        risk_level,
        details,
    })
}

/// `|value - mean| / std` for each feature
pub fn deviations(event: &Event, baseline: &UserBaseline) -> DeviationDetails {
    DeviationDetails {
        lat_diff: (event.location_lat - baseline.lat_mean).abs() / baseline.lat_std,
        lon_diff: (event.location_lon - baseline.lon_mean).abs() / baseline.lon_std,
        login_diff: (event.login_count_day as f64 - baseline.login_mean).abs() / baseline.login_std,
    }
}
