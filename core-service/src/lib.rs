//! Risk Scoring Core
//!
//! Behavioral anomaly scoring for user activity events:
//! - online path: per-user baseline + normalized deviation score
//! - batch path: pre-trained outlier model + fixed score thresholds
//!
//! Everything here is a pure function of its inputs; callers own the
//! baseline table and model bundle and may share them across threads.

pub mod logic;

pub use logic::baseline::{self, BaselineTable, UserBaseline, ZERO_EPSILON};
pub use logic::batch::{score_batch, BatchError, BatchReport, BatchRow, BatchSummary, BatchTable};
pub use logic::deviation::{score, score_with, DeviationDetails, ScoreError, Verdict};
pub use logic::events::{load_event_log, read_event_log, Event, EventLogError, HistoricalEvent};
pub use logic::model::{
    load_bundle, BatchRiskLevel, DeviationThresholds, FeatureScaler, ModelError, ModelInfo,
    OutlierModel, OutlierModelBundle, OutlierThresholds, RiskLevel,
};
