//! Logic Module - Scoring Engines
//!
//! ## Architecture
//! - `events` - activity event records and historical log loading
//! - `baseline/` - per-user profiles built from the historical log
//! - `deviation` - online scorer (event vs. user baseline)
//! - `model/` - outlier model interface, bundled implementation, thresholds
//! - `batch/` - batch scorer and report

pub mod events;
pub mod baseline;
pub mod deviation;
pub mod model;
pub mod batch;
