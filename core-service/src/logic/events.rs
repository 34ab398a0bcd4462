//! Activity Events - input records for both scoring paths
//!
//! `Event` is the flat record the online scorer receives per request.
//! `HistoricalEvent` is one row of the historical log the baseline
//! profiler is built from.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("Event log not found: {0}")]
    NotFound(String),

    #[error("Failed to read event log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse event log: {0}")]
    Csv(#[from] csv::Error),
}

// ============================================================================
// RECORDS
// ============================================================================

/// A single user activity event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub user_id: String,
    pub location_lat: f64,
    pub location_lon: f64,
    pub login_count_day: u32,
}

/// One row of the historical event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub user_id: String,
    pub location_lat: f64,
    pub location_lon: f64,
    pub login_count_day: u32,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

impl HistoricalEvent {
    pub fn new(user_id: &str, lat: f64, lon: f64, login_count_day: u32) -> Self {
        Self {
            user_id: user_id.to_string(),
            location_lat: lat,
            location_lon: lon,
            login_count_day,
            timestamp: None,
        }
    }
}

impl From<HistoricalEvent> for Event {
    fn from(e: HistoricalEvent) -> Self {
        Self {
            user_id: e.user_id,
            location_lat: e.location_lat,
            location_lon: e.location_lon,
            login_count_day: e.login_count_day,
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]`
/// and bare dates. Empty cells are treated as absent.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn deserialize_opt_timestamp<'de, D>(d: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(d)?;
    match opt {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s))),
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load the historical event log from a CSV file
pub fn load_event_log(path: &Path) -> Result<Vec<HistoricalEvent>, EventLogError> {
    if !path.exists() {
        return Err(EventLogError::NotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let events = read_event_log(BufReader::new(file))?;

    log::info!("Loaded {} historical events from {}", events.len(), path.display());
    Ok(events)
}

/// Parse a CSV event log. Columns are matched by header name; extra
/// columns are ignored.
pub fn read_event_log<R: Read>(reader: R) -> Result<Vec<HistoricalEvent>, EventLogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut events = Vec::new();
    for result in reader.deserialize() {
        let event: HistoricalEvent = result?;
        events.push(event);
    }

    Ok(events)
}
