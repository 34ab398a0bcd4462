//! Baseline Module - Per-user Behavioral Profiles
//!
//! Builds a mean/standard-deviation summary of each user's historical
//! latitude, longitude and daily login count.
//!
//! # Architecture
//! - `types.rs`: `UserBaseline`, `BaselineTable`
//! - `mod.rs`: the profiler pass (`build`)
//!
//! # Zero substitution
//! After all statistics are computed, every value exactly equal to zero is
//! replaced by [`ZERO_EPSILON`]. This applies to means as well as standard
//! deviations, so a user whose mean coordinate is exactly 0.0 ends up with
//! a mean of 1e-6. Downstream consumers rely on this, keep it.

pub mod types;

use std::collections::BTreeMap;

use crate::logic::events::HistoricalEvent;

pub use types::{BaselineTable, UserBaseline};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Replacement for any statistic that comes out exactly zero
pub const ZERO_EPSILON: f64 = 1e-6;

// ============================================================================
// PROFILER
// ============================================================================

/// Per-user sample columns collected during the grouping pass
#[derive(Default)]
struct UserSamples {
    lat: Vec<f64>,
    lon: Vec<f64>,
    login: Vec<f64>,
}

/// Build the baseline table from the full historical log.
///
/// Full rebuild every call; an empty log gives an empty table.
pub fn build(events: &[HistoricalEvent]) -> BaselineTable {
    let mut groups: BTreeMap<&str, UserSamples> = BTreeMap::new();

    for event in events {
        let samples = groups.entry(event.user_id.as_str()).or_default();
        samples.lat.push(event.location_lat);
        samples.lon.push(event.location_lon);
        samples.login.push(event.login_count_day as f64);
    }

    let table: BaselineTable = groups
        .into_iter()
        .map(|(user_id, samples)| (user_id.to_string(), summarize(&samples)))
        .collect();

    log::debug!("Built baselines for {} users from {} events", table.len(), events.len());
    table
}

fn summarize(samples: &UserSamples) -> UserBaseline {
    let (lat_mean, lat_std) = mean_std(&samples.lat);
    let (lon_mean, lon_std) = mean_std(&samples.lon);
    let (login_mean, login_std) = mean_std(&samples.login);

    UserBaseline {
        lat_mean,
        lat_std,
        lon_mean,
        lon_std,
        login_mean,
        login_std,
    }
    .map_fields(replace_zero)
}

/// Mean and sample standard deviation (n - 1 denominator).
/// A single sample has no spread and reports 0.0.
fn mean_std(vals: &[f64]) -> (f64, f64) {
    if vals.is_empty() {
        return (0.0, 0.0);
    }
    let n = vals.len() as f64;
    let mean = vals.iter().sum::<f64>() / n;
    if vals.len() < 2 {
        return (mean, 0.0);
    }
    let sq_diff: f64 = vals.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (sq_diff / (n - 1.0)).sqrt())
}

fn replace_zero(v: f64) -> f64 {
    if v == 0.0 {
        ZERO_EPSILON
    } else {
        v
    }
}
