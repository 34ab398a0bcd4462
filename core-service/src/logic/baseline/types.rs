use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// USER BASELINE
// ============================================================================

/// Per-user statistical summary of historical activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserBaseline {
    pub lat_mean: f64,
    pub lat_std: f64,
    pub lon_mean: f64,
    pub lon_std: f64,
    pub login_mean: f64,
    pub login_std: f64,
}

impl UserBaseline {
    /// All six statistics, in field order
    pub fn fields(&self) -> [f64; 6] {
        [
            self.lat_mean,
            self.lat_std,
            self.lon_mean,
            self.lon_std,
            self.login_mean,
            self.login_std,
        ]
    }

    /// Apply `f` to every statistic
    pub(crate) fn map_fields(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            lat_mean: f(self.lat_mean),
            lat_std: f(self.lat_std),
            lon_mean: f(self.lon_mean),
            lon_std: f(self.lon_std),
            login_mean: f(self.login_mean),
            login_std: f(self.login_std),
        }
    }
}

// ============================================================================
// BASELINE TABLE
// ============================================================================

/// Lookup table `user_id -> UserBaseline`.
///
/// Ordered by user id so serialization is stable across rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineTable {
    profiles: BTreeMap<String, UserBaseline>,
}

impl BaselineTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&UserBaseline> {
        self.profiles.get(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.profiles.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserBaseline)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

impl FromIterator<(String, UserBaseline)> for BaselineTable {
    fn from_iter<I: IntoIterator<Item = (String, UserBaseline)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}
