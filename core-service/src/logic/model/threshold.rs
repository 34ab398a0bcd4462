//! Risk Thresholds
//!
//! Fixed cut points that map a raw score to a risk tier, one policy per
//! scoring path:
//! - online deviation score: higher is worse (`normal` / `medium` / `high`)
//! - batch outlier score: lower is worse (`high` / `review` / `normal`)

use serde::{Deserialize, Serialize};

use super::inference::ModelError;

// ============================================================================
// RISK LEVELS
// ============================================================================

/// Risk tier for the online deviation scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Normal,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Risk tier for the batch outlier scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchRiskLevel {
    High,
    Review,
    Normal,
}

impl BatchRiskLevel {
    pub const ALL: [BatchRiskLevel; 3] = [Self::High, Self::Review, Self::Normal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Review => "review",
            Self::Normal => "normal",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "Direct risk: behaviour outside the usual patterns",
            Self::Review => "Slightly unusual behaviour, needs manual verification",
            Self::Normal => "Within normal behaviour",
        }
    }
}

// ============================================================================
// ONLINE THRESHOLDS
// ============================================================================

/// Default cut point above which a deviation score is `high`
pub const DEVIATION_THRESHOLD: f64 = 3.5;

/// Fraction of the threshold above which a score is `medium`
pub const MEDIUM_RATIO: f64 = 0.6;

/// Threshold policy for summed deviation scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationThresholds {
    pub threshold: f64,
    pub medium_ratio: f64,
}

impl Default for DeviationThresholds {
    fn default() -> Self {
        Self {
            threshold: DEVIATION_THRESHOLD,
            medium_ratio: MEDIUM_RATIO,
        }
    }
}

impl DeviationThresholds {
    /// Boundaries resolve to the lower tier (`>` comparisons).
    pub fn classify(&self, score: f64) -> RiskLevel {
        if score > self.threshold {
            RiskLevel::High
        } else if score > self.threshold * self.medium_ratio {
            RiskLevel::Medium
        } else {
            RiskLevel::Normal
        }
    }
}

// ============================================================================
// BATCH THRESHOLDS
// ============================================================================

/// Cut points on the outlier model's decision function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierThresholds {
    pub high_risk: f64,
    pub review: f64,
}

impl OutlierThresholds {
    /// Build and validate ordering (`high_risk < review`)
    pub fn new(high_risk: f64, review: f64) -> Result<Self, ModelError> {
        let thresholds = Self { high_risk, review };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.high_risk.is_finite() || !self.review.is_finite() || self.high_risk >= self.review {
            return Err(ModelError::InvalidThresholdOrdering {
                high_risk: self.high_risk,
                review: self.review,
            });
        }
        Ok(())
    }

    /// Lower bound of `review` is inclusive, `normal` starts at `review`.
    pub fn classify(&self, score: f64) -> BatchRiskLevel {
        if score < self.high_risk {
            BatchRiskLevel::High
        } else if score < self.review {
            BatchRiskLevel::Review
        } else {
            BatchRiskLevel::Normal
        }
    }
}
