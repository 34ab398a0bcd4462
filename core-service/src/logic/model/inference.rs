//! Inference - Outlier Model Capability Interface
//!
//! The batch path treats the trained model as a black box behind two
//! capabilities: a fitted scaler (`transform`) and an outlier model
//! (`decision_function`, lower = more anomalous). Any implementation
//! (the bundled isolation forest, a test stub) plugs in here.

use std::fmt;

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::threshold::{BatchRiskLevel, OutlierThresholds};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid threshold ordering: high_risk ({high_risk}) must be below review ({review})")]
    InvalidThresholdOrdering { high_risk: f64, review: f64 },

    #[error("{component} expects {expected} features, got {actual}")]
    FeatureCountMismatch {
        component: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Model file not found: {0}")]
    NotFound(String),

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feature list error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reject a matrix whose width does not match what a component was fitted on
pub fn check_width(component: &str, expected: usize, x: &ArrayView2<'_, f64>) -> Result<(), ModelError> {
    if x.ncols() != expected {
        return Err(ModelError::FeatureCountMismatch {
            component: component.to_string(),
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Fitted feature scaler
pub trait FeatureScaler: Send + Sync + fmt::Debug {
    fn n_features(&self) -> usize;
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError>;
}

/// Fitted outlier model
pub trait OutlierModel: Send + Sync + fmt::Debug {
    /// Short identifier, e.g. "isolation_forest"
    fn kind(&self) -> &str;
    fn n_features(&self) -> usize;
    /// One score per row; lower means more anomalous
    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError>;
}

// ============================================================================
// MODEL BUNDLE
// ============================================================================

/// Model, scaler, feature columns and thresholds, loaded once and shared
#[derive(Debug)]
pub struct OutlierModelBundle {
    model: Box<dyn OutlierModel>,
    scaler: Box<dyn FeatureScaler>,
    feature_cols: Vec<String>,
    thresholds: OutlierThresholds,
}

/// Summary of a loaded bundle for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_kind: String,
    pub feature_count: usize,
    pub feature_cols: Vec<String>,
    pub thresholds: OutlierThresholds,
    pub risk_levels: Vec<RiskLevelInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLevelInfo {
    pub level: BatchRiskLevel,
    pub description: String,
}

impl OutlierModelBundle {
    /// Assemble a bundle, checking thresholds and that every component
    /// agrees on the feature count.
    pub fn new(
        model: Box<dyn OutlierModel>,
        scaler: Box<dyn FeatureScaler>,
        feature_cols: Vec<String>,
        thresholds: OutlierThresholds,
    ) -> Result<Self, ModelError> {
        thresholds.validate()?;

        if feature_cols.is_empty() {
            return Err(ModelError::InvalidModel("feature column list is empty".to_string()));
        }
        for (i, col) in feature_cols.iter().enumerate() {
            if feature_cols[..i].contains(col) {
                return Err(ModelError::InvalidModel(format!("duplicate feature column '{}'", col)));
            }
        }

        let n = feature_cols.len();
        if scaler.n_features() != n {
            return Err(ModelError::FeatureCountMismatch {
                component: "scaler".to_string(),
                expected: n,
                actual: scaler.n_features(),
            });
        }
        if model.n_features() != n {
            return Err(ModelError::FeatureCountMismatch {
                component: model.kind().to_string(),
                expected: n,
                actual: model.n_features(),
            });
        }

        Ok(Self {
            model,
            scaler,
            feature_cols,
            thresholds,
        })
    }

    pub fn feature_cols(&self) -> &[String] {
        &self.feature_cols
    }

    pub fn thresholds(&self) -> &OutlierThresholds {
        &self.thresholds
    }

    pub fn model_kind(&self) -> &str {
        self.model.kind()
    }

    /// Scale then score a raw feature matrix (columns in `feature_cols` order)
    pub fn score(&self, raw: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        let scaled = self.scaler.transform(raw)?;
        let scores = self.model.decision_function(scaled.view())?;

        if scores.len() != raw.nrows() {
            return Err(ModelError::InvalidModel(format!(
                "model returned {} scores for {} rows",
                scores.len(),
                raw.nrows()
            )));
        }
        Ok(scores)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_kind: self.model.kind().to_string(),
            feature_count: self.feature_cols.len(),
            feature_cols: self.feature_cols.clone(),
            thresholds: self.thresholds,
            risk_levels: BatchRiskLevel::ALL
                .iter()
                .map(|level| RiskLevelInfo {
                    level: *level,
                    description: level.description().to_string(),
                })
                .collect(),
        }
    }
}
