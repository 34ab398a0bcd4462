//! Model Module - Outlier Scoring & Risk Thresholds
//!
//! Separates the opaque trained model from the batch logic that uses it,
//! so a different model can be swapped in behind the same interface.

pub mod inference;
pub mod threshold;
pub mod scaler;
pub mod forest;
pub mod storage;

// Re-export common types
pub use inference::{FeatureScaler, ModelError, ModelInfo, OutlierModel, OutlierModelBundle};
pub use threshold::{BatchRiskLevel, DeviationThresholds, OutlierThresholds, RiskLevel};
pub use scaler::StandardScaler;
pub use forest::IsolationForest;
pub use storage::load_bundle;
