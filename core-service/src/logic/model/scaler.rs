//! Standard Scaler
//!
//! `(x - mean) / scale` per column, as exported from a fitted scaler.
//! Either statistic may be absent (no centering / no scaling).

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::inference::{check_width, FeatureScaler, ModelError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
    /// Only needed when both `mean` and `scale` are absent
    #[serde(default)]
    pub n_features: Option<usize>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        let scaler = Self {
            mean: Some(mean),
            scale: Some(scale),
            n_features: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let width = self.width().ok_or_else(|| {
            ModelError::InvalidModel("scaler has neither mean, scale nor n_features".to_string())
        })?;

        for (name, values) in [("mean", &self.mean), ("scale", &self.scale)] {
            if let Some(v) = values {
                if v.len() != width {
                    return Err(ModelError::InvalidModel(format!(
                        "scaler {} has {} entries, expected {}",
                        name,
                        v.len(),
                        width
                    )));
                }
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(ModelError::InvalidModel(format!("scaler {} has non-finite values", name)));
                }
            }
        }
        Ok(())
    }

    fn width(&self) -> Option<usize> {
        self.mean
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.scale.as_ref().map(Vec::len))
            .or(self.n_features)
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.width().unwrap_or(0)
    }

    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        check_width("scaler", self.n_features(), &x)?;

        let mut out = x.to_owned();
        if let Some(mean) = &self.mean {
            let mean = Array1::from(mean.clone());
            out -= &mean.insert_axis(Axis(0));
        }
        if let Some(scale) = &self.scale {
            // zero scale means a constant column during fitting
            let scale: Array1<f64> = scale.iter().map(|s| if *s == 0.0 { 1.0 } else { *s }).collect();
            out /= &scale.insert_axis(Axis(0));
        }
        Ok(out)
    }
}
