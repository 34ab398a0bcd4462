//! Isolation Forest
//!
//! Scores rows with an isolation forest exported as flat node arrays
//! (one entry per node; leaves have `children_left == -1`).
//!
//! `decision_function(x) = -2^(-E[h(x)] / c(max_samples)) - offset`
//! where `h(x)` is the depth of the leaf `x` falls into plus `c(n)` of the
//! samples left in that leaf.

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::inference::{check_width, ModelError, OutlierModel};

const TREE_LEAF: i64 = -1;
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// One fitted isolation tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub n_node_samples: Vec<u64>,
    /// Column subset this tree was fitted on (all columns when absent)
    #[serde(default)]
    pub features: Option<Vec<usize>>,
}

impl IsolationTree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(ModelError::InvalidModel("tree has no nodes".to_string()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.n_node_samples.len() != n
        {
            return Err(ModelError::InvalidModel("tree node arrays differ in length".to_string()));
        }

        let width = match &self.features {
            Some(subset) => {
                if let Some(bad) = subset.iter().find(|f| **f >= n_features) {
                    return Err(ModelError::InvalidModel(format!("tree feature subset index {} out of range", bad)));
                }
                subset.len()
            }
            None => n_features,
        };

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == TREE_LEAF {
                continue;
            }
            // children always come after their parent
            let in_range = |c: i64| c > node as i64 && (c as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(ModelError::InvalidModel(format!("node {} has invalid children", node)));
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= width {
                return Err(ModelError::InvalidModel(format!("node {} splits on invalid feature {}", node, f)));
            }
        }
        Ok(())
    }

    /// Path length of one row through this tree
    fn path_length(&self, row: &ArrayView1<'_, f64>) -> f64 {
        let mut node = 0usize;
        let mut depth = 0.0;

        while self.children_left[node] != TREE_LEAF {
            let col = self.feature[node] as usize;
            let col = match &self.features {
                Some(subset) => subset[col],
                None => col,
            };
            node = if row[col] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
            depth += 1.0;
        }

        depth + average_path_length(self.n_node_samples[node])
    }
}

/// Fitted isolation forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    pub n_features: usize,
    pub max_samples: u64,
    pub offset: f64,
    pub trees: Vec<IsolationTree>,
}

impl IsolationForest {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel("forest has no trees".to_string()));
        }
        if self.max_samples == 0 {
            return Err(ModelError::InvalidModel("max_samples must be positive".to_string()));
        }
        if !self.offset.is_finite() {
            return Err(ModelError::InvalidModel("offset must be finite".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| ModelError::InvalidModel(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    /// Raw anomaly score in [-1, 0); lower is more anomalous
    pub fn score_samples(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        check_width("isolation_forest", self.n_features, &x)?;

        let norm = average_path_length(self.max_samples) * self.trees.len() as f64;
        let scores: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let depth_sum: f64 = self.trees.iter().map(|t| t.path_length(&row)).sum();
                let ratio = if norm > 0.0 { depth_sum / norm } else { 0.0 };
                -(2f64.powf(-ratio))
            })
            .collect();
        Ok(scores)
    }
}

impl OutlierModel for IsolationForest {
    fn kind(&self) -> &str {
        "isolation_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        Ok(self.score_samples(x)? - self.offset)
    }
}

/// Average path length of an unsuccessful BST search over `n` samples
pub fn average_path_length(n: u64) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
