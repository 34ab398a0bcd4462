//! Batch Module - Offline Report Scoring
//!
//! Scores an uploaded table of events with the pre-trained outlier model
//! and labels every row `high` / `review` / `normal`.
//!
//! # Failure Strategy
//! The whole batch is validated before anything is scored. A missing
//! feature column, an empty feature cell or a non-numeric feature cell
//! rejects the batch; no partial report is produced.

pub mod table;

use serde::{Deserialize, Serialize};

use crate::logic::model::{BatchRiskLevel, ModelError, OutlierModelBundle};

pub use table::BatchTable;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Missing feature columns: {}", .columns.join(", "))]
    MissingFeatureColumn { columns: Vec<String> },

    #[error("Missing value for feature '{column}' at row {row}")]
    MissingFeatureValue { row: usize, column: String },

    #[error("Invalid value '{value}' for feature '{column}' at row {row}")]
    InvalidFeatureValue { row: usize, column: String, value: String },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Feature matrix error: {0}")]
    Shape(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

// ============================================================================
// REPORT
// ============================================================================

/// One scored input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub index: usize,
    /// Original cells, aligned with `BatchReport::columns`
    pub values: Vec<String>,
    /// Features in the model's column order
    pub features: Vec<f64>,
    pub score: f64,
    pub risk_level: BatchRiskLevel,
}

/// Tier counts over a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub high: usize,
    pub review: usize,
    pub normal: usize,
}

impl BatchSummary {
    pub fn from_rows(rows: &[BatchRow]) -> Self {
        rows.iter().fold(Self::default(), |mut s, row| {
            s.total += 1;
            match row.risk_level {
                BatchRiskLevel::High => s.high += 1,
                BatchRiskLevel::Review => s.review += 1,
                BatchRiskLevel::Normal => s.normal += 1,
            }
            s
        })
    }

    pub fn count(&self, level: BatchRiskLevel) -> usize {
        match level {
            BatchRiskLevel::High => self.high,
            BatchRiskLevel::Review => self.review,
            BatchRiskLevel::Normal => self.normal,
        }
    }
}

/// Row-aligned scoring output for a whole batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub columns: Vec<String>,
    pub feature_cols: Vec<String>,
    pub rows: Vec<BatchRow>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Original columns followed by `score` and `risk_level`
    pub fn to_csv(&self) -> Result<Vec<u8>, BatchError> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        header.extend(["score", "risk_level"]);
        writer.write_record(&header)?;

        for row in &self.rows {
            let score = row.score.to_string();
            let mut record: Vec<&str> = row.values.iter().map(String::as_str).collect();
            record.push(&score);
            record.push(row.risk_level.as_str());
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|e| BatchError::Csv(csv::Error::from(e.into_error())))
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// Score every row of `table` with `bundle`; output order follows input
pub fn score_batch(table: &BatchTable, bundle: &OutlierModelBundle) -> Result<BatchReport, BatchError> {
    let matrix = table.feature_matrix(bundle.feature_cols())?;

    let rows: Vec<BatchRow> = if matrix.nrows() == 0 {
        Vec::new()
    } else {
        let scores = bundle.score(matrix.view())?;
        let thresholds = bundle.thresholds();

        table
            .records
            .iter()
            .zip(matrix.rows())
            .zip(scores.iter())
            .enumerate()
            .map(|(index, ((values, features), &score))| BatchRow {
                index,
                values: values.clone(),
                features: features.to_vec(),
                score,
                risk_level: thresholds.classify(score),
            })
            .collect()
    };

    let summary = BatchSummary::from_rows(&rows);
    log::info!(
        "Scored batch of {} rows: {} high, {} review, {} normal",
        summary.total,
        summary.high,
        summary.review,
        summary.normal
    );

    Ok(BatchReport {
        columns: table.columns.clone(),
        feature_cols: bundle.feature_cols().to_vec(),
        rows,
        summary,
    })
}
