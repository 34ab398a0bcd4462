use std::io::Read;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::BatchError;

/// Uploaded rows as raw text cells, columns in upload order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchTable {
    pub columns: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl BatchTable {
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Result<Self, BatchError> {
        if let Some((row, rec)) = records.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(BatchError::RaggedRow {
                row,
                expected: columns.len(),
                actual: rec.len(),
            });
        }
        Ok(Self { columns, records })
    }

    /// Parse CSV with a header row
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, BatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(String::from).collect());
        }

        Ok(Self { columns, records })
    }

    /// Build from JSON objects. Columns are the union of keys in first-seen
    /// order; a key absent from a row becomes an empty cell.
    pub fn from_json_rows(rows: &[serde_json::Map<String, serde_json::Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let records = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| match row.get(col) {
                        None | Some(serde_json::Value::Null) => String::new(),
                        Some(serde_json::Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                    })
                    .collect()
            })
            .collect();

        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Select `feature_cols` by name into a row-major matrix.
    ///
    /// Validates the header and every cell before returning, so a bad
    /// batch is rejected as a whole.
    pub fn feature_matrix(&self, feature_cols: &[String]) -> Result<Array2<f64>, BatchError> {
        let missing: Vec<String> = feature_cols
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(BatchError::MissingFeatureColumn { columns: missing });
        }

        let indices: Vec<usize> = feature_cols
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();

        let mut data = Vec::with_capacity(self.records.len() * indices.len());
        for (row, record) in self.records.iter().enumerate() {
            for (&idx, column) in indices.iter().zip(feature_cols) {
                let cell = record.get(idx).map(String::as_str).unwrap_or("");
                data.push(parse_cell(row, column, cell)?);
            }
        }

        Array2::from_shape_vec((self.records.len(), indices.len()), data)
            .map_err(|e| BatchError::Shape(e.to_string()))
    }
}

fn parse_cell(row: usize, column: &str, cell: &str) -> Result<f64, BatchError> {
    if cell.is_empty() {
        return Err(BatchError::MissingFeatureValue {
            row,
            column: column.to_string(),
        });
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(BatchError::InvalidFeatureValue {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}
