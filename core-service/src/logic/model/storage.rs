//! Model Bundle Storage
//!
//! Loads an [`OutlierModelBundle`] from a directory:
//!
//! ```text
//! model.json       isolation forest node arrays
//! scaler.json      standard scaler statistics
//! features.csv     header row = ordered feature columns
//! thresholds.json  {"high_risk": .., "review": ..}
//! manifest.json    optional, SHA-256 per file
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::IsolationForest;
use super::inference::{ModelError, OutlierModelBundle};
use super::scaler::StandardScaler;
use super::threshold::OutlierThresholds;

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURES_FILE: &str = "features.csv";
pub const THRESHOLDS_FILE: &str = "thresholds.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Expected SHA-256 digests (hex) keyed by file name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleManifest {
    pub files: BTreeMap<String, String>,
}

/// SHA-256 of `bytes` as lowercase hex
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Load and validate a model bundle directory
pub fn load_bundle(dir: &Path) -> Result<OutlierModelBundle, ModelError> {
    log::info!("Loading model bundle from: {}", dir.display());

    if !dir.is_dir() {
        return Err(ModelError::NotFound(dir.display().to_string()));
    }

    let manifest = match read_optional(&dir.join(MANIFEST_FILE))? {
        Some(bytes) => Some(serde_json::from_slice::<BundleManifest>(&bytes)?),
        None => {
            log::warn!("No {} in bundle, skipping checksum verification", MANIFEST_FILE);
            None
        }
    };

    let read = |name: &str| -> Result<Vec<u8>, ModelError> {
        let bytes = read_required(&dir.join(name))?;
        if let Some(m) = &manifest {
            verify(m, name, &bytes)?;
        }
        Ok(bytes)
    };

    let forest: IsolationForest = parse_json(&read(MODEL_FILE)?)?;
    forest.validate()?;

    let scaler: StandardScaler = parse_json(&read(SCALER_FILE)?)?;
    scaler.validate()?;

    let thresholds: OutlierThresholds = parse_json(&read(THRESHOLDS_FILE)?)?;
    let feature_cols = read_feature_columns(&read(FEATURES_FILE)?)?;

    let bundle = OutlierModelBundle::new(Box::new(forest), Box::new(scaler), feature_cols, thresholds)?;

    log::info!(
        "Model bundle loaded: {} with {} features (high_risk={}, review={})",
        bundle.model_kind(),
        bundle.feature_cols().len(),
        bundle.thresholds().high_risk,
        bundle.thresholds().review
    );
    Ok(bundle)
}

/// Header row of a CSV file, in order
pub fn read_feature_columns(bytes: &[u8]) -> Result<Vec<String>, ModelError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let cols: Vec<String> = reader
        .headers()?
        .iter()
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect();
    Ok(cols)
}

fn verify(manifest: &BundleManifest, name: &str, bytes: &[u8]) -> Result<(), ModelError> {
    let expected = manifest.files.get(name).ok_or_else(|| {
        ModelError::InvalidModel(format!("{} is not listed in {}", name, MANIFEST_FILE))
    })?;
    let actual = checksum(bytes);

    if !expected.eq_ignore_ascii_case(&actual) {
        return Err(ModelError::ChecksumMismatch {
            file: name.to_string(),
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ModelError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn read_required(path: &Path) -> Result<Vec<u8>, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.display().to_string()));
    }
    Ok(fs::read(path)?)
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, ModelError> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(fs::read(path)?))
}
