#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Forecast adapter: builds one synthetic feature vector from the
//! aggregates of a historical dataset view, aligns it to the trained
//! one-hot column schema, and invokes the pre-trained random-forest
//! classifier.
//!
//! Every failure mode is a displayable [`ForecastError`], never a crash:
//! missing artifacts, an empty historical subset, or a trained column
//! the encoder cannot account for.

pub mod features;

use std::path::Path;

use chrono::{Datelike as _, NaiveDate};
use delit_forecast_models::{ClassProbability, Forecast, ModelArtifacts, RandomForest};
use delit_query::DatasetView;
use delit_query_models::FilterCriteria;
use thiserror::Error;

/// How many ranked classes a forecast reports.
pub const RANKED_CLASSES: usize = 3;

/// Errors that can occur while producing a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Model or column artifacts could not be read or parsed.
    #[error("forecast unavailable: {message}")]
    ArtifactsMissing {
        /// What failed while loading the artifacts.
        message: String,
    },

    /// A trained column matches no known feature, so the encoded vector
    /// cannot be aligned to the trained schema.
    #[error("trained column '{column}' does not match any known feature")]
    SchemaMismatch {
        /// The unmatched trained column name.
        column: String,
    },

    /// The historical subset is empty after filtering; no model call is
    /// attempted.
    #[error("insufficient data: no historical rows match the current filter")]
    InsufficientData,

    /// The serialized model rejected the aligned vector.
    #[error("model error: {message}")]
    Model {
        /// Description of what went wrong.
        message: String,
    },
}

/// Loads the forest and trained-column artifacts from disk.
///
/// `model_path` holds the serialized [`RandomForest`]; `columns_path`
/// holds the ordered one-hot feature-column name array.
///
/// # Errors
///
/// Returns [`ForecastError::ArtifactsMissing`] if either file cannot be
/// read or parsed.
pub fn load_artifacts(model_path: &Path, columns_path: &Path) -> Result<ModelArtifacts, ForecastError> {
    let forest: RandomForest = read_json(model_path)?;
    let feature_columns: Vec<String> = read_json(columns_path)?;
    log::debug!(
        "Loaded model: {} trees, {} classes, {} trained columns",
        forest.trees.len(),
        forest.classes.len(),
        feature_columns.len()
    );
    Ok(ModelArtifacts {
        forest,
        feature_columns,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ForecastError> {
    let bytes = std::fs::read(path).map_err(|e| ForecastError::ArtifactsMissing {
        message: format!("cannot read {}: {e}", path.display()),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| ForecastError::ArtifactsMissing {
        message: format!("cannot parse {}: {e}", path.display()),
    })
}

/// Predicts the most likely crime type for the next period from the
/// given historical view.
///
/// The view's aggregates become one synthetic record (mode for
/// categoricals, mean for numerics), which is one-hot encoded and
/// reindexed to the trained column schema before inference.
///
/// # Errors
///
/// Returns [`ForecastError::InsufficientData`] on an empty view,
/// [`ForecastError::SchemaMismatch`] when the trained schema cannot be
/// covered, and [`ForecastError::Model`] when the serialized forest is
/// malformed.
pub fn predict(view: &DatasetView<'_>, artifacts: &ModelArtifacts) -> Result<Forecast, ForecastError> {
    if view.is_empty() {
        return Err(ForecastError::InsufficientData);
    }

    let synthetic = features::synthesize(view);
    log::debug!("Synthetic feature record: {synthetic:?}");

    let vector = features::align(&synthetic, &artifacts.feature_columns)?;

    let probabilities = artifacts
        .forest
        .predict_proba(&vector)
        .ok_or_else(|| ForecastError::Model {
            message: "forest produced no class distribution".to_string(),
        })?;

    let mut ranked: Vec<ClassProbability> = artifacts
        .forest
        .classes
        .iter()
        .zip(&probabilities)
        .map(|(label, &probability)| ClassProbability {
            label: label.clone(),
            probability,
        })
        .collect();
    // Stable sort keeps the lower class index first on ties.
    ranked.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let label = ranked
        .first()
        .map(|c| c.label.clone())
        .ok_or_else(|| ForecastError::Model {
            message: "model has no classes".to_string(),
        })?;
    ranked.truncate(RANKED_CLASSES);

    Ok(Forecast {
        label,
        probabilities: ranked,
    })
}

/// Criteria selecting the three calendar months preceding the month
/// after `reference` — the recent window a "next period" forecast is
/// built from.
///
/// Months wrap across year boundaries: a December reference targets
/// January and yields October, November, and December.
#[must_use]
pub fn recent_window(reference: NaiveDate) -> FilterCriteria {
    let next_month = reference.month() % 12 + 1;
    let mut criteria = FilterCriteria::none();
    for back in 1..=3 {
        let month = (next_month + 12 - back - 1) % 12 + 1;
        criteria = criteria.with_month(month);
    }
    criteria
}
