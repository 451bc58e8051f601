//! Synthetic feature-vector construction and trained-schema alignment.
//!
//! The classifier was trained on one-hot encoded columns named
//! `{feature}_{value}` for categoricals plus the raw numeric feature
//! names. The adapter rebuilds that encoding for a single synthetic
//! record and reindexes it to the trained column order; this is the one
//! place strict alignment is mandatory, since a silently misaligned
//! vector corrupts predictions without failing.

use std::collections::BTreeMap;

use delit_dataset_models::Column;
use delit_query::DatasetView;

use crate::ForecastError;

/// Sentinel label for a categorical feature with no observed mode,
/// matching the label the training job used for missing values.
pub const UNKNOWN_LABEL: &str = "Desconhecido";

/// Categorical base features, as `(trained name, column)`.
pub const CATEGORICAL_FEATURES: &[(&str, Column)] = &[
    ("bairro", Column::Neighborhood),
    ("arma_utilizada", Column::Weapon),
    ("sexo_suspeito", Column::SuspectSex),
    ("dia_semana", Column::DayOfWeek),
];

/// Numeric base features, as `(trained name, column)`.
pub const NUMERIC_FEATURES: &[(&str, Column)] = &[
    ("quantidade_vitimas", Column::VictimCount),
    ("quantidade_suspeitos", Column::SuspectCount),
    ("idade_suspeito", Column::SuspectAge),
    ("hora_dia", Column::HourOfDay),
    ("latitude", Column::Latitude),
    ("longitude", Column::Longitude),
];

/// One synthesized feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Mode of a categorical column (or [`UNKNOWN_LABEL`]).
    Categorical(String),
    /// Mean of a numeric column (or `0.0` when no entries exist).
    Numeric(f64),
}

/// Builds the synthetic record for a historical view: categorical
/// features take the view's mode, numeric features its mean.
#[must_use]
pub fn synthesize(view: &DatasetView<'_>) -> BTreeMap<String, FeatureValue> {
    let mut record = BTreeMap::new();

    for (name, column) in CATEGORICAL_FEATURES {
        let value = view
            .mode(*column)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        record.insert((*name).to_string(), FeatureValue::Categorical(value));
    }

    for (name, column) in NUMERIC_FEATURES {
        let value = view.mean(*column).unwrap_or(0.0);
        record.insert((*name).to_string(), FeatureValue::Numeric(value));
    }

    record
}

/// One-hot encodes the synthetic record and reindexes it to the trained
/// column order.
///
/// Trained columns missing from the encoding are filled with zero;
/// encoded columns absent from the trained schema are dropped. A
/// trained column that matches neither a numeric feature nor a
/// `{categorical}_...` one-hot name cannot be aligned at all and is
/// rejected.
///
/// # Errors
///
/// Returns [`ForecastError::SchemaMismatch`] naming the first trained
/// column that no known feature accounts for.
pub fn align(
    record: &BTreeMap<String, FeatureValue>,
    trained_columns: &[String],
) -> Result<Vec<f64>, ForecastError> {
    let mut encoded: BTreeMap<String, f64> = BTreeMap::new();
    for (name, value) in record {
        match value {
            FeatureValue::Numeric(v) => {
                encoded.insert(name.clone(), *v);
            }
            FeatureValue::Categorical(v) => {
                encoded.insert(format!("{name}_{v}"), 1.0);
            }
        }
    }

    let mut vector = Vec::with_capacity(trained_columns.len());
    for column in trained_columns {
        if let Some(&value) = encoded.get(column) {
            vector.push(value);
        } else if is_one_hot_of_known_feature(column) {
            // A category level seen in training but not in this window.
            vector.push(0.0);
        } else {
            return Err(ForecastError::SchemaMismatch {
                column: column.clone(),
            });
        }
    }

    log::debug!(
        "Aligned feature vector: {} trained columns, {} encoded",
        trained_columns.len(),
        encoded.len()
    );
    Ok(vector)
}

fn is_one_hot_of_known_feature(column: &str) -> bool {
    CATEGORICAL_FEATURES.iter().any(|(name, _)| {
        column
            .strip_prefix(name)
            .is_some_and(|rest| rest.starts_with('_'))
    })
}
