#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loader, cache, and export for the DELIT occurrence dataset.
//!
//! A [`Dataset`] is an immutable snapshot: records plus the
//! capability-checked schema of columns the source actually carried.
//! Loading is lenient about values (a blank or unparseable timestamp
//! becomes `None`, the row still loads) but strict about structure
//! (missing required columns fail with [`LoadError::MissingColumn`]).

pub mod cache;
pub mod export;
pub mod parsing;

use std::io::Read;
use std::path::Path;

use delit_dataset_models::{Column, IncidentRecord, Schema};
use thiserror::Error;

pub use cache::DatasetCache;

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source is not parseable CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the source.
    #[error("missing required column '{column}'")]
    MissingColumn {
        /// The column that was not found under any known header.
        column: Column,
    },
}

/// An immutable, loaded occurrence dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<IncidentRecord>,
    schema: Schema,
}

impl Dataset {
    /// Loads a dataset from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file is unreadable, not CSV, or
    /// missing a required column.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        log::info!(
            "Loaded {} records from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Loads a dataset from a CSV byte stream.
    ///
    /// Header names are normalized once here (lowercased, punctuation
    /// collapsed to `_`, `tipo_arma` aliased to `arma_utilizada`) so
    /// downstream filters always see stable [`Column`] identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the stream is unreadable, not CSV, or
    /// missing a required column.
    pub fn from_reader(reader: impl Read) -> Result<Self, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut positions: Vec<(Column, usize)> = Vec::new();
        for (i, raw) in headers.iter().enumerate() {
            let normalized = parsing::normalize_header(raw);
            match Column::from_header(&normalized) {
                Some(column) if !positions.iter().any(|(c, _)| *c == column) => {
                    positions.push((column, i));
                }
                Some(_) => log::warn!("Duplicate column '{normalized}' ignored"),
                None => log::debug!("Unrecognized column '{raw}' ignored"),
            }
        }

        for column in Column::REQUIRED {
            if !positions.iter().any(|(c, _)| c == column) {
                return Err(LoadError::MissingColumn { column: *column });
            }
        }

        let field = |row: &csv::StringRecord, column: Column| -> Option<String> {
            positions
                .iter()
                .find(|(c, _)| *c == column)
                .and_then(|(_, i)| row.get(*i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let numeric = |row: &csv::StringRecord, column: Column| -> Option<f64> {
            field(row, column).and_then(|s| s.parse().ok())
        };

        let mut records = Vec::new();
        let mut unparsed_timestamps: u64 = 0;
        for row in csv_reader.records() {
            let row = row?;

            let raw_timestamp = field(&row, Column::OccurredAt);
            let occurred_at = raw_timestamp
                .as_deref()
                .and_then(parsing::parse_timestamp);
            if raw_timestamp.is_some() && occurred_at.is_none() {
                unparsed_timestamps += 1;
            }

            records.push(IncidentRecord::new(
                occurred_at,
                field(&row, Column::Neighborhood).unwrap_or_default(),
                field(&row, Column::CrimeType).unwrap_or_default(),
                field(&row, Column::Weapon),
                field(&row, Column::SuspectSex),
                numeric(&row, Column::SuspectAge),
                numeric(&row, Column::VictimCount),
                numeric(&row, Column::SuspectCount),
                numeric(&row, Column::Latitude),
                numeric(&row, Column::Longitude),
            ));
        }

        if unparsed_timestamps > 0 {
            log::warn!(
                "{unparsed_timestamps} rows have unparseable timestamps; they count toward totals but are excluded from time bucketing"
            );
        }

        let schema = Schema::new(positions.iter().map(|(c, _)| *c));
        Ok(Self { records, schema })
    }

    /// The loaded records.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// The columns this dataset variant exposes.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of records, including those with unparseable timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
data_ocorrencia,bairro,tipo_crime,tipo_arma,sexo_suspeito,idade_suspeito,quantidade_vitimas,quantidade_suspeitos,latitude,longitude
2024-03-01 22:30:00,Centro,Furto,Faca,M,25,1,1,-8.0476,-34.8770
2024-03-02 10:00:00,Boa Viagem,Roubo,Arma de Fogo,F,30,2,1,-8.1194,-34.9041
nunca,Centro,Furto,,,,,,,
";

    #[test]
    fn loads_records_and_schema() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert!(dataset.schema().has(Column::Weapon));
        assert!(dataset.schema().has(Column::SuspectSex));
        assert_eq!(dataset.records()[0].neighborhood, "Centro");
        assert_eq!(dataset.records()[1].crime_type, "Roubo");
    }

    #[test]
    fn weapon_alias_maps_to_canonical_column() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.records()[0].weapon.as_deref(), Some("Faca"));
    }

    #[test]
    fn unparseable_timestamp_loads_as_missing() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let row = &dataset.records()[2];
        assert_eq!(row.occurred_at, None);
        assert_eq!(row.hour_of_day, None);
        assert_eq!(row.neighborhood, "Centro");
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "data_ocorrencia,bairro\n2024-03-01 22:30:00,Centro\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::MissingColumn { column } => assert_eq!(column, Column::CrimeType),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "data_ocorrencia,bairro,tipo_crime\n2024-03-01 22:30:00,Centro,Furto\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert!(!dataset.schema().has(Column::Weapon));
        assert!(!dataset.schema().has(Column::Latitude));
        assert_eq!(dataset.records()[0].weapon, None);
    }

    #[test]
    fn messy_headers_are_normalized() {
        let csv = "Data Ocorrencia,BAIRRO,Tipo_Crime\n2024-03-01 22:30:00,Centro,Furto\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].crime_type, "Furto");
    }
}
