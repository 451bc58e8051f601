#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter criteria and aggregation result types for the DELIT query
//! engine.
//!
//! [`FilterCriteria`] is a snapshot of operator selections: every
//! constraint is independently optional, constraints compose by AND
//! across fields, and multiple selected values within one field compose
//! by OR. Constructing criteria never touches a dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Granularity for time-bucketed counts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeGranularity {
    /// Hour of day, fixed 24 buckets 0-23.
    HourOfDay,
    /// Day of week, fixed 7 buckets Monday-first.
    DayOfWeek,
    /// Calendar date, only dates that occur, ascending.
    Date,
}

/// A snapshot of operator-selected filter constraints.
///
/// Empty vectors and `None` bounds mean "no constraint". All range
/// bounds are inclusive on both ends; `hour_from`/`hour_to` are within
/// `[0, 23]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Match any of these neighborhoods.
    pub neighborhoods: Vec<String>,
    /// Match any of these crime types.
    pub crime_types: Vec<String>,
    /// Match any of these weapons.
    pub weapons: Vec<String>,
    /// Match any of these suspect sexes.
    pub suspect_sexes: Vec<String>,
    /// Match any of these calendar years.
    pub years: Vec<i32>,
    /// Match any of these calendar months (1-12).
    pub months: Vec<u32>,
    /// Match exactly this occurrence date.
    pub date: Option<NaiveDate>,
    /// Occurrence date lower bound (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Occurrence date upper bound (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Hour-of-day lower bound (inclusive).
    pub hour_from: Option<u32>,
    /// Hour-of-day upper bound (inclusive).
    pub hour_to: Option<u32>,
    /// Suspect age lower bound (inclusive).
    pub age_min: Option<f64>,
    /// Suspect age upper bound (inclusive).
    pub age_max: Option<f64>,
}

impl FilterCriteria {
    /// Criteria with no constraints; applying them leaves any view
    /// unchanged.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds a neighborhood to match.
    #[must_use]
    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhoods.push(neighborhood.into());
        self
    }

    /// Adds a crime type to match.
    #[must_use]
    pub fn with_crime_type(mut self, crime_type: impl Into<String>) -> Self {
        self.crime_types.push(crime_type.into());
        self
    }

    /// Adds a weapon to match.
    #[must_use]
    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapons.push(weapon.into());
        self
    }

    /// Adds a suspect sex to match.
    #[must_use]
    pub fn with_suspect_sex(mut self, sex: impl Into<String>) -> Self {
        self.suspect_sexes.push(sex.into());
        self
    }

    /// Constrains to exactly one occurrence date.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Constrains to an inclusive occurrence date range.
    #[must_use]
    pub const fn with_date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Constrains to an inclusive hour-of-day range within `[0, 23]`.
    #[must_use]
    pub const fn with_hour_range(mut self, from: u32, to: u32) -> Self {
        self.hour_from = Some(from);
        self.hour_to = Some(to);
        self
    }

    /// Constrains to an inclusive suspect age range.
    #[must_use]
    pub const fn with_age_range(mut self, min: f64, max: f64) -> Self {
        self.age_min = Some(min);
        self.age_max = Some(max);
        self
    }

    /// Adds a calendar year to match.
    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.years.push(year);
        self
    }

    /// Adds a calendar month (1-12) to match.
    #[must_use]
    pub fn with_month(mut self, month: u32) -> Self {
        self.months.push(month);
        self
    }

    /// Whether no constraint is set at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
            && self.crime_types.is_empty()
            && self.weapons.is_empty()
            && self.suspect_sexes.is_empty()
            && self.years.is_empty()
            && self.months.is_empty()
            && self.date.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.hour_from.is_none()
            && self.hour_to.is_none()
            && self.age_min.is_none()
            && self.age_max.is_none()
    }

    /// Whether any constraint requires a parseable occurrence timestamp.
    #[must_use]
    pub fn requires_timestamp(&self) -> bool {
        self.date.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.hour_from.is_some()
            || self.hour_to.is_some()
            || !self.years.is_empty()
            || !self.months.is_empty()
    }
}

/// A categorical value with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The categorical value.
    pub value: String,
    /// Number of rows carrying it.
    pub count: u64,
}

/// One time bucket with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCount {
    /// Bucket key: an hour (`"0"`-`"23"`), a weekday label, or an ISO
    /// date.
    pub bucket: String,
    /// Number of rows in the bucket.
    pub count: u64,
}

/// A group with the mean of some numeric column over its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMean {
    /// The grouping value.
    pub group: String,
    /// Arithmetic mean over the group's non-null entries.
    pub mean: f64,
}

/// Describe-style statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericColumnStats {
    /// Normalized column name.
    pub column: String,
    /// Number of non-null entries.
    pub count: u64,
    /// Arithmetic mean, `None` when no entries.
    pub mean: Option<f64>,
    /// Minimum value, `None` when no entries.
    pub min: Option<f64>,
    /// Maximum value, `None` when no entries.
    pub max: Option<f64>,
}

/// High-level summary of a dataset view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    /// Total rows in the view.
    pub total_records: u64,
    /// Total columns the dataset exposes.
    pub total_columns: u64,
    /// How many of those are numeric.
    pub numeric_columns: u64,
    /// How many of those are categorical.
    pub categorical_columns: u64,
    /// Per-numeric-column describe rows.
    pub numeric_stats: Vec<NumericColumnStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_criteria_are_empty() {
        assert!(FilterCriteria::none().is_empty());
        assert!(!FilterCriteria::none().requires_timestamp());
    }

    #[test]
    fn builder_accumulates_multi_values() {
        let criteria = FilterCriteria::none()
            .with_neighborhood("Centro")
            .with_neighborhood("Boa Viagem")
            .with_crime_type("Furto");
        assert_eq!(criteria.neighborhoods.len(), 2);
        assert_eq!(criteria.crime_types, vec!["Furto".to_string()]);
        assert!(!criteria.is_empty());
    }

    #[test]
    fn time_constraints_require_timestamp() {
        let by_hour = FilterCriteria::none().with_hour_range(8, 18);
        assert!(by_hour.requires_timestamp());

        let by_month = FilterCriteria::none().with_month(3);
        assert!(by_month.requires_timestamp());

        let by_age = FilterCriteria::none().with_age_range(18.0, 30.0);
        assert!(!by_age.requires_timestamp());
    }

    #[test]
    fn granularity_names_are_snake_case() {
        assert_eq!(TimeGranularity::HourOfDay.to_string(), "hour_of_day");
        assert_eq!(TimeGranularity::DayOfWeek.to_string(), "day_of_week");
        assert_eq!(
            "date".parse::<TimeGranularity>().unwrap(),
            TimeGranularity::Date
        );
    }
}
