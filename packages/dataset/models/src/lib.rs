#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record, column, and schema types for the DELIT occurrence
//! dataset.
//!
//! The dataset ships with Portuguese snake_case headers
//! (`data_ocorrencia`, `bairro`, `tipo_crime`, ...). [`Column`] is the
//! canonical identifier for each of them plus the calendar fields derived
//! at load time; every other crate filters and aggregates in terms of
//! [`Column`], never raw header strings.

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Canonical identifier for a dataset column.
///
/// The strum serialization is the normalized CSV header name. Source
/// columns come straight from the file; derived columns are computed from
/// `data_ocorrencia` at load time and never persisted back.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Occurrence timestamp (`data_ocorrencia`).
    #[strum(serialize = "data_ocorrencia")]
    #[serde(rename = "data_ocorrencia")]
    OccurredAt,
    /// Neighborhood label (`bairro`).
    #[strum(serialize = "bairro")]
    #[serde(rename = "bairro")]
    Neighborhood,
    /// Crime type label (`tipo_crime`) — the forecast target.
    #[strum(serialize = "tipo_crime")]
    #[serde(rename = "tipo_crime")]
    CrimeType,
    /// Weapon used (`arma_utilizada`, alias `tipo_arma`). Optional.
    #[strum(serialize = "arma_utilizada")]
    #[serde(rename = "arma_utilizada")]
    Weapon,
    /// Suspect sex (`sexo_suspeito`). Optional.
    #[strum(serialize = "sexo_suspeito")]
    #[serde(rename = "sexo_suspeito")]
    SuspectSex,
    /// Suspect age (`idade_suspeito`). Optional numeric.
    #[strum(serialize = "idade_suspeito")]
    #[serde(rename = "idade_suspeito")]
    SuspectAge,
    /// Victim count (`quantidade_vitimas`). Optional numeric.
    #[strum(serialize = "quantidade_vitimas")]
    #[serde(rename = "quantidade_vitimas")]
    VictimCount,
    /// Suspect count (`quantidade_suspeitos`). Optional numeric.
    #[strum(serialize = "quantidade_suspeitos")]
    #[serde(rename = "quantidade_suspeitos")]
    SuspectCount,
    /// Latitude (`latitude`). Optional.
    #[strum(serialize = "latitude")]
    #[serde(rename = "latitude")]
    Latitude,
    /// Longitude (`longitude`). Optional.
    #[strum(serialize = "longitude")]
    #[serde(rename = "longitude")]
    Longitude,
    /// Derived localized day of week (`dia_semana`).
    #[strum(serialize = "dia_semana")]
    #[serde(rename = "dia_semana")]
    DayOfWeek,
    /// Derived hour of day 0-23 (`hora_dia`).
    #[strum(serialize = "hora_dia")]
    #[serde(rename = "hora_dia")]
    HourOfDay,
    /// Derived calendar month 1-12 (`mes`).
    #[strum(serialize = "mes")]
    #[serde(rename = "mes")]
    Month,
    /// Derived calendar year (`ano`).
    #[strum(serialize = "ano")]
    #[serde(rename = "ano")]
    Year,
}

impl Column {
    /// Columns that must exist in every dataset variant.
    pub const REQUIRED: &[Self] = &[Self::OccurredAt, Self::Neighborhood, Self::CrimeType];

    /// Source columns, in canonical export order.
    pub const SOURCE: &[Self] = &[
        Self::OccurredAt,
        Self::Neighborhood,
        Self::CrimeType,
        Self::Weapon,
        Self::SuspectSex,
        Self::SuspectAge,
        Self::VictimCount,
        Self::SuspectCount,
        Self::Latitude,
        Self::Longitude,
    ];

    /// Calendar columns derived from `data_ocorrencia` at load time.
    pub const DERIVED: &[Self] = &[Self::DayOfWeek, Self::HourOfDay, Self::Month, Self::Year];

    /// Resolves a normalized header name to a column, honoring known
    /// source aliases (`tipo_arma` for `arma_utilizada`).
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        if header == "tipo_arma" {
            return Some(Self::Weapon);
        }
        header.parse().ok()
    }

    /// Whether this column is computed rather than read from the file.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(
            self,
            Self::DayOfWeek | Self::HourOfDay | Self::Month | Self::Year
        )
    }

    /// Whether values of this column are numeric.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::SuspectAge
                | Self::VictimCount
                | Self::SuspectCount
                | Self::Latitude
                | Self::Longitude
                | Self::HourOfDay
                | Self::Month
                | Self::Year
        )
    }
}

/// Day of the week with the Portuguese labels the original reports used,
/// in canonical Monday-first order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Weekday {
    #[strum(serialize = "Segunda")]
    #[serde(rename = "Segunda")]
    Monday,
    #[strum(serialize = "Terça")]
    #[serde(rename = "Terça")]
    Tuesday,
    #[strum(serialize = "Quarta")]
    #[serde(rename = "Quarta")]
    Wednesday,
    #[strum(serialize = "Quinta")]
    #[serde(rename = "Quinta")]
    Thursday,
    #[strum(serialize = "Sexta")]
    #[serde(rename = "Sexta")]
    Friday,
    #[strum(serialize = "Sábado")]
    #[serde(rename = "Sábado")]
    Saturday,
    #[strum(serialize = "Domingo")]
    #[serde(rename = "Domingo")]
    Sunday,
}

impl Weekday {
    /// All days, Monday first.
    pub const ALL: &[Self] = &[
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Index in the canonical Monday-first week, 0-6.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The localized label (`Segunda`..`Domingo`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monday => "Segunda",
            Self::Tuesday => "Terça",
            Self::Wednesday => "Quarta",
            Self::Thursday => "Quinta",
            Self::Friday => "Sexta",
            Self::Saturday => "Sábado",
            Self::Sunday => "Domingo",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// The set of columns a loaded dataset actually exposes.
///
/// Some dataset variants omit optional columns (`arma_utilizada`,
/// `sexo_suspeito`, coordinates); predicates and aggregations check here
/// before touching one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Builds a schema from the present source columns. Derived columns
    /// are always included since they are computed for every dataset.
    #[must_use]
    pub fn new(source_columns: impl IntoIterator<Item = Column>) -> Self {
        let mut columns: Vec<Column> = source_columns
            .into_iter()
            .filter(|c| !c.is_derived())
            .collect();
        columns.sort_unstable();
        columns.dedup();
        columns.extend_from_slice(Column::DERIVED);
        Self { columns }
    }

    /// Whether this dataset exposes the given column.
    #[must_use]
    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Source columns present, in canonical export order.
    #[must_use]
    pub fn source_columns(&self) -> Vec<Column> {
        Column::SOURCE
            .iter()
            .copied()
            .filter(|c| self.has(*c))
            .collect()
    }

    /// All present columns, source then derived.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

/// One recorded criminal occurrence.
///
/// Optional fields are `None` either because the value was blank or the
/// whole column is absent from the dataset variant; the [`Schema`]
/// distinguishes the two. Derived fields are `None` exactly when
/// `occurred_at` is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Occurrence timestamp; `None` when the source value was blank or
    /// unparseable.
    pub occurred_at: Option<NaiveDateTime>,
    /// Neighborhood label.
    pub neighborhood: String,
    /// Crime type label.
    pub crime_type: String,
    /// Weapon used, if recorded.
    pub weapon: Option<String>,
    /// Suspect sex, if recorded.
    pub suspect_sex: Option<String>,
    /// Suspect age, if recorded.
    pub suspect_age: Option<f64>,
    /// Number of victims, if recorded.
    pub victim_count: Option<f64>,
    /// Number of suspects, if recorded.
    pub suspect_count: Option<f64>,
    /// Latitude, if recorded.
    pub latitude: Option<f64>,
    /// Longitude, if recorded.
    pub longitude: Option<f64>,
    /// Derived day of week.
    pub day_of_week: Option<Weekday>,
    /// Derived hour of day, 0-23.
    pub hour_of_day: Option<u32>,
    /// Derived calendar month, 1-12.
    pub month: Option<u32>,
    /// Derived calendar year.
    pub year: Option<i32>,
}

impl IncidentRecord {
    /// Builds a record with derived calendar fields computed from the
    /// timestamp.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        occurred_at: Option<NaiveDateTime>,
        neighborhood: String,
        crime_type: String,
        weapon: Option<String>,
        suspect_sex: Option<String>,
        suspect_age: Option<f64>,
        victim_count: Option<f64>,
        suspect_count: Option<f64>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            day_of_week: occurred_at.map(|t| Weekday::from(t.weekday())),
            hour_of_day: occurred_at.map(|t| t.hour()),
            month: occurred_at.map(|t| t.month()),
            year: occurred_at.map(|t| t.year()),
            occurred_at,
            neighborhood,
            crime_type,
            weapon,
            suspect_sex,
            suspect_age,
            victim_count,
            suspect_count,
            latitude,
            longitude,
        }
    }
}
