//! Aggregations over a dataset view.
//!
//! Pure functions of the view's rows; all of them return explicit empty
//! results on an empty view so the rendering layer can show a "no data"
//! state instead of catching errors.

use std::collections::{BTreeMap, HashMap};

use delit_dataset_models::{Column, IncidentRecord, Weekday};
use delit_query_models::{
    BucketCount, CategoryCount, DatasetSummary, GroupMean, NumericColumnStats, TimeGranularity,
};

use crate::DatasetView;

impl DatasetView<'_> {
    /// The most frequent value of `column`, or `None` on an empty view
    /// or a column with no values.
    ///
    /// Ties break toward the value first encountered in row order; this
    /// is deterministic per run but otherwise unspecified, so callers
    /// must not treat a particular tie winner as meaningful.
    #[must_use]
    pub fn mode(&self, column: Column) -> Option<String> {
        let counts = self.value_counts(column);
        let mut best: Option<(&String, u64)> = None;
        for (value, count) in &counts {
            if best.is_none_or(|(_, c)| *count > c) {
                best = Some((value, *count));
            }
        }
        best.map(|(value, _)| value.clone())
    }

    /// Arithmetic mean of `column` over non-null numeric entries, or
    /// `None` when there are none.
    #[must_use]
    pub fn mean(&self, column: Column) -> Option<f64> {
        let mut sum = 0.0;
        let mut n: u64 = 0;
        for record in self.records() {
            if let Some(value) = numeric_value(record, column) {
                sum += value;
                n += 1;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        (n > 0).then(|| sum / n as f64)
    }

    /// The `n` most frequent values of `column`, descending by count,
    /// insertion-stable for ties. Returns fewer entries when fewer
    /// distinct values exist.
    #[must_use]
    pub fn top_n(&self, column: Column, n: usize) -> Vec<CategoryCount> {
        let mut counts = self.value_counts(column);
        // Stable sort keeps first-encountered order within equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(n);
        counts
            .into_iter()
            .map(|(value, count)| CategoryCount { value, count })
            .collect()
    }

    /// Time-bucketed counts over rows with a parseable timestamp.
    ///
    /// Hour-of-day and day-of-week return fixed-size bucket lists (24
    /// and 7 entries) including zero counts; calendar-date bucketing
    /// returns only dates that occur, ascending.
    #[must_use]
    pub fn bucket_by(&self, granularity: TimeGranularity) -> Vec<BucketCount> {
        match granularity {
            TimeGranularity::HourOfDay => {
                let mut counts = [0u64; 24];
                for record in self.records() {
                    if let Some(hour) = record.hour_of_day {
                        counts[hour as usize] += 1;
                    }
                }
                counts
                    .iter()
                    .enumerate()
                    .map(|(hour, &count)| BucketCount {
                        bucket: hour.to_string(),
                        count,
                    })
                    .collect()
            }
            TimeGranularity::DayOfWeek => {
                let mut counts = [0u64; 7];
                for record in self.records() {
                    if let Some(day) = record.day_of_week {
                        counts[day.index()] += 1;
                    }
                }
                Weekday::ALL
                    .iter()
                    .map(|day| BucketCount {
                        bucket: day.label().to_string(),
                        count: counts[day.index()],
                    })
                    .collect()
            }
            TimeGranularity::Date => {
                let mut counts: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
                for record in self.records() {
                    if let Some(at) = record.occurred_at {
                        *counts.entry(at.date()).or_insert(0) += 1;
                    }
                }
                counts
                    .into_iter()
                    .map(|(date, count)| BucketCount {
                        bucket: date.to_string(),
                        count,
                    })
                    .collect()
            }
        }
    }

    /// Mean of `value_column` per distinct value of `group_column`,
    /// groups in first-encountered row order. Groups with no numeric
    /// entries are omitted.
    #[must_use]
    pub fn mean_by_group(&self, group_column: Column, value_column: Column) -> Vec<GroupMean> {
        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, (f64, u64)> = HashMap::new();

        for record in self.records() {
            let Some(group) = categorical_value(record, group_column) else {
                continue;
            };
            let Some(value) = numeric_value(record, value_column) else {
                continue;
            };
            let entry = sums.entry(group.clone()).or_insert_with(|| {
                order.push(group);
                (0.0, 0)
            });
            entry.0 += value;
            entry.1 += 1;
        }

        order
            .into_iter()
            .map(|group| {
                let (sum, n) = sums[&group];
                #[allow(clippy::cast_precision_loss)]
                GroupMean {
                    group,
                    mean: sum / n as f64,
                }
            })
            .collect()
    }

    /// `(latitude, longitude)` pairs for rows carrying both coordinates,
    /// for the external map surface.
    #[must_use]
    pub fn heat_points(&self) -> Vec<(f64, f64)> {
        self.records()
            .filter_map(|r| Some((r.latitude?, r.longitude?)))
            .collect()
    }

    /// High-level summary of this view: row/column counts and
    /// describe-style stats per numeric column.
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let columns = self.schema().columns();
        let numeric: Vec<Column> = columns.iter().copied().filter(|c| c.is_numeric()).collect();

        let numeric_stats = numeric
            .iter()
            .map(|&column| {
                let mut count: u64 = 0;
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                let mut sum = 0.0;
                for record in self.records() {
                    if let Some(value) = numeric_value(record, column) {
                        count += 1;
                        min = min.min(value);
                        max = max.max(value);
                        sum += value;
                    }
                }
                #[allow(clippy::cast_precision_loss)]
                NumericColumnStats {
                    column: column.to_string(),
                    count,
                    mean: (count > 0).then(|| sum / count as f64),
                    min: (count > 0).then_some(min),
                    max: (count > 0).then_some(max),
                }
            })
            .collect();

        DatasetSummary {
            total_records: self.len() as u64,
            total_columns: columns.len() as u64,
            numeric_columns: numeric.len() as u64,
            categorical_columns: (columns.len() - numeric.len()) as u64,
            numeric_stats,
        }
    }

    /// Occurrence counts per distinct value of `column`, in
    /// first-encountered row order.
    fn value_counts(&self, column: Column) -> Vec<(String, u64)> {
        let mut order: Vec<(String, u64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in self.records() {
            let Some(value) = categorical_value(record, column) else {
                continue;
            };
            match index.get(&value) {
                Some(&i) => order[i].1 += 1,
                None => {
                    index.insert(value.clone(), order.len());
                    order.push((value, 1));
                }
            }
        }

        order
    }
}

/// The value of `column` for one record as a categorical label, `None`
/// when blank or not applicable.
fn categorical_value(record: &IncidentRecord, column: Column) -> Option<String> {
    fn non_empty(s: &str) -> Option<String> {
        (!s.is_empty()).then(|| s.to_string())
    }

    match column {
        Column::Neighborhood => non_empty(&record.neighborhood),
        Column::CrimeType => non_empty(&record.crime_type),
        Column::Weapon => record.weapon.clone(),
        Column::SuspectSex => record.suspect_sex.clone(),
        Column::DayOfWeek => record.day_of_week.map(|d| d.label().to_string()),
        Column::HourOfDay => record.hour_of_day.map(|h| h.to_string()),
        Column::Month => record.month.map(|m| m.to_string()),
        Column::Year => record.year.map(|y| y.to_string()),
        Column::SuspectAge => record.suspect_age.map(|v| v.to_string()),
        Column::VictimCount => record.victim_count.map(|v| v.to_string()),
        Column::SuspectCount => record.suspect_count.map(|v| v.to_string()),
        Column::OccurredAt | Column::Latitude | Column::Longitude => None,
    }
}

/// The value of `column` for one record as a number, `None` when blank
/// or non-numeric.
fn numeric_value(record: &IncidentRecord, column: Column) -> Option<f64> {
    match column {
        Column::SuspectAge => record.suspect_age,
        Column::VictimCount => record.victim_count,
        Column::SuspectCount => record.suspect_count,
        Column::Latitude => record.latitude,
        Column::Longitude => record.longitude,
        Column::HourOfDay => record.hour_of_day.map(f64::from),
        Column::Month => record.month.map(f64::from),
        Column::Year => record.year.map(f64::from),
        Column::OccurredAt
        | Column::Neighborhood
        | Column::CrimeType
        | Column::Weapon
        | Column::SuspectSex
        | Column::DayOfWeek => None,
    }
}

#[cfg(test)]
mod tests {
    use delit_dataset::Dataset;
    use delit_query_models::FilterCriteria;

    use super::*;

    fn dataset() -> Dataset {
        let csv = "\
data_ocorrencia,bairro,tipo_crime,idade_suspeito,latitude,longitude
2024-03-04 22:00:00,A,Furto,20,-8.05,-34.88
2024-03-05 08:00:00,A,Furto,30,-8.06,-34.89
2024-03-06 14:00:00,B,Roubo,40,,
";
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    fn empty_view(dataset: &Dataset) -> DatasetView<'_> {
        DatasetView::all(dataset).filter(&FilterCriteria::none().with_neighborhood("Z"))
    }

    #[test]
    fn scenario_from_three_rows() {
        // neighborhood {A,A,B}, crime {Furto,Furto,Roubo}
        let dataset = dataset();
        let view = DatasetView::all(&dataset);

        let filtered = view.filter(&FilterCriteria::none().with_neighborhood("A"));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.mode(Column::CrimeType).as_deref(), Some("Furto"));

        let top = view.top_n(Column::CrimeType, 5);
        assert_eq!(
            top,
            vec![
                CategoryCount {
                    value: "Furto".into(),
                    count: 2
                },
                CategoryCount {
                    value: "Roubo".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn mode_on_empty_view_is_none() {
        let dataset = dataset();
        let view = empty_view(&dataset);
        assert_eq!(view.mode(Column::CrimeType), None);
        assert_eq!(view.mean(Column::SuspectAge), None);
        assert!(view.top_n(Column::CrimeType, 5).is_empty());
    }

    #[test]
    fn mode_tie_breaks_toward_first_encountered() {
        let csv = "\
data_ocorrencia,bairro,tipo_crime
2024-03-04 10:00:00,A,Roubo
2024-03-04 11:00:00,A,Furto
2024-03-04 12:00:00,B,Furto
2024-03-04 13:00:00,B,Roubo
";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let view = DatasetView::all(&dataset);
        // Two-way tie: either value is acceptable, but it must be stable
        // across repeated calls on the same input.
        let first = view.mode(Column::CrimeType).unwrap();
        assert!(first == "Roubo" || first == "Furto");
        assert_eq!(view.mode(Column::CrimeType).unwrap(), first);
    }

    #[test]
    fn mean_skips_missing_entries() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let mean = view.mean(Column::SuspectAge).unwrap();
        assert!((mean - 30.0).abs() < f64::EPSILON);

        let mean_lat = view.mean(Column::Latitude).unwrap();
        assert!((mean_lat - (-8.055)).abs() < 1e-9);
    }

    #[test]
    fn top_n_truncation_never_errors() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        assert_eq!(view.top_n(Column::Neighborhood, 100).len(), 2);
        assert_eq!(view.top_n(Column::Neighborhood, 1).len(), 1);
    }

    #[test]
    fn day_of_week_buckets_are_fixed_and_monday_first() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let buckets = view.bucket_by(TimeGranularity::DayOfWeek);

        assert_eq!(buckets.len(), 7);
        let labels: Vec<&str> = buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(
            labels,
            ["Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo"]
        );
        // 2024-03-04/05/06 are Mon/Tue/Wed.
        let counts: Vec<u64> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, [1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn hour_buckets_are_fixed_24() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let buckets = view.bucket_by(TimeGranularity::HourOfDay);
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[8].count, 1);
        assert_eq!(buckets[22].count, 1);
        assert_eq!(buckets[0].count, 0);
    }

    #[test]
    fn date_buckets_omit_empty_dates() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let buckets = view.bucket_by(TimeGranularity::Date);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].bucket, "2024-03-04");
        assert!(buckets.iter().all(|b| b.count == 1));
    }

    #[test]
    fn day_of_week_buckets_on_empty_view_are_all_zero() {
        let dataset = dataset();
        let view = empty_view(&dataset);
        let buckets = view.bucket_by(TimeGranularity::DayOfWeek);
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn mean_hour_per_crime_type() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let means = view.mean_by_group(Column::CrimeType, Column::HourOfDay);

        assert_eq!(means.len(), 2);
        assert_eq!(means[0].group, "Furto");
        assert!((means[0].mean - 15.0).abs() < f64::EPSILON);
        assert_eq!(means[1].group, "Roubo");
        assert!((means[1].mean - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn heat_points_require_both_coordinates() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let points = view.heat_points();
        assert_eq!(points.len(), 2);
        assert!((points[0].0 - (-8.05)).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_counts_columns_and_rows() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let summary = view.summary();

        assert_eq!(summary.total_records, 3);
        assert_eq!(
            summary.numeric_columns + summary.categorical_columns,
            summary.total_columns
        );

        let age = summary
            .numeric_stats
            .iter()
            .find(|s| s.column == "idade_suspeito")
            .unwrap();
        assert_eq!(age.count, 3);
        assert_eq!(age.min, Some(20.0));
        assert_eq!(age.max, Some(40.0));
    }
}
