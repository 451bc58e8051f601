//! Dataset views and filter predicate application.

use delit_dataset::Dataset;
use delit_dataset_models::{Column, IncidentRecord, Schema};
use delit_query_models::FilterCriteria;

/// A borrowed subset of a dataset's rows.
///
/// Views are cheap to clone and filtering always yields a new view; the
/// underlying dataset is never mutated.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> DatasetView<'a> {
    /// A view over every row of the dataset.
    #[must_use]
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            rows: (0..dataset.len()).collect(),
        }
    }

    /// Applies the criteria to this view's rows, yielding a narrowed
    /// view.
    ///
    /// Constraints compose by AND across fields and by OR across the
    /// selected values within one field. A constraint referencing a
    /// column this dataset variant does not expose is treated as
    /// always-true.
    #[must_use]
    pub fn filter(&self, criteria: &FilterCriteria) -> Self {
        if criteria.is_empty() {
            return self.clone();
        }

        let schema = self.dataset.schema();
        let records = self.dataset.records();
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&i| matches(&records[i], criteria, schema))
            .collect();

        Self {
            dataset: self.dataset,
            rows,
        }
    }

    /// The dataset this view borrows.
    #[must_use]
    pub const fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// The schema of the underlying dataset.
    #[must_use]
    pub const fn schema(&self) -> &'a Schema {
        self.dataset.schema()
    }

    /// Records currently in scope, in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a IncidentRecord> + '_ {
        let records = self.dataset.records();
        self.rows.iter().map(move |&i| &records[i])
    }

    /// Number of rows in scope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are in scope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn matches(record: &IncidentRecord, criteria: &FilterCriteria, schema: &Schema) -> bool {
    if !criteria.neighborhoods.is_empty()
        && !criteria.neighborhoods.contains(&record.neighborhood)
    {
        return false;
    }

    if !criteria.crime_types.is_empty() && !criteria.crime_types.contains(&record.crime_type) {
        return false;
    }

    if !matches_optional_label(
        &criteria.weapons,
        record.weapon.as_ref(),
        Column::Weapon,
        schema,
    ) {
        return false;
    }

    if !matches_optional_label(
        &criteria.suspect_sexes,
        record.suspect_sex.as_ref(),
        Column::SuspectSex,
        schema,
    ) {
        return false;
    }

    if criteria.age_min.is_some() || criteria.age_max.is_some() {
        if schema.has(Column::SuspectAge) {
            let Some(age) = record.suspect_age else {
                return false;
            };
            if criteria.age_min.is_some_and(|min| age < min)
                || criteria.age_max.is_some_and(|max| age > max)
            {
                return false;
            }
        } else {
            log::debug!("Age criterion ignored: dataset has no idade_suspeito column");
        }
    }

    if criteria.requires_timestamp() {
        // A row whose timestamp failed to parse cannot satisfy any time
        // constraint.
        let Some(occurred_at) = record.occurred_at else {
            return false;
        };
        let date = occurred_at.date();

        if criteria.date.is_some_and(|d| d != date) {
            return false;
        }
        if criteria.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if criteria.date_to.is_some_and(|to| date > to) {
            return false;
        }

        if let Some(hour) = record.hour_of_day {
            if criteria.hour_from.is_some_and(|from| hour < from)
                || criteria.hour_to.is_some_and(|to| hour > to)
            {
                return false;
            }
        }

        if let Some(year) = record.year
            && !criteria.years.is_empty()
            && !criteria.years.contains(&year)
        {
            return false;
        }

        if let Some(month) = record.month
            && !criteria.months.is_empty()
            && !criteria.months.contains(&month)
        {
            return false;
        }
    }

    true
}

/// OR-matches an optional categorical field; a criterion on a column the
/// schema lacks degrades to always-true.
fn matches_optional_label(
    selected: &[String],
    value: Option<&String>,
    column: Column,
    schema: &Schema,
) -> bool {
    if selected.is_empty() {
        return true;
    }
    if !schema.has(column) {
        log::debug!("Criterion on '{column}' ignored: column absent from dataset");
        return true;
    }
    value.is_some_and(|v| selected.contains(v))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn dataset() -> Dataset {
        let csv = "\
data_ocorrencia,bairro,tipo_crime,arma_utilizada,sexo_suspeito,idade_suspeito
2024-03-01 22:30:00,Centro,Furto,Faca,M,25
2024-03-01 08:10:00,Centro,Furto,,F,19
2024-03-02 14:00:00,Boa Viagem,Roubo,Arma de Fogo,M,31
2024-04-10 02:45:00,Centro,Roubo,Arma de Fogo,M,40
invalida,Centro,Furto,Faca,M,22
";
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn empty_criteria_return_the_view_unchanged() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let filtered = view.filter(&FilterCriteria::none());
        assert_eq!(filtered.len(), view.len());
    }

    #[test]
    fn filtered_view_is_a_subset() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let criteria = FilterCriteria::none().with_neighborhood("Centro");
        let filtered = view.filter(&criteria);
        assert_eq!(filtered.len(), 4);
        assert!(filtered.records().all(|r| r.neighborhood == "Centro"));
    }

    #[test]
    fn values_within_one_field_compose_by_or() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let criteria = FilterCriteria::none()
            .with_neighborhood("Centro")
            .with_neighborhood("Boa Viagem");
        assert_eq!(view.filter(&criteria).len(), 5);
    }

    #[test]
    fn fields_compose_by_and() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let criteria = FilterCriteria::none()
            .with_neighborhood("Centro")
            .with_crime_type("Roubo");
        assert_eq!(view.filter(&criteria).len(), 1);
    }

    #[test]
    fn hierarchical_narrowing_equals_simultaneous_filtering() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);

        let staged = view
            .filter(&FilterCriteria::none().with_neighborhood("Centro"))
            .filter(&FilterCriteria::none().with_date(date(2024, 3, 1)));

        let combined = view.filter(
            &FilterCriteria::none()
                .with_neighborhood("Centro")
                .with_date(date(2024, 3, 1)),
        );

        let staged_rows: Vec<_> = staged.records().collect();
        let combined_rows: Vec<_> = combined.records().collect();
        assert_eq!(staged_rows, combined_rows);
        assert_eq!(staged.len(), 2);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let criteria =
            FilterCriteria::none().with_date_range(date(2024, 3, 1), date(2024, 3, 2));
        assert_eq!(view.filter(&criteria).len(), 3);
    }

    #[test]
    fn hour_range_bounds_are_inclusive() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let criteria = FilterCriteria::none().with_hour_range(8, 14);
        assert_eq!(view.filter(&criteria).len(), 2);
    }

    #[test]
    fn unparsed_timestamp_rows_fail_time_criteria_only() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);

        let by_hour = FilterCriteria::none().with_hour_range(0, 23);
        assert_eq!(view.filter(&by_hour).len(), 4);

        let by_weapon = FilterCriteria::none().with_weapon("Faca");
        assert_eq!(view.filter(&by_weapon).len(), 2);
    }

    #[test]
    fn criterion_on_absent_column_is_always_true() {
        let csv = "data_ocorrencia,bairro,tipo_crime\n2024-03-01 10:00:00,Centro,Furto\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let view = DatasetView::all(&dataset);

        let criteria = FilterCriteria::none().with_weapon("Faca");
        assert_eq!(view.filter(&criteria).len(), 1);

        let criteria = FilterCriteria::none().with_age_range(18.0, 30.0);
        assert_eq!(view.filter(&criteria).len(), 1);
    }

    #[test]
    fn age_range_requires_a_recorded_age() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let criteria = FilterCriteria::none().with_age_range(20.0, 31.0);
        // Ages 25, 31, 22 fall inside; 19 and 40 do not.
        assert_eq!(view.filter(&criteria).len(), 3);
    }

    #[test]
    fn year_and_month_criteria_narrow_by_calendar() {
        let dataset = dataset();
        let view = DatasetView::all(&dataset);
        let criteria = FilterCriteria::none().with_year(2024).with_month(4);
        assert_eq!(view.filter(&criteria).len(), 1);
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
