//! CSV export of a (possibly filtered) set of records.
//!
//! Writes the normalized header names and only the source columns the
//! dataset variant actually carries, so an exported view reloads with the
//! same schema and values. Derived calendar columns are never exported.

use std::io::Write;

use delit_dataset_models::{Column, IncidentRecord, Schema};

/// Timestamp format used for exported `data_ocorrencia` values.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serializes the given records to CSV with the schema's source columns.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn export_csv<'a>(
    schema: &Schema,
    records: impl IntoIterator<Item = &'a IncidentRecord>,
    writer: impl Write,
) -> Result<(), csv::Error> {
    let columns = schema.source_columns();
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(Column::as_ref))?;

    let mut rows: u64 = 0;
    for record in records {
        csv_writer.write_record(columns.iter().map(|c| field_value(record, *c)))?;
        rows += 1;
    }

    csv_writer.flush()?;
    log::debug!("Exported {rows} rows across {} columns", columns.len());
    Ok(())
}

fn field_value(record: &IncidentRecord, column: Column) -> String {
    fn opt_num(value: Option<f64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    match column {
        Column::OccurredAt => record
            .occurred_at
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        Column::Neighborhood => record.neighborhood.clone(),
        Column::CrimeType => record.crime_type.clone(),
        Column::Weapon => record.weapon.clone().unwrap_or_default(),
        Column::SuspectSex => record.suspect_sex.clone().unwrap_or_default(),
        Column::SuspectAge => opt_num(record.suspect_age),
        Column::VictimCount => opt_num(record.victim_count),
        Column::SuspectCount => opt_num(record.suspect_count),
        Column::Latitude => opt_num(record.latitude),
        Column::Longitude => opt_num(record.longitude),
        // Derived columns are not part of the export surface.
        Column::DayOfWeek | Column::HourOfDay | Column::Month | Column::Year => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::Dataset;

    use super::*;

    const SAMPLE: &str = "\
data_ocorrencia,bairro,tipo_crime,arma_utilizada,latitude,longitude
2024-03-01 22:30:00,Centro,Furto,Faca,-8.0476,-34.877
,Boa Viagem,Roubo,,,
";

    #[test]
    fn export_roundtrips_through_loader() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        export_csv(dataset.schema(), dataset.records(), &mut buffer).unwrap();

        let reloaded = Dataset::from_reader(buffer.as_slice()).unwrap();
        assert_eq!(reloaded.len(), dataset.len());
        assert_eq!(reloaded.schema(), dataset.schema());
        assert_eq!(reloaded.records(), dataset.records());
    }

    #[test]
    fn export_keeps_only_present_columns() {
        let csv = "data_ocorrencia,bairro,tipo_crime\n2024-03-01 22:30:00,Centro,Furto\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        export_csv(dataset.schema(), dataset.records(), &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "data_ocorrencia,bairro,tipo_crime");
    }

    #[test]
    fn export_of_no_rows_still_writes_header() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        export_csv(dataset.schema(), std::iter::empty(), &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
