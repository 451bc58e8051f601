//! Plain-table and JSON rendering of query results.
//!
//! The engine emits structured results; this module is the thin
//! rendering collaborator for a terminal. Empty views always render a
//! neutral "no data" notice.

use delit_dataset_models::Column;
use delit_forecast_models::Forecast;
use delit_query::DatasetView;
use delit_query_models::TimeGranularity;

const NO_DATA: &str = "No occurrences match the current filter.";

pub fn summary(view: &DatasetView<'_>, json: bool) {
    let summary = view.summary();

    if json {
        print_json(&serde_json::json!({ "summary": summary }));
        return;
    }

    println!("Records:             {}", summary.total_records);
    println!("Columns:             {}", summary.total_columns);
    println!("Numeric columns:     {}", summary.numeric_columns);
    println!("Categorical columns: {}", summary.categorical_columns);

    if summary.numeric_stats.is_empty() {
        return;
    }
    println!();
    println!("{:<22} {:>8} {:>12} {:>12} {:>12}", "column", "count", "mean", "min", "max");
    for stats in &summary.numeric_stats {
        println!(
            "{:<22} {:>8} {:>12} {:>12} {:>12}",
            stats.column,
            stats.count,
            fmt_opt(stats.mean),
            fmt_opt(stats.min),
            fmt_opt(stats.max),
        );
    }
}

pub fn report(view: &DatasetView<'_>, json: bool) {
    if view.is_empty() {
        println!("{NO_DATA}");
        return;
    }

    let top_crimes = view.top_n(Column::CrimeType, 5);
    let weekdays = view.bucket_by(TimeGranularity::DayOfWeek);
    let hours = view.bucket_by(TimeGranularity::HourOfDay);
    let mean_hour_per_crime = view.mean_by_group(Column::CrimeType, Column::HourOfDay);

    if json {
        print_json(&serde_json::json!({
            "rows": view.len(),
            "mostFrequentCrime": view.mode(Column::CrimeType),
            "mostFrequentHour": view.mode(Column::HourOfDay),
            "topCrimes": top_crimes,
            "byDayOfWeek": weekdays,
            "byHourOfDay": hours,
            "meanHourPerCrime": mean_hour_per_crime,
        }));
        return;
    }

    println!("Rows in view: {}", view.len());
    if let Some(crime) = view.mode(Column::CrimeType) {
        println!("Most frequent crime: {crime}");
    }
    if let Some(hour) = view.mode(Column::HourOfDay) {
        println!("Most frequent hour:  {hour}:00");
    }

    println!();
    println!("Top crime types:");
    for entry in &top_crimes {
        println!("  {:<30} {}", entry.value, entry.count);
    }

    println!();
    println!("By day of week:");
    for bucket in &weekdays {
        println!("  {:<10} {}", bucket.bucket, bucket.count);
    }

    println!();
    println!("By hour of day (non-zero):");
    for bucket in hours.iter().filter(|b| b.count > 0) {
        println!("  {:>2}:00  {}", bucket.bucket, bucket.count);
    }

    if !mean_hour_per_crime.is_empty() {
        println!();
        println!("Mean hour per crime type:");
        for group in &mean_hour_per_crime {
            println!("  {:<30} {:.2}h", group.group, group.mean);
        }
    }
}

pub fn hotspots(view: &DatasetView<'_>, json: bool) {
    if view.is_empty() {
        println!("{NO_DATA}");
        return;
    }

    let by_crime = view.top_n(Column::CrimeType, usize::MAX);
    let by_neighborhood = view.top_n(Column::Neighborhood, usize::MAX);
    let points = view.heat_points();

    if json {
        print_json(&serde_json::json!({
            "rows": view.len(),
            "byCrimeType": by_crime,
            "byNeighborhood": by_neighborhood,
            "heatPoints": points,
        }));
        return;
    }

    println!("Occurrences by crime type:");
    for entry in &by_crime {
        println!("  {:<30} {}", entry.value, entry.count);
    }

    println!();
    println!("Occurrences by neighborhood:");
    for entry in &by_neighborhood {
        println!("  {:<30} {}", entry.value, entry.count);
    }

    println!();
    if points.is_empty() {
        println!("No coordinates available for the heat map.");
    } else {
        println!("Heat points ({}):", points.len());
        for (lat, lon) in &points {
            println!("  {lat},{lon}");
        }
    }
}

pub fn forecast(forecast: &Forecast, json: bool) {
    if json {
        print_json(&serde_json::json!({ "forecast": forecast }));
        return;
    }

    println!("Most likely crime type next period: {}", forecast.label);
    println!();
    for class in &forecast.probabilities {
        println!("  {:<30} {:.1}%", class.label, class.probability * 100.0);
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => log::error!("Failed to serialize output: {err}"),
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
