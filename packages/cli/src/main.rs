#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operator CLI for the DELIT incident query engine.
//!
//! One full recomputation per invocation: load (through the
//! checksum-keyed cache), filter, aggregate, print. Structured results
//! go to stdout as plain tables or, with `--json`, as JSON for an
//! external rendering surface. Every failure path is a displayable
//! message and a nonzero exit; empty aggregations render a neutral
//! "no data" notice instead.

mod report;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use delit_dataset::DatasetCache;
use delit_query::DatasetView;
use delit_query_models::FilterCriteria;

#[derive(Parser)]
#[command(name = "delit", about = "Incident analytics over a police occurrence dataset")]
struct Cli {
    /// Path to the occurrence dataset CSV.
    #[arg(long)]
    dataset: PathBuf,

    /// Emit structured JSON instead of tables.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dataset overview: record/column counts and numeric describe rows.
    Summary,
    /// Hierarchical report: most frequent crime and hour, top-5 crime
    /// types, day-of-week and hour-of-day counts, mean hour per crime.
    Report(FilterArgs),
    /// Filtered counts by crime type and neighborhood plus heat points.
    Hotspots(FilterArgs),
    /// Next-period crime-type forecast from the trained classifier.
    Forecast {
        #[command(flatten)]
        filters: FilterArgs,

        /// Serialized random-forest model artifact.
        #[arg(long)]
        model: PathBuf,

        /// Trained one-hot column list artifact.
        #[arg(long)]
        columns: PathBuf,

        /// Reference date for the recent window (defaults to today).
        #[arg(long)]
        reference_date: Option<NaiveDate>,
    },
    /// Write the filtered view back out as CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,
    },
}

/// Shared filter flags; repeatable flags OR within the field, distinct
/// flags AND across fields.
#[derive(Args)]
struct FilterArgs {
    /// Neighborhood to match (repeatable).
    #[arg(long = "neighborhood")]
    neighborhoods: Vec<String>,

    /// Crime type to match (repeatable).
    #[arg(long = "crime-type")]
    crime_types: Vec<String>,

    /// Weapon to match (repeatable).
    #[arg(long = "weapon")]
    weapons: Vec<String>,

    /// Suspect sex to match (repeatable).
    #[arg(long = "suspect-sex")]
    suspect_sexes: Vec<String>,

    /// Exact occurrence date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Occurrence date lower bound, inclusive.
    #[arg(long)]
    date_from: Option<NaiveDate>,

    /// Occurrence date upper bound, inclusive.
    #[arg(long)]
    date_to: Option<NaiveDate>,

    /// Hour-of-day lower bound, inclusive (0-23).
    #[arg(long)]
    hour_from: Option<u32>,

    /// Hour-of-day upper bound, inclusive (0-23).
    #[arg(long)]
    hour_to: Option<u32>,

    /// Calendar year to match (repeatable).
    #[arg(long = "year")]
    years: Vec<i32>,

    /// Calendar month to match, 1-12 (repeatable).
    #[arg(long = "month")]
    months: Vec<u32>,

    /// Suspect age lower bound, inclusive.
    #[arg(long)]
    age_min: Option<f64>,

    /// Suspect age upper bound, inclusive.
    #[arg(long)]
    age_max: Option<f64>,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            neighborhoods: self.neighborhoods.clone(),
            crime_types: self.crime_types.clone(),
            weapons: self.weapons.clone(),
            suspect_sexes: self.suspect_sexes.clone(),
            years: self.years.clone(),
            months: self.months.clone(),
            date: self.date,
            date_from: self.date_from,
            date_to: self.date_to,
            hour_from: self.hour_from,
            hour_to: self.hour_to,
            age_min: self.age_min,
            age_max: self.age_max,
        }
    }
}

fn main() {
    pretty_env_logger::init_custom_env("RUST_LOG");

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cache = DatasetCache::new();
    let dataset = cache.load(&cli.dataset)?;
    let view = DatasetView::all(&dataset);

    match &cli.command {
        Command::Summary => report::summary(&view, cli.json),
        Command::Report(filters) => {
            let filtered = view.filter(&filters.criteria());
            report::report(&filtered, cli.json);
        }
        Command::Hotspots(filters) => {
            let filtered = view.filter(&filters.criteria());
            report::hotspots(&filtered, cli.json);
        }
        Command::Forecast {
            filters,
            model,
            columns,
            reference_date,
        } => {
            let artifacts = delit_forecast::load_artifacts(model, columns)?;
            let reference = reference_date.unwrap_or_else(|| chrono::Local::now().date_naive());

            let window = delit_forecast::recent_window(reference);
            let filtered = view.filter(&filters.criteria()).filter(&window);
            log::info!(
                "Forecast window covers months {:?}; {} historical rows",
                window.months,
                filtered.len()
            );

            let forecast = delit_forecast::predict(&filtered, &artifacts)?;
            report::forecast(&forecast, cli.json);
        }
        Command::Export { filters, output } => {
            let filtered = view.filter(&filters.criteria());
            let file = std::fs::File::create(output)?;
            delit_dataset::export::export_csv(filtered.schema(), filtered.records(), file)?;
            println!("Exported {} rows to {}", filtered.len(), output.display());
        }
    }

    Ok(())
}
