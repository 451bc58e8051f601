//! Shared parsing utilities for the dataset loader.
//!
//! Lenient timestamp coercion and header normalization applied once at
//! load so downstream code never sees source formatting quirks.

use chrono::{NaiveDate, NaiveDateTime};

/// Parses an occurrence timestamp, trying the formats seen across
/// dataset variants. Returns `None` rather than failing the load.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%d/%m/%Y %H:%M:%S") {
        return Some(dt);
    }
    // Date-only values land at midnight.
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Normalizes a raw CSV header: lowercased, every run of
/// non-alphanumeric characters collapsed to a single `_`, trimmed.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_space_separated_timestamp() {
        let dt = parse_timestamp("2024-01-15 14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_iso_timestamp_with_fractional() {
        let dt = parse_timestamp("2024-01-15T14:30:00.250").unwrap();
        assert_eq!(dt.date().to_string(), "2024-01-15");
    }

    #[test]
    fn parses_brazilian_date_format() {
        let dt = parse_timestamp("15/01/2024 14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn date_only_lands_at_midnight() {
        let dt = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("nunca").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("Data Ocorrencia"), "data_ocorrencia");
        assert_eq!(normalize_header("  BAIRRO "), "bairro");
        assert_eq!(normalize_header("Tipo-do--Crime"), "tipo_do_crime");
        assert_eq!(normalize_header("latitude"), "latitude");
    }
}
