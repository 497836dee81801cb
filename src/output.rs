//! Output formatting and persistence for GPA reports.
//!
//! Supports pretty-printing, JSON files, and CSV summary rows.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::engine::report::GpaReport;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Renders an average for display; an undefined average becomes "N/A"
/// rather than "0.00".
pub fn format_gpa(gpa: Option<f64>) -> String {
    match gpa {
        Some(value) => format!("{:.2}", value),
        None => "N/A".to_string(),
    }
}

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &GpaReport) {
    debug!("{:#?}", report);
}

/// Prints a report to stdout as pretty-printed JSON.
pub fn print_json(report: &GpaReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes any serializable value to `path` as pretty-printed JSON.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Flat, one-line view of a report for CSV history files.
#[derive(Debug, Serialize)]
pub struct SummaryRow {
    pub generated_at: DateTime<Utc>,
    pub scheme: String,
    pub cumulative_gpa: Option<f64>,
    pub credits_counted: f64,
    pub credits_attempted: f64,
    pub trailing_credit_cap: Option<f64>,
    pub trailing_gpa: Option<f64>,
    pub classification: Option<String>,
}

pub fn summary_row(report: &GpaReport) -> SummaryRow {
    SummaryRow {
        generated_at: report.generated_at,
        scheme: report.scheme.clone(),
        cumulative_gpa: report.cumulative.gpa,
        credits_counted: report.cumulative.credits_counted,
        credits_attempted: report.credits.attempted,
        trailing_credit_cap: report.trailing_window.as_ref().map(|w| w.credit_cap),
        trailing_gpa: report.trailing_window.as_ref().and_then(|w| w.summary.gpa),
        classification: report.classification.as_ref().map(|c| c.label.clone()),
    }
}

/// Appends a [`SummaryRow`] to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, row: &SummaryRow) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::report::{ReportRequest, build_report};
    use crate::engine::types::GradeEntry;
    use crate::scheme::Preset;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_report() -> GpaReport {
        let entries = vec![
            GradeEntry::graded("Calculus", 4.0, "A").with_sequence(1),
            GradeEntry::graded("Writing", 3.0, "B").with_sequence(2),
        ];
        let request = ReportRequest {
            categories: vec![],
            trailing_credit_cap: Some(3.0),
        };
        build_report(&entries, &Preset::UsPlusMinus.scheme(), &request)
    }

    #[test]
    fn test_format_gpa() {
        assert_eq!(format_gpa(Some(3.47142)), "3.47");
        assert_eq!(format_gpa(Some(0.0)), "0.00");
        assert_eq!(format_gpa(None), "N/A");
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_report()).unwrap();
    }

    #[test]
    fn test_summary_row() {
        let row = summary_row(&sample_report());
        assert_eq!(row.scheme, "us-plus-minus");
        assert_eq!(row.credits_counted, 7.0);
        assert_eq!(row.trailing_credit_cap, Some(3.0));
        assert_eq!(row.trailing_gpa, Some(3.0));
        assert_eq!(row.classification, None);
    }

    #[test]
    fn test_write_json() {
        let path = temp_path("gpa_rater_test_report.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &sample_report()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["cumulative"]["credits_counted"], 7.0);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("gpa_rater_test_header.csv");
        let _ = fs::remove_file(&path);

        let row = summary_row(&sample_report());
        append_record(&path, &row).unwrap();
        append_record(&path, &row).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Header line should appear exactly once
        let header_count = content.lines().filter(|l| l.contains("generated_at")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }
}
