//! CSV transcript parser.
//!
//! Expected headers: `label,credits,mark,categories,sequence`. Only `label`
//! must be present as a column; every raw field is run through the input
//! validator before it becomes part of a [`GradeEntry`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::engine::types::{GradeEntry, Mark};
use crate::engine::validate::InputLimits;

/// Separator between tags in the `categories` column.
const CATEGORY_SEPARATOR: char = ';';

#[derive(Debug, Deserialize)]
struct TranscriptRow {
    label: String,
    #[serde(default)]
    credits: String,
    #[serde(default)]
    mark: String,
    #[serde(default)]
    categories: String,
    #[serde(default)]
    sequence: String,
}

/// Why a field did not make it into the transcript unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    /// Value was outside its legal range and moved to `value`.
    Clamped { value: f64 },
    /// Field was empty or unusable; the whole row was skipped.
    NotProvided,
    /// Field could not be read and was left unset; the row was kept.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputWarning {
    /// 1-based data row, not counting the header.
    pub row: usize,
    pub field: &'static str,
    pub raw: String,
    pub kind: WarningKind,
}

#[derive(Debug, Default)]
pub struct ParsedTranscript {
    pub entries: Vec<GradeEntry>,
    pub warnings: Vec<InputWarning>,
}

impl ParsedTranscript {
    /// Number of rows dropped because a required field was missing.
    pub fn skipped_rows(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.kind == WarningKind::NotProvided)
            .count()
    }
}

/// Reads a transcript CSV file from `path`.
pub fn load_transcript(path: &Path, limits: &InputLimits) -> Result<ParsedTranscript> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open transcript at {}", path.display()))?;
    parse_transcript(file, limits)
        .with_context(|| format!("Failed to parse transcript at {}", path.display()))
}

/// Parses transcript CSV from any reader.
///
/// # Errors
///
/// Returns an error if the CSV is malformed or lacks a `label` column.
/// Bad field values never fail the parse; they produce [`InputWarning`]s.
pub fn parse_transcript<R: Read>(reader: R, limits: &InputLimits) -> Result<ParsedTranscript> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut parsed = ParsedTranscript::default();

    for (i, result) in rdr.deserialize::<TranscriptRow>().enumerate() {
        let row = result?;
        let row_number = i + 1;

        if let Some(entry) = parse_row(row, row_number, limits, &mut parsed.warnings) {
            parsed.entries.push(entry);
        }
    }

    debug!(
        entries = parsed.entries.len(),
        warnings = parsed.warnings.len(),
        "Transcript parsed"
    );

    Ok(parsed)
}

fn parse_row(
    row: TranscriptRow,
    row_number: usize,
    limits: &InputLimits,
    warnings: &mut Vec<InputWarning>,
) -> Option<GradeEntry> {
    let mut warn = |field: &'static str, raw: &str, kind: WarningKind| {
        warnings.push(InputWarning {
            row: row_number,
            field,
            raw: raw.to_string(),
            kind,
        });
    };

    let Some(credits) = limits.credits.clamp(&row.credits) else {
        debug!(row = row_number, label = %row.label, "Credits not provided, skipping row");
        warn("credits", &row.credits, WarningKind::NotProvided);
        return None;
    };
    if credits.clamped {
        warn("credits", &row.credits, WarningKind::Clamped { value: credits.value });
    }

    let mark = if row.mark.is_empty() {
        debug!(row = row_number, label = %row.label, "Mark not provided, skipping row");
        warn("mark", &row.mark, WarningKind::NotProvided);
        return None;
    } else if let Ok(pct) = row.mark.parse::<f64>() {
        let Some(clamped) = limits.percentage.clamp_value(pct) else {
            debug!(row = row_number, label = %row.label, "Mark is not a finite percentage, skipping row");
            warn("mark", &row.mark, WarningKind::NotProvided);
            return None;
        };
        if clamped.clamped {
            warn("mark", &row.mark, WarningKind::Clamped { value: clamped.value });
        }
        Mark::Percentage(clamped.value)
    } else {
        Mark::Grade(row.mark.clone())
    };

    let categories: BTreeSet<String> = row
        .categories
        .split(CATEGORY_SEPARATOR)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    let sequence = if row.sequence.is_empty() {
        None
    } else {
        match row.sequence.parse::<u32>() {
            Ok(seq) => Some(seq),
            Err(_) => {
                warn("sequence", &row.sequence, WarningKind::Ignored);
                None
            }
        }
    };

    Some(GradeEntry {
        label: row.label,
        credit_weight: credits.value,
        mark,
        categories,
        sequence,
    })
}
