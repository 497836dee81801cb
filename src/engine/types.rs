//! Data types shared by the aggregation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A mark as entered by the student: either a grade token from the scheme's
/// table or a raw percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Mark {
    Percentage(f64),
    Grade(String),
}

/// One scored unit of work (a course, a module, a unit of study).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub label: String,
    pub credit_weight: f64,
    pub mark: Mark,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Recency index, higher is more recent. Only the trailing window reads it.
    #[serde(default)]
    pub sequence: Option<u32>,
}

impl GradeEntry {
    /// Creates an entry marked with a grade token.
    pub fn graded(label: &str, credit_weight: f64, token: &str) -> Self {
        GradeEntry {
            label: label.to_string(),
            credit_weight,
            mark: Mark::Grade(token.to_string()),
            categories: BTreeSet::new(),
            sequence: None,
        }
    }

    /// Creates an entry marked with a raw percentage.
    pub fn scored(label: &str, credit_weight: f64, percentage: f64) -> Self {
        GradeEntry {
            label: label.to_string(),
            credit_weight,
            mark: Mark::Percentage(percentage),
            categories: BTreeSet::new(),
            sequence: None,
        }
    }

    /// Adds category tags to the entry.
    pub fn in_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Sets the recency index.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Entries with zero or negative credit never take part in an aggregate.
    pub fn has_credit(&self) -> bool {
        self.credit_weight > 0.0
    }
}

/// Result of normalizing a single mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedMark {
    pub points: f64,
    /// Pass/no-pass and unrecognized marks never contribute to a GPA.
    pub excluded: bool,
}

impl NormalizedMark {
    pub fn counted(points: f64) -> Self {
        NormalizedMark {
            points,
            excluded: false,
        }
    }

    pub fn excluded() -> Self {
        NormalizedMark {
            points: 0.0,
            excluded: true,
        }
    }
}

/// Running credit-weighted sum. The average is undefined when no credit was counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub points: f64,
    pub credits_counted: f64,
}

/// Same shape as a normal aggregate, computed over a credit-capped window.
pub type TrailingWindowResult = AggregationResult;

impl AggregationResult {
    /// Adds one contribution of `point` weighted by `credit`.
    pub fn add(&mut self, point: f64, credit: f64) {
        self.points += point * credit;
        self.credits_counted += credit;
    }

    /// Weighted mean, or `None` when nothing qualified.
    ///
    /// `None` means "no data" and must not be displayed as a 0.00 average.
    pub fn gpa(&self) -> Option<f64> {
        if self.credits_counted > 0.0 {
            Some(self.points / self.credits_counted)
        } else {
            None
        }
    }

    /// Weighted mean with the undefined case collapsed to `0.0`.
    pub fn gpa_or_zero(&self) -> f64 {
        self.gpa().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.credits_counted <= 0.0
    }
}

/// Credit bookkeeping across a transcript, independent of any GPA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CreditTotals {
    /// All positive credit, including pass/no-pass and unrecognized marks.
    pub attempted: f64,
    /// Credit that contributed to the cumulative GPA.
    pub counted: f64,
    /// Credit carried by marks excluded from the GPA.
    pub excluded: f64,
}

/// A percentage resolved against a scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub percentage: f64,
    pub point: f64,
    pub label: String,
}
