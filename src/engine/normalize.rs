//! Grade normalization: grade tokens and percentages to grade points.

use serde::{Deserialize, Serialize};

use crate::engine::classify::PercentageScale;
use crate::engine::types::{Mark, NormalizedMark};

/// Highest point value a grade may carry.
pub const MAX_POINTS: f64 = 4.0;

/// One row of a grade-point table. Tokens without points (pass, no-pass,
/// withdrawn) are recognized but never count toward a GPA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradePoint {
    pub token: String,
    #[serde(default)]
    pub points: Option<f64>,
}

impl GradePoint {
    pub fn new(token: &str, points: f64) -> Self {
        GradePoint {
            token: token.to_string(),
            points: Some(points),
        }
    }

    pub fn excluded(token: &str) -> Self {
        GradePoint {
            token: token.to_string(),
            points: None,
        }
    }
}

/// Ordered, case-sensitive mapping from grade token to points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradePointTable {
    grades: Vec<GradePoint>,
}

impl GradePointTable {
    pub fn new(grades: Vec<GradePoint>) -> Self {
        GradePointTable { grades }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GradePoint> {
        self.grades.iter()
    }

    pub fn lookup(&self, token: &str) -> Option<&GradePoint> {
        self.grades.iter().find(|g| g.token == token)
    }

    pub fn is_recognized(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    /// Maps a token to its points. Unknown tokens are excluded rather than
    /// scored as zero.
    pub fn normalize(&self, token: &str) -> NormalizedMark {
        match self.lookup(token).and_then(|g| g.points) {
            Some(points) => NormalizedMark::counted(points),
            None => NormalizedMark::excluded(),
        }
    }
}

/// Normalizes any mark: tokens through the table, percentages through the
/// scale's per-entry classification.
pub fn normalize(mark: &Mark, table: &GradePointTable, scale: &PercentageScale) -> NormalizedMark {
    match mark {
        Mark::Grade(token) => table.normalize(token),
        Mark::Percentage(pct) if pct.is_finite() => scale
            .classify(*pct)
            .map(|band| NormalizedMark::counted(band.point))
            .unwrap_or_else(NormalizedMark::excluded),
        Mark::Percentage(_) => NormalizedMark::excluded(),
    }
}
