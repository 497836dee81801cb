use clap::ValueEnum;

use super::GradingScheme;
use crate::engine::classify::{PercentageScale, ScaleBand};
use crate::engine::normalize::{GradePoint, GradePointTable, MAX_POINTS};
use crate::engine::validate::InputLimits;

/// Base letters and their integer grade points.
static LETTERS: &[(&str, f64)] = &[("A", 4.0), ("B", 3.0), ("C", 2.0), ("D", 1.0)];

/// Tokens recognized by every table but never counted toward a GPA.
static NON_GPA_TOKENS: &[&str] = &["P", "NP", "W"];

/// Plus/minus offset, in tenths of a point.
const STEP_TENTHS: f64 = 3.0;

/// Built-in grading schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// US plus/minus letters with a 93/90/87 percentage scale
    UsPlusMinus,
    /// Plus/minus letters with UK degree classification bands
    UkHonours,
    /// Plain letters with a coarse four-band percentage scale
    FourBand,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::UsPlusMinus => "us-plus-minus",
            Preset::UkHonours => "uk-honours",
            Preset::FourBand => "four-band",
        }
    }

    pub fn scheme(&self) -> GradingScheme {
        let (grade_points, percentage_scale) = match self {
            Preset::UsPlusMinus => (plus_minus_table(), us_letter_scale()),
            Preset::UkHonours => (plus_minus_table(), honours_scale()),
            Preset::FourBand => (plain_letter_table(), four_band_scale()),
        };

        GradingScheme {
            name: self.name().to_string(),
            grade_points,
            percentage_scale,
            limits: InputLimits::default(),
        }
    }
}

/// A+ through F with a 0.3 step around each base grade. A plus on the top
/// grade is capped at 4.0.
pub fn plus_minus_table() -> GradePointTable {
    let mut grades = Vec::new();

    for &(letter, base) in LETTERS {
        let tenths = base * 10.0;
        let plus = ((tenths + STEP_TENTHS) / 10.0).min(MAX_POINTS);
        let minus = (tenths - STEP_TENTHS) / 10.0;

        grades.push(GradePoint::new(&format!("{letter}+"), plus));
        grades.push(GradePoint::new(letter, base));
        grades.push(GradePoint::new(&format!("{letter}-"), minus));
    }

    grades.push(GradePoint::new("F", 0.0));
    grades.extend(NON_GPA_TOKENS.iter().map(|t| GradePoint::excluded(t)));

    GradePointTable::new(grades)
}

/// A through F without modifiers.
pub fn plain_letter_table() -> GradePointTable {
    let mut grades: Vec<GradePoint> = LETTERS
        .iter()
        .map(|&(letter, base)| GradePoint::new(letter, base))
        .collect();

    grades.push(GradePoint::new("F", 0.0));
    grades.extend(NON_GPA_TOKENS.iter().map(|t| GradePoint::excluded(t)));

    GradePointTable::new(grades)
}

fn us_letter_scale() -> PercentageScale {
    PercentageScale::new(vec![
        ScaleBand::new(93.0, 4.0, "A"),
        ScaleBand::new(90.0, 3.7, "A-"),
        ScaleBand::new(87.0, 3.3, "B+"),
        ScaleBand::new(83.0, 3.0, "B"),
        ScaleBand::new(80.0, 2.7, "B-"),
        ScaleBand::new(77.0, 2.3, "C+"),
        ScaleBand::new(73.0, 2.0, "C"),
        ScaleBand::new(70.0, 1.7, "C-"),
        ScaleBand::new(67.0, 1.3, "D+"),
        ScaleBand::new(63.0, 1.0, "D"),
        ScaleBand::new(60.0, 0.7, "D-"),
        ScaleBand::new(0.0, 0.0, "F"),
    ])
}

fn honours_scale() -> PercentageScale {
    PercentageScale::new(vec![
        ScaleBand::new(70.0, 4.0, "First"),
        ScaleBand::new(60.0, 3.3, "Upper Second"),
        ScaleBand::new(50.0, 2.7, "Lower Second"),
        ScaleBand::new(40.0, 2.0, "Third"),
        ScaleBand::new(0.0, 0.0, "Fail"),
    ])
}

fn four_band_scale() -> PercentageScale {
    PercentageScale::new(vec![
        ScaleBand::new(80.0, 4.0, "A"),
        ScaleBand::new(65.0, 3.0, "B"),
        ScaleBand::new(50.0, 2.0, "C"),
        ScaleBand::new(0.0, 0.0, "F"),
    ])
}
