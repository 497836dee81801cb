//! Grading schemes: the injectable tables the engine scores against.
//!
//! A [`GradingScheme`] bundles a grade-point table, a percentage scale and the
//! input limits for one calculator variant. Built-in variants live in
//! [`Preset`]; anything else is loaded from a JSON file:
//! ```json
//! {
//!   "name": "honours",
//!   "grade_points": [{ "token": "A", "points": 4.0 }, { "token": "P" }],
//!   "percentage_scale": [
//!     { "lower_bound": 70, "point": 4.0, "label": "First" },
//!     { "lower_bound": 0, "point": 0.0, "label": "Fail" }
//!   ],
//!   "limits": { "credits": { "min": 0, "max": 40 } }
//! }
//! ```

mod presets;
mod validation;

pub use presets::Preset;
pub use validation::validate_scheme;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::classify::PercentageScale;
use crate::engine::normalize::{GradePointTable, normalize};
use crate::engine::types::{Mark, NormalizedMark};
use crate::engine::validate::InputLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradingScheme {
    pub name: String,
    pub grade_points: GradePointTable,
    pub percentage_scale: PercentageScale,
    #[serde(default)]
    pub limits: InputLimits,
}

impl GradingScheme {
    /// Loads and validates a scheme from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scheme file at {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid scheme in {}", path.display()))
    }

    /// Parses and validates a scheme from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let scheme: GradingScheme = serde_json::from_str(content)?;
        if let Err(errors) = validate_scheme(&scheme) {
            bail!("{}", errors.join("; "));
        }
        Ok(scheme)
    }

    /// Normalizes a mark against this scheme's table and scale.
    pub fn normalize(&self, mark: &Mark) -> NormalizedMark {
        normalize(mark, &self.grade_points, &self.percentage_scale)
    }
}

impl Default for GradingScheme {
    fn default() -> Self {
        Preset::UsPlusMinus.scheme()
    }
}
