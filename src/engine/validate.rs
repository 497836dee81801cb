//! Input sanitizing for numeric fields before they reach the aggregator.

use serde::{Deserialize, Serialize};

/// A value after clamping, with a flag telling the caller whether it moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    pub value: f64,
    pub clamped: bool,
}

/// Parses `raw` and clamps it into `[min, max]`.
///
/// Empty or non-numeric input returns `None`: the field has not been provided
/// yet and must be left out of any aggregate rather than read as zero.
pub fn clamp(raw: &str, min: f64, max: f64) -> Option<Clamped> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    clamp_value(raw.parse().ok()?, min, max)
}

/// Clamps an already-numeric value. Non-finite values count as not provided.
pub fn clamp_value(value: f64, min: f64, max: f64) -> Option<Clamped> {
    if !value.is_finite() {
        return None;
    }

    let bounded = value.max(min).min(max);
    Some(Clamped {
        value: bounded,
        clamped: bounded != value,
    })
}

/// Inclusive legal range for one numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Bounds { min, max }
    }

    pub fn clamp(&self, raw: &str) -> Option<Clamped> {
        clamp(raw, self.min, self.max)
    }

    pub fn clamp_value(&self, value: f64) -> Option<Clamped> {
        clamp_value(value, self.min, self.max)
    }
}

/// Legal ranges applied to transcript fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputLimits {
    #[serde(default = "default_credit_bounds")]
    pub credits: Bounds,
    #[serde(default = "default_percentage_bounds")]
    pub percentage: Bounds,
}

fn default_credit_bounds() -> Bounds {
    Bounds::new(0.0, 30.0)
}

fn default_percentage_bounds() -> Bounds {
    Bounds::new(0.0, 100.0)
}

impl Default for InputLimits {
    fn default() -> Self {
        InputLimits {
            credits: default_credit_bounds(),
            percentage: default_percentage_bounds(),
        }
    }
}
