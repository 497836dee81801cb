use serde::{Deserialize, Serialize};

use crate::engine::types::{AggregationResult, Classification};

/// One band of a percentage scale: every percentage at or above `lower_bound`
/// (and below the next band up) resolves to `point` and `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaleBand {
    pub lower_bound: f64,
    pub point: f64,
    pub label: String,
}

impl ScaleBand {
    pub fn new(lower_bound: f64, point: f64, label: &str) -> Self {
        ScaleBand {
            lower_bound,
            point,
            label: label.to_string(),
        }
    }
}

/// Piecewise mapping from a percentage to a point value and a label.
///
/// Bands are kept in descending `lower_bound` order whatever order they were
/// supplied in, so the top band is open-ended up to 100.
///
/// | Percentage | Point | Label        |
/// |------------|-------|--------------|
/// | >= 70      | 4.0   | First        |
/// | >= 60      | 3.3   | Upper Second |
/// | >= 50      | 2.7   | Lower Second |
/// | >= 40      | 2.0   | Third        |
/// | >= 0       | 0.0   | Fail         |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ScaleBand>", into = "Vec<ScaleBand>")]
pub struct PercentageScale {
    bands: Vec<ScaleBand>,
}

impl PercentageScale {
    pub fn new(mut bands: Vec<ScaleBand>) -> Self {
        bands.sort_by(|a, b| b.lower_bound.total_cmp(&a.lower_bound));
        PercentageScale { bands }
    }

    /// Bands from highest to lowest lower bound.
    pub fn bands(&self) -> &[ScaleBand] {
        &self.bands
    }

    /// Returns the first band, scanning high to low, whose lower bound is at
    /// or below `percentage`.
    ///
    /// `None` only when no band lies that low (an empty scale, a scale
    /// without a 0 band, or NaN input).
    pub fn classify(&self, percentage: f64) -> Option<&ScaleBand> {
        self.bands
            .iter()
            .find(|band| band.lower_bound <= percentage)
    }

    /// Classifies an aggregate of raw percentages (see
    /// [`percentage_average`](crate::engine::aggregate::percentage_average)).
    ///
    /// This runs after aggregation, on the weighted average itself; per-entry
    /// classification happens earlier, in the normalizer.
    pub fn classify_average(&self, average: &AggregationResult) -> Option<Classification> {
        let percentage = average.gpa()?;
        self.classify(percentage).map(|band| Classification {
            percentage,
            point: band.point,
            label: band.label.clone(),
        })
    }
}

impl From<Vec<ScaleBand>> for PercentageScale {
    fn from(bands: Vec<ScaleBand>) -> Self {
        PercentageScale::new(bands)
    }
}

impl From<PercentageScale> for Vec<ScaleBand> {
    fn from(scale: PercentageScale) -> Self {
        scale.bands
    }
}
