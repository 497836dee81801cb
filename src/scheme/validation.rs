use std::collections::HashSet;

use super::GradingScheme;
use crate::engine::normalize::MAX_POINTS;
use crate::engine::validate::Bounds;

/// Validate a grading scheme before it is used.
/// Returns all validation errors at once (not just the first).
pub fn validate_scheme(scheme: &GradingScheme) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if scheme.name.trim().is_empty() {
        errors.push("name: must not be empty".to_string());
    }

    // Grade-point table
    let mut seen_tokens = HashSet::new();
    for (i, grade) in scheme.grade_points.iter().enumerate() {
        if grade.token.trim().is_empty() {
            errors.push(format!("grade_points[{}].token: must not be empty", i));
        } else if !seen_tokens.insert(grade.token.as_str()) {
            errors.push(format!(
                "grade_points[{}].token: duplicate token '{}'",
                i, grade.token
            ));
        }

        if let Some(points) = grade.points {
            if !(0.0..=MAX_POINTS).contains(&points) {
                errors.push(format!(
                    "grade_points[{}].points: {} is outside 0.0-{:.1}",
                    i, points, MAX_POINTS
                ));
            }
        }
    }

    // Percentage scale, already ordered high to low
    let bands = scheme.percentage_scale.bands();
    if bands.is_empty() {
        errors.push("percentage_scale: must contain at least one band".to_string());
    }

    for (i, band) in bands.iter().enumerate() {
        if !(0.0..=100.0).contains(&band.lower_bound) {
            errors.push(format!(
                "percentage_scale[{}].lower_bound: {} is outside 0-100",
                i, band.lower_bound
            ));
        }
        if !band.point.is_finite() || band.point < 0.0 {
            errors.push(format!(
                "percentage_scale[{}].point: {} must be a non-negative number",
                i, band.point
            ));
        }
        if band.label.trim().is_empty() {
            errors.push(format!("percentage_scale[{}].label: must not be empty", i));
        }
    }

    for (i, pair) in bands.windows(2).enumerate() {
        let (upper, lower) = (&pair[0], &pair[1]);
        if upper.lower_bound == lower.lower_bound {
            errors.push(format!(
                "percentage_scale[{}]: bands '{}' and '{}' share lower bound {}",
                i + 1,
                upper.label,
                lower.label,
                lower.lower_bound
            ));
        }
        if upper.point < lower.point {
            errors.push(format!(
                "percentage_scale[{}]: point {} for '{}' is above {} for higher band '{}'",
                i + 1,
                lower.point,
                lower.label,
                upper.point,
                upper.label
            ));
        }
    }

    if let Some(lowest) = bands.last() {
        if lowest.lower_bound != 0.0 {
            errors.push(format!(
                "percentage_scale: lowest band '{}' starts at {}, leaving a gap below it",
                lowest.label, lowest.lower_bound
            ));
        }
    }

    // Input limits
    check_bounds(&mut errors, "limits.credits", &scheme.limits.credits);
    check_bounds(&mut errors, "limits.percentage", &scheme.limits.percentage);
    if scheme.limits.credits.min < 0.0 {
        errors.push("limits.credits.min: must be non-negative".to_string());
    }
    let percentage = &scheme.limits.percentage;
    if percentage.min < 0.0 || percentage.max > 100.0 {
        errors.push(format!(
            "limits.percentage: {}-{} reaches outside 0-100",
            percentage.min, percentage.max
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_bounds(errors: &mut Vec<String>, field: &str, bounds: &Bounds) {
    if !bounds.min.is_finite() || !bounds.max.is_finite() {
        errors.push(format!("{}: bounds must be finite", field));
    } else if bounds.min > bounds.max {
        errors.push(format!(
            "{}: min {} is greater than max {}",
            field, bounds.min, bounds.max
        ));
    }
}
