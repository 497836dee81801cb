use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::engine::types::{AggregationResult, CreditTotals, GradeEntry, Mark};
use crate::scheme::GradingScheme;

/// Set of category tags. An entry matches when it carries any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryFilter {
    categories: BTreeSet<String>,
}

impl CategoryFilter {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CategoryFilter {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Logical OR over the filter's tags. An empty filter matches nothing.
    pub fn matches(&self, entry: &GradeEntry) -> bool {
        !self.categories.is_disjoint(&entry.categories)
    }
}

fn qualifies(entry: &GradeEntry, filter: Option<&CategoryFilter>) -> bool {
    entry.has_credit() && filter.is_none_or(|f| f.matches(entry))
}

/// Credit-weighted GPA over the entries matching `filter`, or over every
/// entry when no filter is given.
///
/// Excluded marks and entries without positive credit contribute nothing.
pub fn aggregate(
    entries: &[GradeEntry],
    scheme: &GradingScheme,
    filter: Option<&CategoryFilter>,
) -> AggregationResult {
    aggregate_weighted(
        entries
            .iter()
            .filter(|entry| qualifies(entry, filter))
            .filter_map(|entry| {
                let normalized = scheme.normalize(&entry.mark);
                (!normalized.excluded).then_some((normalized.points, entry.credit_weight))
            }),
    )
}

/// Folds `(point, credit)` pairs into a weighted sum. Pairs without positive
/// credit are skipped.
pub fn aggregate_weighted<I>(contributions: I) -> AggregationResult
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut result = AggregationResult::default();
    for (point, credit) in contributions {
        if credit > 0.0 {
            result.add(point, credit);
        }
    }
    result
}

/// Credit-weighted mean of raw percentage marks, for classifying an overall
/// result. Grade-token marks are ignored.
pub fn percentage_average(
    entries: &[GradeEntry],
    filter: Option<&CategoryFilter>,
) -> AggregationResult {
    aggregate_weighted(
        entries
            .iter()
            .filter(|entry| qualifies(entry, filter))
            .filter_map(|entry| match entry.mark {
                Mark::Percentage(pct) if pct.is_finite() => Some((pct, entry.credit_weight)),
                _ => None,
            }),
    )
}

/// Credit bookkeeping: attempted credit includes marks that are excluded from
/// the GPA, such as pass/no-pass.
pub fn credit_totals(entries: &[GradeEntry], scheme: &GradingScheme) -> CreditTotals {
    let mut totals = CreditTotals::default();

    for entry in entries.iter().filter(|e| e.has_credit()) {
        totals.attempted += entry.credit_weight;
        if scheme.normalize(&entry.mark).excluded {
            totals.excluded += entry.credit_weight;
        } else {
            totals.counted += entry.credit_weight;
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::Preset;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn engineering() -> Vec<GradeEntry> {
        vec![
            GradeEntry::graded("Calculus II", 4.0, "A").in_categories(["Mathematics", "Technical"]),
            GradeEntry::graded("Physics I", 4.0, "B+").in_categories(["Science", "Technical"]),
            GradeEntry::graded("Writing", 3.0, "B-").in_categories(["Humanities"]),
            GradeEntry::graded("Statics", 3.0, "C+").in_categories(["Engineering Core", "Technical"]),
        ]
    }

    #[test]
    fn test_two_course_scenario() {
        let scheme = Preset::UsPlusMinus.scheme();
        let entries = vec![
            GradeEntry::graded("One", 3.0, "A-"),
            GradeEntry::graded("Two", 4.0, "B+"),
        ];

        let result = aggregate(&entries, &scheme, None);
        assert!(close(result.credits_counted, 7.0));
        assert!(close(result.gpa().unwrap(), (3.0 * 3.7 + 4.0 * 3.3) / 7.0));
        assert!(close(result.gpa().unwrap(), 3.4714285714285715));
    }

    #[test]
    fn test_weighted_average_identity() {
        let scheme = Preset::UsPlusMinus.scheme();
        let entries = engineering();

        let expected_points: f64 = 4.0 * 4.0 + 4.0 * 3.3 + 3.0 * 2.7 + 3.0 * 2.3;
        let expected_credits = 14.0;

        let result = aggregate(&entries, &scheme, None);
        assert!(close(result.points, expected_points));
        assert!(close(result.credits_counted, expected_credits));
        assert!(close(result.gpa().unwrap(), expected_points / expected_credits));
    }

    #[test]
    fn test_overlapping_categories() {
        let scheme = Preset::UsPlusMinus.scheme();
        let entries = engineering();

        let technical = CategoryFilter::new(["Technical"]);
        let science = CategoryFilter::new(["Science"]);

        let tech = aggregate(&entries, &scheme, Some(&technical));
        let sci = aggregate(&entries, &scheme, Some(&science));

        // Physics counts toward both.
        assert!(close(tech.credits_counted, 11.0));
        assert!(close(sci.credits_counted, 4.0));
        assert!(close(sci.gpa().unwrap(), 3.3));
    }

    #[test]
    fn test_filter_is_logical_or() {
        let scheme = Preset::UsPlusMinus.scheme();
        let filter = CategoryFilter::new(["Mathematics", "Humanities"]);
        let result = aggregate(&engineering(), &scheme, Some(&filter));
        assert!(close(result.credits_counted, 7.0));
    }

    #[test]
    fn test_non_matching_entries_never_influence_result() {
        let scheme = Preset::UsPlusMinus.scheme();
        let filter = CategoryFilter::new(["Technical"]);
        let mut entries = engineering();
        let before = aggregate(&entries, &scheme, Some(&filter));

        entries.push(GradeEntry::graded("Elective", 20.0, "F").in_categories(["Arts"]));
        entries.push(GradeEntry::graded("Untagged", 20.0, "A+"));
        let after = aggregate(&entries, &scheme, Some(&filter));

        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let scheme = Preset::UsPlusMinus.scheme();
        let filter = CategoryFilter::default();
        let result = aggregate(&engineering(), &scheme, Some(&filter));
        assert_eq!(result.gpa(), None);
    }

    #[test]
    fn test_no_qualifying_entries_is_undefined_not_zero() {
        let scheme = Preset::UsPlusMinus.scheme();
        let filter = CategoryFilter::new(["Music"]);
        let result = aggregate(&engineering(), &scheme, Some(&filter));
        assert_eq!(result.gpa(), None);
        assert_eq!(result.credits_counted, 0.0);
    }

    #[test]
    fn test_pass_no_pass_contributes_nothing() {
        let scheme = Preset::UsPlusMinus.scheme();
        let graded = vec![GradeEntry::graded("Calc", 4.0, "B")];
        let mut with_pass = graded.clone();
        with_pass.push(GradeEntry::graded("Seminar", 12.0, "P"));
        with_pass.push(GradeEntry::graded("Lab", 2.0, "NP"));

        assert_eq!(
            aggregate(&graded, &scheme, None),
            aggregate(&with_pass, &scheme, None)
        );
    }

    #[test]
    fn test_unknown_token_contributes_nothing() {
        let scheme = Preset::UsPlusMinus.scheme();
        let entries = vec![
            GradeEntry::graded("Calc", 4.0, "A"),
            GradeEntry::graded("Audit", 3.0, "AU"),
        ];
        let result = aggregate(&entries, &scheme, None);
        assert!(close(result.credits_counted, 4.0));
        assert_eq!(result.gpa(), Some(4.0));
    }

    #[test]
    fn test_zero_and_negative_credit_ignored() {
        let scheme = Preset::UsPlusMinus.scheme();
        let entries = vec![
            GradeEntry::graded("Calc", 4.0, "B"),
            GradeEntry::graded("Zero", 0.0, "F"),
            GradeEntry::graded("Negative", -3.0, "F"),
        ];
        let result = aggregate(&entries, &scheme, None);
        assert_eq!(result.gpa(), Some(3.0));
    }

    #[test]
    fn test_percentage_marks_aggregate_through_scale() {
        let scheme = Preset::FourBand.scheme();
        let entries = vec![
            GradeEntry::scored("Essay", 2.0, 82.0),
            GradeEntry::scored("Exam", 2.0, 55.0),
        ];
        let result = aggregate(&entries, &scheme, None);
        assert!(close(result.gpa().unwrap(), 3.0));
    }

    #[test]
    fn test_percentage_average() {
        let entries = vec![
            GradeEntry::scored("Essay", 1.0, 80.0),
            GradeEntry::scored("Exam", 3.0, 60.0),
            GradeEntry::graded("Quiz", 1.0, "A"),
        ];
        let average = percentage_average(&entries, None);
        assert!(close(average.gpa().unwrap(), 65.0));
        assert!(close(average.credits_counted, 4.0));
    }

    #[test]
    fn test_credit_totals() {
        let scheme = Preset::UsPlusMinus.scheme();
        let entries = vec![
            GradeEntry::graded("Calc", 4.0, "B"),
            GradeEntry::graded("Seminar", 1.0, "P"),
            GradeEntry::graded("Audit", 2.0, "AU"),
            GradeEntry::graded("Dropped", 0.0, "A"),
        ];
        let totals = credit_totals(&entries, &scheme);
        assert_eq!(totals.attempted, 7.0);
        assert_eq!(totals.counted, 4.0);
        assert_eq!(totals.excluded, 3.0);
    }

    #[test]
    fn test_aggregate_weighted_skips_non_positive_credit() {
        let result = aggregate_weighted([(4.0, 2.0), (0.0, 0.0), (1.0, -1.0)]);
        assert_eq!(result.credits_counted, 2.0);
        assert_eq!(result.gpa(), Some(4.0));
    }
}
