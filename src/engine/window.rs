//! "Last N credits" selection.
//!
//! Entries must arrive most-recent-first. [`order_by_recency`] produces that
//! ordering from each entry's explicit `sequence`; the selector itself never
//! sorts and has no notion of calendar time.

use tracing::debug;

use crate::engine::aggregate::aggregate_weighted;
use crate::engine::types::{GradeEntry, TrailingWindowResult};
use crate::scheme::GradingScheme;

/// Credit sums within this distance of the cap count as filling it exactly.
const CREDIT_EPSILON: f64 = 1e-9;

/// One entry selected into a trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSlot<'a> {
    pub entry: &'a GradeEntry,
    /// Credit counted for this entry; below `entry.credit_weight` only for
    /// the boundary entry.
    pub effective_credit: f64,
    pub points: f64,
}

impl WindowSlot<'_> {
    pub fn is_truncated(&self) -> bool {
        self.effective_credit < self.entry.credit_weight
    }
}

/// Walks `ordered` (most recent first) and keeps entries until `credit_cap`
/// credits are filled. The entry that would overshoot the cap is kept at the
/// remaining credit and the walk stops there.
///
/// Only entries that count toward a GPA take part: excluded marks and
/// entries without positive credit are passed over. A cap that is not a
/// positive number selects nothing.
pub fn select_trailing_window<'a>(
    ordered: &'a [GradeEntry],
    scheme: &GradingScheme,
    credit_cap: f64,
) -> Vec<WindowSlot<'a>> {
    let mut slots = Vec::new();
    if credit_cap.is_nan() || credit_cap <= 0.0 {
        return slots;
    }

    let mut credits_so_far = 0.0;

    for entry in ordered.iter().filter(|e| e.has_credit()) {
        let normalized = scheme.normalize(&entry.mark);
        if normalized.excluded {
            continue;
        }

        let remaining = credit_cap - credits_so_far;
        if entry.credit_weight <= remaining + CREDIT_EPSILON {
            credits_so_far += entry.credit_weight;
            slots.push(WindowSlot {
                entry,
                effective_credit: entry.credit_weight,
                points: normalized.points,
            });
        } else if remaining > CREDIT_EPSILON {
            debug!(
                label = %entry.label,
                credit_weight = entry.credit_weight,
                effective_credit = remaining,
                "Truncating boundary entry"
            );
            slots.push(WindowSlot {
                entry,
                effective_credit: remaining,
                points: normalized.points,
            });
            break;
        } else {
            break;
        }
    }

    slots
}

/// Aggregates selected slots using their effective credit.
pub fn aggregate_window(slots: &[WindowSlot<'_>]) -> TrailingWindowResult {
    aggregate_weighted(slots.iter().map(|s| (s.points, s.effective_credit)))
}

/// Selects and aggregates the trailing window in one step.
pub fn trailing_window_average(
    ordered: &[GradeEntry],
    scheme: &GradingScheme,
    credit_cap: f64,
) -> TrailingWindowResult {
    aggregate_window(&select_trailing_window(ordered, scheme, credit_cap))
}

/// Orders entries most-recent-first by `sequence`. Ties keep their input
/// order. Entries without a sequence cannot be placed and are returned
/// separately.
pub fn order_by_recency(entries: &[GradeEntry]) -> (Vec<GradeEntry>, Vec<GradeEntry>) {
    let (mut sequenced, unsequenced): (Vec<GradeEntry>, Vec<GradeEntry>) = entries
        .iter()
        .cloned()
        .partition(|e| e.sequence.is_some());

    sequenced.sort_by(|a, b| b.sequence.cmp(&a.sequence));
    (sequenced, unsequenced)
}
