use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use tracing::debug;

use crate::engine::aggregate::{CategoryFilter, aggregate, credit_totals, percentage_average};
use crate::engine::types::{AggregationResult, Classification, CreditTotals, GradeEntry, Mark};
use crate::engine::window::{aggregate_window, order_by_recency, select_trailing_window};
use crate::scheme::GradingScheme;

/// Bumped whenever the serialized report layout changes.
const SCHEMA_VERSION: u8 = 1;

/// A caller-defined aggregate: a name and the tags that feed it.
///
/// Parses from `name=tagA,tagB`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedCategory {
    pub name: String,
    pub filter: CategoryFilter,
}

impl FromStr for NamedCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((name, tags)) = s.split_once('=') else {
            bail!("Category must look like name=tagA,tagB: {}", s);
        };

        let name = name.trim();
        if name.is_empty() {
            bail!("Category name is empty: {}", s);
        }

        let tags: Vec<&str> = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            bail!("Category '{}' lists no tags", name);
        }

        Ok(NamedCategory {
            name: name.to_string(),
            filter: CategoryFilter::new(tags),
        })
    }
}

/// Which aggregates a report should contain beyond the cumulative one.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub categories: Vec<NamedCategory>,
    pub trailing_credit_cap: Option<f64>,
}

/// Weighted sum plus its average. `gpa` is `None` when nothing qualified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub points: f64,
    pub credits_counted: f64,
    pub gpa: Option<f64>,
}

impl From<AggregationResult> for AggregateSummary {
    fn from(result: AggregationResult) -> Self {
        AggregateSummary {
            points: result.points,
            credits_counted: result.credits_counted,
            gpa: result.gpa(),
        }
    }
}

/// One entry as it was counted in the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowedEntry {
    pub label: String,
    pub effective_credit: f64,
    pub truncated: bool,
}

/// "Last N credits" aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub credit_cap: f64,
    pub summary: AggregateSummary,
    pub entries: Vec<WindowedEntry>,
    /// Entries left out because they carry no sequence.
    pub unsequenced_entries: usize,
}

/// Complete result for one transcript.
#[derive(Debug, Clone, Serialize)]
pub struct GpaReport {
    pub schema_version: u8,
    pub scheme: String,
    pub generated_at: DateTime<Utc>,
    pub credits: CreditTotals,
    pub cumulative: AggregateSummary,
    pub categories: BTreeMap<String, AggregateSummary>,
    pub trailing_window: Option<WindowSummary>,
    /// Classification of the credit-weighted average of percentage marks.
    pub classification: Option<Classification>,
    pub unrecognized_marks: Vec<String>,
}

/// Computes every requested aggregate over `entries`.
///
/// Each aggregate is independent; categories may overlap freely.
#[tracing::instrument(skip_all, fields(scheme = %scheme.name, entries = entries.len()))]
pub fn build_report(
    entries: &[GradeEntry],
    scheme: &GradingScheme,
    request: &ReportRequest,
) -> GpaReport {
    let cumulative = aggregate(entries, scheme, None);

    let mut categories = BTreeMap::new();
    for category in &request.categories {
        let result = aggregate(entries, scheme, Some(&category.filter));
        debug!(
            category = %category.name,
            credits = result.credits_counted,
            "Category aggregated"
        );
        categories.insert(category.name.clone(), result.into());
    }

    let trailing_window = request
        .trailing_credit_cap
        .map(|cap| window_summary(entries, scheme, cap));

    let classification = scheme
        .percentage_scale
        .classify_average(&percentage_average(entries, None));

    GpaReport {
        schema_version: SCHEMA_VERSION,
        scheme: scheme.name.clone(),
        generated_at: Utc::now(),
        credits: credit_totals(entries, scheme),
        cumulative: cumulative.into(),
        categories,
        trailing_window,
        classification,
        unrecognized_marks: unrecognized_marks(entries, scheme),
    }
}

fn window_summary(entries: &[GradeEntry], scheme: &GradingScheme, cap: f64) -> WindowSummary {
    let (ordered, unsequenced) = order_by_recency(entries);
    let slots = select_trailing_window(&ordered, scheme, cap);

    WindowSummary {
        credit_cap: cap,
        summary: aggregate_window(&slots).into(),
        entries: slots
            .iter()
            .map(|slot| WindowedEntry {
                label: slot.entry.label.clone(),
                effective_credit: slot.effective_credit,
                truncated: slot.is_truncated(),
            })
            .collect(),
        unsequenced_entries: unsequenced.len(),
    }
}

fn unrecognized_marks(entries: &[GradeEntry], scheme: &GradingScheme) -> Vec<String> {
    let tokens: BTreeSet<&str> = entries
        .iter()
        .filter_map(|e| match &e.mark {
            Mark::Grade(token) if !scheme.grade_points.is_recognized(token) => {
                Some(token.as_str())
            }
            _ => None,
        })
        .collect();

    tokens.into_iter().map(str::to_string).collect()
}
