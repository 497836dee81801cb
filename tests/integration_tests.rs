use gpa_rater::engine::report::{ReportRequest, build_report};
use gpa_rater::output::{format_gpa, summary_row};
use gpa_rater::parser::{WarningKind, load_transcript, parse_transcript};
use gpa_rater::scheme::{GradingScheme, Preset};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_full_pipeline() {
    let scheme = Preset::UsPlusMinus.scheme();
    let parsed = load_transcript(&fixture("transcript.csv"), &scheme.limits)
        .expect("Failed to load transcript");

    assert_eq!(parsed.entries.len(), 8);
    assert_eq!(parsed.skipped_rows(), 1);
    assert_eq!(parsed.warnings.len(), 2);
    assert_eq!(parsed.warnings[1].kind, WarningKind::Clamped { value: 0.0 });

    let request = ReportRequest {
        categories: vec![
            "technical=Technical".parse().unwrap(),
            "humanities=Humanities".parse().unwrap(),
            "music=Music".parse().unwrap(),
        ],
        trailing_credit_cap: Some(6.0),
    };
    let report = build_report(&parsed.entries, &scheme, &request);

    assert!(close(report.cumulative.credits_counted, 16.0));
    assert!(close(report.cumulative.points, 56.1));
    assert!(close(report.cumulative.gpa.unwrap(), 56.1 / 16.0));

    assert!(close(report.credits.attempted, 19.0));
    assert!(close(report.credits.excluded, 3.0));

    let technical = report.categories["technical"];
    assert!(close(technical.credits_counted, 13.0));
    assert!(close(technical.points, 46.2));
    assert!(close(report.categories["humanities"].gpa.unwrap(), 3.3));
    assert_eq!(format_gpa(report.categories["music"].gpa), "N/A");

    let window = report.trailing_window.as_ref().unwrap();
    let labels: Vec<&str> = window.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Linear Algebra", "Circuits Lab", "Physics I"]);
    assert!(close(window.entries[2].effective_credit, 1.0));
    assert!(close(window.summary.credits_counted, 6.0));
    assert!(close(window.summary.points, 22.4));
    assert_eq!(window.unsequenced_entries, 0);

    assert_eq!(report.classification.as_ref().unwrap().label, "A-");
    assert_eq!(report.unrecognized_marks, vec!["AU".to_string()]);

    let row = summary_row(&report);
    assert_eq!(row.classification.as_deref(), Some("A-"));
    assert!(close(row.trailing_gpa.unwrap(), 22.4 / 6.0));
}

#[test]
fn test_custom_scheme_file() {
    let scheme = GradingScheme::load(&fixture("honours_scheme.json")).expect("Failed to load scheme");
    assert_eq!(scheme.name, "honours");
    assert_eq!(scheme.limits.credits.max, 60.0);

    let csv = "label,credits,mark\nDissertation,40,69\nModule,20,70.5\nPlacement,10,P\n";
    let parsed = parse_transcript(csv.as_bytes(), &scheme.limits).unwrap();
    assert!(parsed.warnings.is_empty());

    let report = build_report(&parsed.entries, &scheme, &ReportRequest::default());
    let classification = report.classification.unwrap();
    assert!(close(classification.percentage, 69.5));
    assert_eq!(classification.label, "Upper Second");

    // 69 -> 3.3, 70.5 -> 4.0; the pass module carries no weight
    assert!(close(report.cumulative.gpa.unwrap(), (40.0 * 3.3 + 20.0 * 4.0) / 60.0));
    assert!(close(report.credits.attempted, 70.0));
}

#[test]
fn test_presets_disagree_on_same_transcript() {
    let csv = "label,credits,mark\nEssay,3,85\nExam,3,72\n";
    let us = Preset::UsPlusMinus.scheme();
    let coarse = Preset::FourBand.scheme();

    let parsed = parse_transcript(csv.as_bytes(), &us.limits).unwrap();
    let us_report = build_report(&parsed.entries, &us, &ReportRequest::default());
    let coarse_report = build_report(&parsed.entries, &coarse, &ReportRequest::default());

    // 85 -> B (3.0), 72 -> C- (1.7) vs 85 -> A (4.0), 72 -> B (3.0)
    assert!(close(us_report.cumulative.gpa.unwrap(), 2.35));
    assert!(close(coarse_report.cumulative.gpa.unwrap(), 3.5));
}
