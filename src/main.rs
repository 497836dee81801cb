//! CLI entry point for the GPA rater.
//!
//! Provides subcommands for computing GPA reports from a transcript CSV,
//! classifying a single percentage, and listing the built-in schemes.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gpa_rater::{
    engine::report::{NamedCategory, ReportRequest, build_report},
    output::{append_record, format_gpa, print_json, print_pretty, summary_row, write_json},
    parser::{WarningKind, load_transcript},
    scheme::{GradingScheme, Preset},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gpa_rater")]
#[command(about = "Weighted GPA and percentage classification calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SchemeArgs {
    /// Built-in grading scheme (default: us-plus-minus)
    #[arg(long, value_enum, conflicts_with = "scheme_file")]
    preset: Option<Preset>,

    /// JSON file describing a custom grading scheme
    #[arg(long)]
    scheme_file: Option<PathBuf>,
}

impl SchemeArgs {
    fn resolve(&self) -> Result<GradingScheme> {
        match &self.scheme_file {
            Some(path) => GradingScheme::load(path),
            None => Ok(self.preset.unwrap_or(Preset::UsPlusMinus).scheme()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute cumulative, category and trailing-window GPAs from a transcript CSV
    Calculate {
        /// Transcript CSV with columns label,credits,mark,categories,sequence
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        #[command(flatten)]
        scheme: SchemeArgs,

        /// Named aggregate over tags, e.g. "technical=Engineering Core,Mathematics"
        #[arg(short, long = "category", value_name = "NAME=TAGS")]
        categories: Vec<NamedCategory>,

        /// Also compute the GPA over the most recent N credits
        #[arg(long, value_name = "N")]
        last_credits: Option<f64>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append a one-line summary to this CSV file
        #[arg(long)]
        summary_csv: Option<PathBuf>,
    },
    /// Classify a single percentage against a scheme's scale
    Classify {
        /// Percentage between 0 and 100
        percentage: String,

        #[command(flatten)]
        scheme: SchemeArgs,
    },
    /// List the built-in grading schemes
    Schemes,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/gpa_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gpa_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            transcript,
            scheme,
            categories,
            last_credits,
            output,
            summary_csv,
        } => {
            let scheme = scheme.resolve()?;
            calculate(
                &transcript,
                &scheme,
                categories,
                last_credits,
                output.as_deref(),
                summary_csv.as_deref(),
            )?;
        }
        Commands::Classify { percentage, scheme } => {
            let scheme = scheme.resolve()?;
            classify(&percentage, &scheme)?;
        }
        Commands::Schemes => {
            for preset in Preset::value_variants() {
                let scheme = preset.scheme();
                let bands: Vec<&str> = scheme
                    .percentage_scale
                    .bands()
                    .iter()
                    .map(|b| b.label.as_str())
                    .collect();

                info!(
                    preset = preset.name(),
                    grades = scheme.grade_points.iter().count(),
                    bands = %bands.join(" / "),
                    "Scheme"
                );
            }
        }
    }

    Ok(())
}

/// Parses a transcript, builds the report and writes it out.
#[tracing::instrument(skip_all, fields(scheme = %scheme.name, transcript = %transcript.display()))]
fn calculate(
    transcript: &Path,
    scheme: &GradingScheme,
    categories: Vec<NamedCategory>,
    last_credits: Option<f64>,
    output: Option<&Path>,
    summary_csv: Option<&Path>,
) -> Result<()> {
    let parsed = load_transcript(transcript, &scheme.limits)?;

    for warning in &parsed.warnings {
        match warning.kind {
            WarningKind::Clamped { value } => warn!(
                row = warning.row,
                field = warning.field,
                raw = %warning.raw,
                value,
                "Value out of range, clamped"
            ),
            WarningKind::NotProvided => warn!(
                row = warning.row,
                field = warning.field,
                "Value not provided, row skipped"
            ),
            WarningKind::Ignored => warn!(
                row = warning.row,
                field = warning.field,
                raw = %warning.raw,
                "Value unreadable, ignored"
            ),
        }
    }

    let trailing_credit_cap = match last_credits {
        Some(cap) if cap.is_finite() && cap > 0.0 => Some(cap),
        Some(cap) => bail!("--last-credits must be a positive number, got {}", cap),
        None => None,
    };

    let request = ReportRequest {
        categories,
        trailing_credit_cap,
    };
    let report = build_report(&parsed.entries, scheme, &request);
    print_pretty(&report);

    info!(
        entries = parsed.entries.len(),
        skipped = parsed.skipped_rows(),
        credits = report.cumulative.credits_counted,
        gpa = %format_gpa(report.cumulative.gpa),
        "Cumulative GPA"
    );
    for (name, summary) in &report.categories {
        info!(category = %name, credits = summary.credits_counted, gpa = %format_gpa(summary.gpa), "Category GPA");
    }
    if let Some(window) = &report.trailing_window {
        info!(
            credit_cap = window.credit_cap,
            credits = window.summary.credits_counted,
            gpa = %format_gpa(window.summary.gpa),
            unsequenced = window.unsequenced_entries,
            "Trailing window GPA"
        );
        if window.unsequenced_entries > 0 {
            warn!(
                count = window.unsequenced_entries,
                "Entries without a sequence were left out of the trailing window"
            );
        }
    }
    if !report.unrecognized_marks.is_empty() {
        warn!(marks = ?report.unrecognized_marks, "Unrecognized marks excluded from GPA");
    }

    match output {
        Some(path) => {
            write_json(path, &report)?;
            info!(path = %path.display(), "Report written");
        }
        None => print_json(&report)?,
    }

    if let Some(path) = summary_csv {
        append_record(path, &summary_row(&report))?;
    }

    Ok(())
}

/// Clamps and classifies one percentage.
fn classify(raw: &str, scheme: &GradingScheme) -> Result<()> {
    let Some(percentage) = scheme.limits.percentage.clamp(raw) else {
        bail!("Percentage must be a number, got '{}'", raw);
    };
    if percentage.clamped {
        warn!(raw, value = percentage.value, "Percentage out of range, clamped");
    }

    let Some(band) = scheme.percentage_scale.classify(percentage.value) else {
        bail!("Scheme '{}' has no band for {}", scheme.name, percentage.value);
    };

    info!(
        scheme = %scheme.name,
        percentage = percentage.value,
        point = band.point,
        label = %band.label,
        "Classified"
    );
    println!("{}", band.label);

    Ok(())
}
