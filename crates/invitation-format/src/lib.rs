//! Output formatters for invitation commands.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use invitation_core::{BatchReport, GenerateError, InputError, RecordStatus};
use serde::Serialize;

/// Report layout requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Plain,
    Json,
}

#[derive(Serialize)]
struct BatchDocument<'a> {
    generated_at: DateTime<Utc>,
    output_dir: &'a Path,
    total: usize,
    written: usize,
    failed: usize,
    records: Vec<RecordDocument<'a>>,
}

#[derive(Serialize)]
struct RecordDocument<'a> {
    index: usize,
    path: &'a Path,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct CheckDocument {
    generated_at: DateTime<Utc>,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn render_report(report: &BatchReport, format: ReportFormat) -> String {
    render_report_at(report, format, Utc::now())
}

/// Renders a generation report with an explicit timestamp.
pub fn render_report_at(report: &BatchReport, format: ReportFormat, now: DateTime<Utc>) -> String {
    match format {
        ReportFormat::Plain => render_report_plain(report),
        ReportFormat::Json => {
            let document = BatchDocument {
                generated_at: now,
                output_dir: &report.output_dir,
                total: report.len(),
                written: report.written(),
                failed: report.failed(),
                records: report
                    .records
                    .iter()
                    .map(|record| RecordDocument {
                        index: record.index,
                        path: &record.path,
                        status: match record.status {
                            RecordStatus::Written => "written",
                            RecordStatus::Failed(_) => "failed",
                        },
                        error: record.error().map(ToString::to_string),
                    })
                    .collect(),
            };
            to_json(&document)
        }
    }
}

fn render_report_plain(report: &BatchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Generated {} of {} invitations in {}",
        report.written(),
        report.len(),
        report.output_dir.display()
    );
    for record in &report.records {
        let _ = match record.error() {
            None => writeln!(out, "  ok      #{} {}", record.index, record.path.display()),
            Some(err) => writeln!(
                out,
                "  failed  #{} {}: {}",
                record.index,
                record.path.display(),
                err
            ),
        };
    }
    out
}

/// Renders a generation error that stopped the batch.
pub fn render_failure(err: &GenerateError, format: ReportFormat) -> String {
    match format {
        ReportFormat::Plain => format!("No invitations generated: {err}\n"),
        ReportFormat::Json => to_json(&serde_json::json!({
            "generated_at": Utc::now(),
            "error": err.to_string(),
        })),
    }
}

pub fn render_check(result: &Result<usize, InputError>, format: ReportFormat) -> String {
    render_check_at(result, format, Utc::now())
}

/// Renders the outcome of a gate-only run; `Ok` carries the attendee count.
pub fn render_check_at(
    result: &Result<usize, InputError>,
    format: ReportFormat,
    now: DateTime<Utc>,
) -> String {
    match format {
        ReportFormat::Plain => match result {
            Ok(count) => format!("Template and {count} attendee record(s) are valid\n"),
            Err(err) => format!("Invalid input: {err}\n"),
        },
        ReportFormat::Json => {
            let document = CheckDocument {
                generated_at: now,
                valid: result.is_ok(),
                attendees: result.as_ref().ok().copied(),
                error: result.as_ref().err().map(ToString::to_string),
            };
            to_json(&document)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(mut rendered) => {
            rendered.push('\n');
            rendered
        }
        Err(err) => format!("{{\"error\": \"failed to serialise report: {err}\"}}\n"),
    }
}
