//! Read-only projections of tracked jobs into table rows and detail views.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::histogram::{ChartLayout, HistogramChart};
use crate::{FileType, Job, JobId, JobStatus};

pub const ADENINE_COLOR: &str = "#00A86B";
pub const THYMINE_COLOR: &str = "#DC143C";
pub const CYTOSINE_COLOR: &str = "#007BA7";
pub const GUANINE_COLOR: &str = "#F28500";
pub const DEFAULT_BASE_COLOR: &str = "#000000";

pub fn nucleotide_color(base: char) -> &'static str {
    match base {
        'A' => ADENINE_COLOR,
        'T' => THYMINE_COLOR,
        'C' => CYTOSINE_COLOR,
        'G' => GUANINE_COLOR,
        _ => DEFAULT_BASE_COLOR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusBadge {
    Processing,
    Done,
    Error,
}

impl StatusBadge {
    pub fn of(status: &JobStatus) -> Self {
        match status {
            JobStatus::Processing => StatusBadge::Processing,
            JobStatus::Done { .. } => StatusBadge::Done,
            JobStatus::Error { .. } => StatusBadge::Error,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusBadge::Processing => "Processing...",
            StatusBadge::Done => "Done",
            StatusBadge::Error => "Error",
        }
    }

    /// Detail views need a result, which only `Done` jobs have.
    pub fn details_enabled(self) -> bool {
        self == StatusBadge::Done
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceRow {
    pub job_id: JobId,
    pub status: StatusBadge,
    pub accession: Option<String>,
    pub length: Option<u64>,
    pub gc_content: Option<String>,
    pub at_content: Option<String>,
    pub file_type: FileType,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    /// Long form of `uploaded_at`, shown as the tooltip of the relative age.
    pub uploaded_label: String,
    pub details_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentRow {
    pub job_id: JobId,
    pub status: StatusBadge,
    pub total_reads: Option<u64>,
    pub average_gc_content: Option<f64>,
    pub average_at_content: Option<f64>,
    pub average_quality: Option<f64>,
    pub average_read_length: Option<f64>,
    pub file_type: FileType,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_label: String,
    pub histogram_enabled: bool,
}

/// One row per job; only the first sequence record is surfaced.
pub fn sequence_rows(jobs: &[Job]) -> Vec<SequenceRow> {
    jobs.iter()
        .map(|job| {
            let status = StatusBadge::of(&job.status);
            let first = job.sequences().and_then(|records| records.first());
            SequenceRow {
                job_id: job.id,
                status,
                accession: first.map(|r| r.id.clone()),
                length: first.map(|r| r.length),
                gc_content: first.map(|r| r.gc_content.clone()),
                at_content: first.map(|r| r.at_content.clone()),
                file_type: job.file_type,
                file_name: job.file_name.clone(),
                uploaded_at: job.uploaded_at,
                uploaded_label: long_timestamp(job.uploaded_at),
                details_enabled: status.details_enabled() && first.is_some(),
            }
        })
        .collect()
}

pub fn alignment_rows(jobs: &[Job]) -> Vec<AlignmentRow> {
    jobs.iter()
        .map(|job| {
            let status = StatusBadge::of(&job.status);
            let summary = job.alignment();
            AlignmentRow {
                job_id: job.id,
                status,
                total_reads: summary.map(|s| s.total_reads),
                average_gc_content: summary.map(|s| s.average_gc_content),
                average_at_content: summary.map(|s| s.average_at_content),
                average_quality: summary.map(|s| s.average_quality),
                average_read_length: summary.map(|s| s.average_read_length),
                file_type: job.file_type,
                file_name: job.file_name.clone(),
                uploaded_at: job.uploaded_at,
                uploaded_label: long_timestamp(job.uploaded_at),
                histogram_enabled: status.details_enabled() && summary.is_some(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    pub fn title(self) -> &'static str {
        match self {
            Strand::Forward => "Sequence",
            Strand::Reverse => "Reverse Complement",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Strand::Forward => "No sequence available",
            Strand::Reverse => "No reverse complement available",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColoredBase {
    pub base: char,
    pub color: &'static str,
}

pub fn colorize(sequence: &str) -> Vec<ColoredBase> {
    sequence
        .chars()
        .map(|base| ColoredBase {
            base,
            color: nucleotide_color(base),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequenceDetail {
    Colored { title: &'static str, bases: Vec<ColoredBase> },
    Placeholder { title: &'static str, text: &'static str },
}

/// Detail view of the first record's sequence or reverse complement.
/// `None` while the job has no sequence-list result.
pub fn sequence_detail(job: &Job, strand: Strand) -> Option<SequenceDetail> {
    let first = job.sequences()?.first()?;
    let raw = match strand {
        Strand::Forward => first.sequence.as_deref(),
        Strand::Reverse => first.reverse_complement.as_deref(),
    };
    Some(match raw {
        Some(sequence) => SequenceDetail::Colored {
            title: strand.title(),
            bases: colorize(sequence),
        },
        None => SequenceDetail::Placeholder {
            title: strand.title(),
            text: strand.placeholder(),
        },
    })
}

impl SequenceDetail {
    pub fn title(&self) -> &'static str {
        match self {
            SequenceDetail::Colored { title, .. } | SequenceDetail::Placeholder { title, .. } => *title,
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<h2>{}</h2>\n<div style=\"white-space: pre-wrap; word-break: break-word;\">",
            self.title()
        );
        match self {
            SequenceDetail::Colored { bases, .. } => {
                for base in bases {
                    let _ = write!(
                        html,
                        "<span style=\"background-color: {}; color: #FFFFFF; padding: 0 2px; margin-right: 1px;\">{}</span>",
                        base.color,
                        escape_html(base.base)
                    );
                }
            }
            SequenceDetail::Placeholder { text, .. } => html.push_str(text),
        }
        html.push_str("</div>\n");
        html
    }

    /// Truecolor terminal rendering, one background per base.
    pub fn to_ansi(&self) -> String {
        match self {
            SequenceDetail::Colored { bases, .. } => bases
                .iter()
                .map(|b| {
                    let (r, g, bl) = hex_rgb(b.color);
                    b.base.to_string().white().on_truecolor(r, g, bl).to_string()
                })
                .collect(),
            SequenceDetail::Placeholder { text, .. } => text.dimmed().to_string(),
        }
    }
}

fn escape_html(c: char) -> String {
    match c {
        '<' => "&lt;".into(),
        '>' => "&gt;".into(),
        '&' => "&amp;".into(),
        '"' => "&quot;".into(),
        other => other.to_string(),
    }
}

fn hex_rgb(hex: &str) -> (u8, u8, u8) {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0)
    };
    (channel(0), channel(2), channel(4))
}

/// Histogram for a finished BAM/SAM job.
pub fn histogram(job: &Job) -> Option<HistogramChart> {
    job.alignment()
        .map(|summary| HistogramChart::build(&summary.read_length_distribution, ChartLayout::default()))
}

/// "a few seconds ago", "5 minutes ago", "3 days ago"...
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0) as f64;
    let minutes = seconds / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;

    if seconds < 45.0 {
        "a few seconds ago".into()
    } else if seconds < 90.0 {
        "a minute ago".into()
    } else if minutes < 45.0 {
        format!("{} minutes ago", minutes.round())
    } else if minutes < 90.0 {
        "an hour ago".into()
    } else if hours < 22.0 {
        format!("{} hours ago", hours.round())
    } else if hours < 36.0 {
        "a day ago".into()
    } else if days < 26.0 {
        format!("{} days ago", days.round())
    } else if days < 45.0 {
        "a month ago".into()
    } else if days < 320.0 {
        format!("{} months ago", (days / 30.4).round())
    } else if days < 548.0 {
        "a year ago".into()
    } else {
        format!("{} years ago", (days / 365.0).round())
    }
}

/// e.g. "Thursday, October 15, 2026 3:04 PM"
pub fn long_timestamp(at: DateTime<Utc>) -> String {
    at.format("%A, %B %-d, %Y %-I:%M %p").to_string()
}

fn uploaded(at: DateTime<Utc>, label: &str, now: DateTime<Utc>) -> String {
    format!("{} ({label})", relative_age(at, now))
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn percent(value: Option<f64>) -> String {
    value.map(|v| format!("{v}%")).unwrap_or_default()
}

pub fn render_sequence_table(rows: &[SequenceRow], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<14} {:<14} {:>10} {:>8} {:>8} {:<6} {}",
        "ID", "Status", "Accession", "Length", "GC%", "AT%", "Type", "Uploaded"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<4} {:<14} {:<14} {:>10} {:>8} {:>8} {:<6} {}",
            row.job_id.to_string(),
            row.status.label(),
            row.accession.as_deref().unwrap_or("No Sequence"),
            cell(row.length),
            row.gc_content.as_deref().unwrap_or(""),
            row.at_content.as_deref().unwrap_or(""),
            row.file_type.as_str(),
            uploaded(row.uploaded_at, &row.uploaded_label, now)
        );
    }
    out
}

pub fn render_alignment_table(rows: &[AlignmentRow], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<14} {:>11} {:>11} {:>11} {:>15} {:>19} {:<6} {}",
        "ID",
        "Status",
        "Total Reads",
        "Average GC%",
        "Average AT%",
        "Average Quality",
        "Average Read Length",
        "Type",
        "Uploaded"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<4} {:<14} {:>11} {:>11} {:>11} {:>15} {:>19} {:<6} {}",
            row.job_id.to_string(),
            row.status.label(),
            cell(row.total_reads),
            percent(row.average_gc_content),
            percent(row.average_at_content),
            cell(row.average_quality),
            cell(row.average_read_length),
            row.file_type.as_str(),
            uploaded(row.uploaded_at, &row.uploaded_label, now)
        );
    }
    out
}
