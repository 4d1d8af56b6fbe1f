pub mod config;
pub mod error;
pub mod histogram;
pub mod normalizer;
pub mod presenter;
pub mod tracker;
pub mod transport;
pub mod upload;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::NormalizeError;

/// Process-local job identifier, handed out by the tracker starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "FASTA")]
    Fasta,
    #[serde(rename = "BAM")]
    Bam,
    #[serde(rename = "SAM")]
    Sam,
    Unknown,
}

/// Which result table a job is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Sequences,
    Alignments,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Fasta => "FASTA",
            FileType::Bam => "BAM",
            FileType::Sam => "SAM",
            FileType::Unknown => "Unknown",
        }
    }

    pub fn category(self) -> Option<FileCategory> {
        match self {
            FileType::Fasta => Some(FileCategory::Sequences),
            FileType::Bam | FileType::Sam => Some(FileCategory::Alignments),
            FileType::Unknown => None,
        }
    }

    /// Guess the type from an upload's extension. Anything unrecognized is `Unknown`.
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "fasta" => FileType::Fasta,
            "bam" => FileType::Bam,
            "sam" => FileType::Sam,
            _ => FileType::Unknown,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the service's `fileType` tag. `Unknown` is never a valid tag.
impl FromStr for FileType {
    type Err = NormalizeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "FASTA" => Ok(FileType::Fasta),
            "BAM" => Ok(FileType::Bam),
            "SAM" => Ok(FileType::Sam),
            _ => Err(NormalizeError::UnrecognizedFileType(tag.to_string())),
        }
    }
}

impl FileCategory {
    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Sequences => "Genomic Sequences: FASTA",
            FileCategory::Alignments => "Aligned Sequence Data: BAM",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SequenceRecord {
    pub id: String,
    pub length: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sequence: Option<String>,
    pub gc_content: String,
    pub at_content: String,
    #[serde(default)]
    pub reverse_complement: Option<String>,
}

/// Aggregate statistics returned for BAM and SAM uploads.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AlignmentSummary {
    pub total_reads: u64,
    pub average_read_length: f64,
    pub average_quality: f64,
    pub average_gc_content: f64,
    pub average_at_content: f64,
    pub read_length_distribution: BTreeMap<u64, u64>,
}

impl AlignmentSummary {
    pub fn distribution_total(&self) -> u64 {
        self.read_length_distribution.values().sum()
    }

    /// True when the distribution accounts for every counted read.
    pub fn is_consistent(&self) -> bool {
        self.distribution_total() == self.total_reads
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisResult {
    Sequences(Vec<SequenceRecord>),
    Alignment(AlignmentSummary),
}

impl AnalysisResult {
    pub fn category(&self) -> FileCategory {
        match self {
            AnalysisResult::Sequences(_) => FileCategory::Sequences,
            AnalysisResult::Alignment(_) => FileCategory::Alignments,
        }
    }
}

/// Why a job ended in `Error`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Normalization,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status")]
pub enum JobStatus {
    Processing,
    Done { result: AnalysisResult },
    Error { kind: FailureKind, reason: String },
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub file_type: FileType,
    #[serde(flatten)]
    pub status: JobStatus,
}

impl Job {
    pub fn new(id: JobId, file_name: String, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            file_name,
            uploaded_at,
            file_type: FileType::Unknown,
            status: JobStatus::Processing,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.status, JobStatus::Processing)
    }

    pub fn category(&self) -> Option<FileCategory> {
        self.file_type.category()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.status {
            JobStatus::Done { result } => Some(result),
            _ => None,
        }
    }

    pub fn sequences(&self) -> Option<&[SequenceRecord]> {
        match self.result()? {
            AnalysisResult::Sequences(records) => Some(records),
            AnalysisResult::Alignment(_) => None,
        }
    }

    pub fn alignment(&self) -> Option<&AlignmentSummary> {
        match self.result()? {
            AnalysisResult::Alignment(summary) => Some(summary),
            AnalysisResult::Sequences(_) => None,
        }
    }
}
