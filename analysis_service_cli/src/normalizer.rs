//! Turns loosely typed result payloads into [`AnalysisResult`] values.
//!
//! FASTA payloads carry a `sequences` list, BAM and SAM payloads carry six
//! aggregate fields at the top level. Which shape to expect is decided by the
//! `fileType` tag alone.

use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::NormalizeError;
use crate::{AlignmentSummary, AnalysisResult, FileType, SequenceRecord};

/// A result shaped for display, plus the file type the service confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub file_type: FileType,
    pub result: AnalysisResult,
}

/// Normalizes a payload using its own `fileType` tag.
pub fn normalize_payload(payload: &Value) -> Result<Normalized, NormalizeError> {
    let object = payload.as_object().ok_or(NormalizeError::NotAnObject)?;
    if let Some(message) = object.get("error").and_then(Value::as_str) {
        return Err(NormalizeError::Reported(message.to_string()));
    }
    let tag = object
        .get("fileType")
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingFileType)?;
    normalize(tag, payload)
}

pub fn normalize(file_type_tag: &str, payload: &Value) -> Result<Normalized, NormalizeError> {
    let file_type: FileType = file_type_tag.parse()?;
    let object = payload.as_object().ok_or(NormalizeError::NotAnObject)?;

    let result = match file_type {
        FileType::Fasta => AnalysisResult::Sequences(sequence_records(object)?),
        FileType::Bam | FileType::Sam => AnalysisResult::Alignment(alignment_summary(file_type, object)?),
        FileType::Unknown => {
            return Err(NormalizeError::UnrecognizedFileType(file_type_tag.to_string()))
        }
    };
    Ok(Normalized { file_type, result })
}

fn required<'a>(
    object: &'a Map<String, Value>,
    file_type: FileType,
    field: &'static str,
) -> Result<&'a Value, NormalizeError> {
    object
        .get(field)
        .filter(|value| !value.is_null())
        .ok_or(NormalizeError::MissingField { file_type, field })
}

fn invalid(file_type: FileType, field: &'static str, reason: impl Into<String>) -> NormalizeError {
    NormalizeError::InvalidField {
        file_type,
        field,
        reason: reason.into(),
    }
}

fn sequence_records(object: &Map<String, Value>) -> Result<Vec<SequenceRecord>, NormalizeError> {
    let entries = required(object, FileType::Fasta, "sequences")?
        .as_array()
        .ok_or_else(|| invalid(FileType::Fasta, "sequences", "expected a list"))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            SequenceRecord::deserialize(entry)
                .map_err(|e| invalid(FileType::Fasta, "sequences", format!("record {index}: {e}")))
        })
        .collect()
}

fn alignment_summary(
    file_type: FileType,
    object: &Map<String, Value>,
) -> Result<AlignmentSummary, NormalizeError> {
    let total_reads = count_value(required(object, file_type, "total_reads")?)
        .ok_or_else(|| invalid(file_type, "total_reads", "expected a non-negative integer"))?;

    let average = |field: &'static str| -> Result<f64, NormalizeError> {
        required(object, file_type, field)?
            .as_f64()
            .ok_or_else(|| invalid(file_type, field, "expected a number"))
    };

    let distribution = required(object, file_type, "read_length_distribution")?
        .as_object()
        .ok_or_else(|| invalid(file_type, "read_length_distribution", "expected a mapping"))?;

    Ok(AlignmentSummary {
        total_reads,
        average_read_length: average("average_read_length")?,
        average_quality: average("average_quality")?,
        average_gc_content: average("average_gc_content")?,
        average_at_content: average("average_at_content")?,
        read_length_distribution: read_length_distribution(distribution),
    })
}

/// Best effort: entries with a non-integer key or count are dropped.
fn read_length_distribution(raw: &Map<String, Value>) -> BTreeMap<u64, u64> {
    let mut distribution = BTreeMap::new();
    for (key, value) in raw {
        match (key.trim().parse::<u64>(), count_value(value)) {
            (Ok(length), Some(count)) => *distribution.entry(length).or_insert(0) += count,
            _ => debug!("dropping read length entry {key:?} => {value}"),
        }
    }
    distribution
}

/// Accepts integers, integral floats and numeric strings; nothing negative.
fn count_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
