//! Error types for uploads, the analysis service and result payloads.

use thiserror::Error;

use crate::FileType;

/// Client-side validation failures. The job is never created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("File is too large. Maximum size is 500MB.")]
    TooLarge { file_name: String, size: u64 },

    #[error("Invalid file type. Please upload a .fasta, .sam, or .bam, file.")]
    InvalidType { file_name: String },

    #[error("Multiple files not allowed. Please upload one file at a time, or use batch processing.")]
    MultipleFiles { count: usize },

    #[error("No file selected.")]
    NoFile,
}

/// Network or HTTP failures while talking to the analysis service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to analysis service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("analysis service answered {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("invalid analysis service url: {0}")]
    Url(#[from] url::ParseError),

    #[error("analysis service url cannot carry a path")]
    BaseUrl,

    #[error("upload response carried no result id")]
    MissingId,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The payload does not have the shape its `fileType` tag promises.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("result payload is not a JSON object")]
    NotAnObject,

    #[error("result payload carries no fileType tag")]
    MissingFileType,

    #[error("unrecognized file type tag '{0}'")]
    UnrecognizedFileType(String),

    #[error("analysis service reported: {0}")]
    Reported(String),

    #[error("{file_type} payload is missing field '{field}'")]
    MissingField {
        file_type: FileType,
        field: &'static str,
    },

    #[error("{file_type} payload field '{field}' is malformed: {reason}")]
    InvalidField {
        file_type: FileType,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error(transparent)]
    Rejected(#[from] UploadRejection),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl TrackError {
    /// Inline message shown to whoever started the upload.
    pub fn user_message(&self) -> String {
        match self {
            TrackError::Rejected(rejection) => rejection.to_string(),
            TrackError::Transport(_) => "An error occurred while uploading the file.".to_string(),
            TrackError::Normalize(_) => "An error occurred with the file upload.".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
