use std::path::Path;

use crate::error::UploadRejection;
use crate::FileType;

pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["fasta", "sam", "bam"];

/// Name and size of a file the user picked, known before its bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub file_name: String,
    pub size: u64,
}

impl FileCandidate {
    pub fn new(file_name: impl Into<String>, size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(Self::new(display_name(path), metadata.len()))
    }
}

/// A validated file ready to hand to the analysis service.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(display_name(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn candidate(&self) -> FileCandidate {
        FileCandidate::new(self.file_name.clone(), self.size())
    }

    pub fn file_type_hint(&self) -> FileType {
        FileType::from_file_name(&self.file_name)
    }

    /// BAM is binary, FASTA and SAM are plain text.
    pub fn mime_type(&self) -> &'static str {
        match self.file_type_hint() {
            FileType::Bam => "application/octet-stream",
            _ => "text/plain",
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn has_accepted_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// Checks one file: type first, then size.
pub fn validate_file(file_name: &str, size: u64) -> Result<(), UploadRejection> {
    if !has_accepted_extension(file_name) {
        return Err(UploadRejection::InvalidType {
            file_name: file_name.to_string(),
        });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            file_name: file_name.to_string(),
            size,
        });
    }
    Ok(())
}

/// A selection is exactly one acceptable file.
pub fn validate_selection(candidates: &[FileCandidate]) -> Result<&FileCandidate, UploadRejection> {
    match candidates {
        [] => Err(UploadRejection::NoFile),
        [single] => {
            validate_file(&single.file_name, single.size)?;
            Ok(single)
        }
        many => Err(UploadRejection::MultipleFiles { count: many.len() }),
    }
}

/// Human readable size, KB below one MiB and MB above.
pub fn format_file_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes < MIB {
        format!("{:.2} KB", bytes / 1024.0)
    } else {
        format!("{:.2} MB", bytes / MIB)
    }
}
