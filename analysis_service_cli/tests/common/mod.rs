#![allow(dead_code)]

use analysis_service_cli::error::TransportError;
use analysis_service_cli::transport::AnalysisService;
use analysis_service_cli::upload::UploadFile;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub enum Canned {
    Payload(Value),
    Status(u16),
}

/// In-memory analysis service. The result id of an upload is its file name.
#[derive(Default)]
pub struct FakeService {
    results: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    gate: Option<Arc<Semaphore>>,
    refuse_uploads: bool,
    pub uploads: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, file_name: &str, canned: Canned) -> Self {
        self.results.insert(file_name.to_string(), canned);
        self
    }

    pub fn with_delay(mut self, file_name: &str, delay: Duration) -> Self {
        self.delays.insert(file_name.to_string(), delay);
        self
    }

    /// Every fetch waits until the returned semaphore gets a permit.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn refusing_uploads(mut self) -> Self {
        self.refuse_uploads = true;
        self
    }
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn upload(&self, file: UploadFile) -> Result<String, TransportError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.refuse_uploads {
            return Err(TransportError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                url: "fake://api/upload/".into(),
            });
        }
        Ok(file.file_name)
    }

    async fn fetch_results(&self, result_id: &str) -> Result<Value, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }
        if let Some(delay) = self.delays.get(result_id) {
            tokio::time::sleep(*delay).await;
        }
        match self.results.get(result_id) {
            Some(Canned::Payload(payload)) => Ok(payload.clone()),
            Some(Canned::Status(code)) => Err(TransportError::Status {
                status: StatusCode::from_u16(*code).expect("valid status"),
                url: format!("fake://api/results/{result_id}"),
            }),
            None => Err(TransportError::Status {
                status: StatusCode::NOT_FOUND,
                url: format!("fake://api/results/{result_id}"),
            }),
        }
    }
}

pub fn fasta_payload() -> Value {
    json!({
        "fileType": "FASTA",
        "message": "File processed successfully",
        "sequences": [{
            "id": "seq1",
            "length": 500,
            "description": "seq1",
            "gc_content": "45.2",
            "at_content": "54.8",
            "sequence": "ATCG",
            "reverse_complement": "CGAT"
        }]
    })
}

pub fn bam_payload() -> Value {
    json!({
        "fileType": "BAM",
        "total_reads": 1000,
        "average_read_length": 150,
        "average_quality": 35.2,
        "average_gc_content": 41.0,
        "average_at_content": 59.0,
        "read_length_distribution": {"100": 5, "150": 900, "200": 95}
    })
}

pub fn sam_payload() -> Value {
    let mut payload = bam_payload();
    payload["fileType"] = json!("SAM");
    payload
}

pub fn file(name: &str) -> UploadFile {
    UploadFile::new(name, b">seq1\nATCG\n".to_vec())
}
