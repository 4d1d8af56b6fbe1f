pub mod detail_handlers;
pub mod job_handlers;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub type Reply = (StatusCode, Json<Value>);

pub fn message(status: StatusCode, text: impl Into<String>) -> Reply {
    (status, Json(json!({ "message": text.into() })))
}

pub fn job_not_found() -> Reply {
    message(StatusCode::NOT_FOUND, "Job not found")
}

#[cfg(test)]
pub mod tests {
    use analysis_service_cli::error::TransportError;
    use analysis_service_cli::tracker::JobTracker;
    use analysis_service_cli::transport::AnalysisService;
    use analysis_service_cli::upload::UploadFile;
    use async_trait::async_trait;
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::state::AppState;

    /// Answers every upload with its file name and every fetch by extension.
    struct CannedService;

    #[async_trait]
    impl AnalysisService for CannedService {
        async fn upload(&self, file: UploadFile) -> Result<String, TransportError> {
            Ok(file.file_name)
        }

        async fn fetch_results(&self, result_id: &str) -> Result<Value, TransportError> {
            if result_id.ends_with(".fasta") {
                Ok(json!({
                    "fileType": "FASTA",
                    "sequences": [{
                        "id": "seq1",
                        "length": 4,
                        "gc_content": "50.0",
                        "at_content": "50.0",
                        "sequence": "ATCG"
                    }]
                }))
            } else if result_id.ends_with(".bam") {
                Ok(json!({
                    "fileType": "BAM",
                    "total_reads": 1000,
                    "average_read_length": 150,
                    "average_quality": 35.2,
                    "average_gc_content": 41.0,
                    "average_at_content": 59.0,
                    "read_length_distribution": {"100": 5, "150": 900, "200": 95}
                }))
            } else {
                Err(TransportError::MissingId)
            }
        }
    }

    /// Fails every upload the way an unreachable service would.
    struct RefusingService;

    #[async_trait]
    impl AnalysisService for RefusingService {
        async fn upload(&self, _file: UploadFile) -> Result<String, TransportError> {
            Err(TransportError::MissingId)
        }

        async fn fetch_results(&self, _result_id: &str) -> Result<Value, TransportError> {
            Err(TransportError::MissingId)
        }
    }

    pub fn refusing_state() -> AppState {
        AppState::new(Arc::new(JobTracker::new(Arc::new(RefusingService))))
    }

    /// A state whose jobs for `names` have all settled, numbered from 1.
    pub async fn state_with(names: &[&str]) -> AppState {
        let tracker = Arc::new(JobTracker::new(Arc::new(CannedService)));
        for name in names {
            let tracked = tracker
                .track(UploadFile::new(*name, b"ATCG".to_vec()))
                .await
                .unwrap();
            tracked.resolution.await.unwrap();
        }
        AppState::new(tracker)
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }
}
