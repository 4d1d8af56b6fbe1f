use analysis_service_cli::error::{TrackError, UploadRejection};
use analysis_service_cli::presenter;
use analysis_service_cli::upload::{self, UploadFile};
use analysis_service_cli::{FileCategory, JobId};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::handlers::{job_not_found, message, Reply};
use crate::state::AppState;

/// POST /api/upload
pub async fn upload_file(Extension(state): Extension<AppState>, mut multipart: Multipart) -> Reply {
    // 1) Collect every "file" part, the selection is validated as a whole
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_failure(e),
        };
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => files.push(UploadFile::new(file_name, bytes.to_vec())),
            Err(e) => return multipart_failure(e),
        }
    }

    // 2) Same checks as the upload widget, before anything leaves the process
    let candidates: Vec<_> = files.iter().map(UploadFile::candidate).collect();
    if let Err(rejection) = upload::validate_selection(&candidates) {
        return rejected(rejection);
    }
    let Some(file) = files.into_iter().next() else {
        return rejected(UploadRejection::NoFile);
    };

    // 3) Upload and let the result fetch run in the background
    let file_name = file.file_name.clone();
    match state.tracker.track(file).await {
        Ok(tracked) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "message": format!("Uploaded File: {file_name}"),
                "job_id": tracked.job_id,
            })),
        ),
        Err(TrackError::Rejected(rejection)) => rejected(rejection),
        Err(e) => {
            log::warn!("upload of {file_name} failed: {e}");
            message(StatusCode::BAD_GATEWAY, e.user_message())
        }
    }
}

fn rejected(rejection: UploadRejection) -> Reply {
    log::info!("upload rejected: {rejection:?}");
    message(StatusCode::BAD_REQUEST, rejection.to_string())
}

fn multipart_failure(e: MultipartError) -> Reply {
    // the body limit trips while streaming a part, which is still an oversized file
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return message(
            StatusCode::PAYLOAD_TOO_LARGE,
            UploadRejection::TooLarge {
                file_name: String::new(),
                size: 0,
            }
            .to_string(),
        );
    }
    log::warn!("malformed upload: {e}");
    message(e.status(), e.body_text())
}

/// GET /api/jobs
pub async fn list_jobs(Extension(state): Extension<AppState>) -> impl IntoResponse {
    Json(state.tracker.jobs())
}

/// GET /api/jobs/fasta
pub async fn list_fasta_jobs(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let jobs = state.tracker.list_by_category(FileCategory::Sequences);
    Json(json!({
        "title": FileCategory::Sequences.label(),
        "rows": presenter::sequence_rows(&jobs),
    }))
}

/// GET /api/jobs/alignments
pub async fn list_alignment_jobs(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let jobs = state.tracker.list_by_category(FileCategory::Alignments);
    Json(json!({
        "title": FileCategory::Alignments.label(),
        "rows": presenter::alignment_rows(&jobs),
    }))
}

/// GET /api/jobs/{id}
pub async fn get_job(Extension(state): Extension<AppState>, Path(id): Path<u64>) -> Response {
    match state.tracker.get(JobId(id)) {
        Some(job) => Json(job).into_response(),
        None => job_not_found().into_response(),
    }
}

/// DELETE /api/jobs/{id}
pub async fn delete_job(Extension(state): Extension<AppState>, Path(id): Path<u64>) -> Response {
    match state.tracker.remove(JobId(id)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => job_not_found().into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::tests::{body_json, refusing_state, state_with};
    use analysis_service_cli::FileType;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header, Request},
    };
    use serde_json::Value;

    const BOUNDARY: &str = "dashboard-test-boundary";

    /// A browser-style form post with one "file" part per entry.
    fn form(files: &[(&str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, content) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn post(state: &AppState, files: &[(&str, &[u8])]) -> (StatusCode, Value) {
        let multipart = Multipart::from_request(form(files), &()).await.unwrap();
        let (status, Json(body)) = upload_file(Extension(state.clone()), multipart).await;
        (status, body)
    }

    #[tokio::test]
    async fn single_file_upload_is_accepted() {
        let state = state_with(&[]).await;

        let (status, body) = post(&state, &[("a.fasta", b">seq1\nATCG\n")]).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["job_id"], 1);
        assert_eq!(body["message"], "Uploaded File: a.fasta");
        assert_eq!(state.tracker.len(), 1);
        assert_eq!(state.tracker.get(JobId(1)).unwrap().file_name, "a.fasta");
    }

    #[tokio::test]
    async fn bad_selections_are_rejected_without_a_job() {
        let state = state_with(&[]).await;

        let (status, body) = post(&state, &[("a.fasta", b"A"), ("b.bam", b"B")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Multiple files not allowed. Please upload one file at a time, or use batch processing."
        );

        let (status, body) = post(&state, &[("a.txt", b"A")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Invalid file type. Please upload a .fasta, .sam, or .bam, file."
        );

        let (status, body) = post(&state, &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file selected.");

        assert!(state.tracker.is_empty());
    }

    #[tokio::test]
    async fn body_over_the_limit_reads_as_too_large() {
        let state = state_with(&[]).await;
        // past the default 2 MB extractor limit
        let content = vec![b'A'; 3 * 1024 * 1024];

        let (status, body) = post(&state, &[("big.fasta", &content)]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["message"], "File is too large. Maximum size is 500MB.");
        assert!(state.tracker.is_empty());
    }

    #[tokio::test]
    async fn unreachable_service_is_a_bad_gateway() {
        let state = refusing_state();

        let (status, body) = post(&state, &[("a.fasta", b"A")]).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "An error occurred while uploading the file.");
        assert!(state.tracker.is_empty());
    }

    #[tokio::test]
    async fn tables_are_routed_by_file_type() {
        let state = state_with(&["a.fasta", "b.bam"]).await;

        let fasta = body_json(list_fasta_jobs(Extension(state.clone())).await.into_response()).await;
        assert_eq!(fasta["title"], "Genomic Sequences: FASTA");
        assert_eq!(fasta["rows"].as_array().unwrap().len(), 1);
        assert_eq!(fasta["rows"][0]["accession"], "seq1");
        assert!(fasta["rows"][0]["uploaded_label"].as_str().unwrap().contains(", 20"));

        let alignments =
            body_json(list_alignment_jobs(Extension(state.clone())).await.into_response()).await;
        assert_eq!(alignments["rows"][0]["total_reads"], 1000);
        assert_eq!(alignments["rows"][0]["histogram_enabled"], true);
    }

    #[tokio::test]
    async fn get_and_delete_by_id() {
        let state = state_with(&["a.fasta"]).await;

        let found = get_job(Extension(state.clone()), Path(1)).await;
        assert_eq!(found.status(), StatusCode::OK);
        let job = body_json(found).await;
        assert_eq!(job["file_type"], FileType::Fasta.as_str());
        assert_eq!(job["status"], "Done");

        let deleted = delete_job(Extension(state.clone()), Path(1)).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        let gone = get_job(Extension(state.clone()), Path(1)).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        let again = delete_job(Extension(state), Path(1)).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }
}
