use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::detail_handlers::{histogram_svg, sequence_view};
use crate::handlers::job_handlers::{
    delete_job, get_job, list_alignment_jobs, list_fasta_jobs, list_jobs, upload_file,
};

pub fn job_routes() -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/jobs", get(list_jobs))
        .route("/jobs/fasta", get(list_fasta_jobs))
        .route("/jobs/alignments", get(list_alignment_jobs))
        .route("/jobs/{id}", get(get_job).delete(delete_job))
        .route("/jobs/{id}/sequence", get(sequence_view))
        .route("/jobs/{id}/histogram.svg", get(histogram_svg))
}
