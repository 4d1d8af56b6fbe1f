use analysis_service_cli::presenter::{self, Strand};
use analysis_service_cli::JobId;
use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension,
};
use serde::Deserialize;

use crate::handlers::{job_not_found, message};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SequenceQuery {
    #[serde(default)]
    pub strand: Strand,
}

/// GET /api/jobs/{id}/sequence?strand=forward|reverse
pub async fn sequence_view(
    Extension(state): Extension<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<SequenceQuery>,
) -> Response {
    let Some(job) = state.tracker.get(JobId(id)) else {
        return job_not_found().into_response();
    };
    match presenter::sequence_detail(&job, query.strand) {
        Some(detail) => Html(detail.to_html()).into_response(),
        None => message(StatusCode::CONFLICT, "No sequence results for this job").into_response(),
    }
}

/// GET /api/jobs/{id}/histogram.svg
pub async fn histogram_svg(Extension(state): Extension<AppState>, Path(id): Path<u64>) -> Response {
    let Some(job) = state.tracker.get(JobId(id)) else {
        return job_not_found().into_response();
    };
    match presenter::histogram(&job) {
        Some(chart) => ([(header::CONTENT_TYPE, "image/svg+xml")], chart.to_svg()).into_response(),
        None => message(StatusCode::CONFLICT, "No read length results for this job").into_response(),
    }
}
