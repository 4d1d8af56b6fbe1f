use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::TrackError;
use crate::normalizer::{normalize_payload, Normalized};
use crate::transport::AnalysisService;
use crate::upload::{self, UploadFile};
use crate::{FailureKind, FileCategory, FileType, Job, JobId, JobStatus};

/// An accepted upload: our job id plus the id the service knows it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub job_id: JobId,
    pub result_id: String,
}

/// A submitted job whose result fetch is running in the background.
/// The handle resolves to `true` if that fetch was the one that settled the job.
pub struct TrackedJob {
    pub job_id: JobId,
    pub resolution: JoinHandle<bool>,
}

/// Owns every job and is the only thing allowed to change one.
pub struct JobTracker {
    service: Arc<dyn AnalysisService>,
    jobs: DashMap<JobId, Job>,
    next_id: AtomicU64,
}

impl JobTracker {
    pub fn new(service: Arc<dyn AnalysisService>) -> Self {
        Self {
            service,
            jobs: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Uploads `file` and, once the service accepts it, records a `Processing` job.
    /// Nothing is recorded for rejected or failed uploads.
    pub async fn submit_upload(&self, file: UploadFile) -> Result<Submission, TrackError> {
        upload::validate_file(&file.file_name, file.size())?;
        let file_name = file.file_name.clone();

        let result_id = self.service.upload(file).await?;

        let job_id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.jobs
            .insert(job_id, Job::new(job_id, file_name.clone(), Utc::now()));
        info!("job {job_id} created for {file_name} (result id {result_id})");

        Ok(Submission { job_id, result_id })
    }

    /// Fetches and normalizes the result, then settles the job.
    /// Returns `false` if the job was already settled or no longer exists.
    pub async fn resolve_job(&self, job_id: JobId, result_id: &str) -> bool {
        if !self.is_pending(job_id) {
            debug!("job {job_id} already settled, skipping fetch of {result_id}");
            return false;
        }
        let outcome = self.fetch_normalized(result_id).await;
        self.settle(job_id, outcome)
    }

    async fn fetch_normalized(&self, result_id: &str) -> Result<Normalized, TrackError> {
        let payload = self.service.fetch_results(result_id).await?;
        Ok(normalize_payload(&payload)?)
    }

    // The status check and the write happen under the same entry lock, so a late
    // duplicate can never overwrite a settled job.
    fn settle(&self, job_id: JobId, outcome: Result<Normalized, TrackError>) -> bool {
        let Some(mut job) = self.jobs.get_mut(&job_id) else {
            warn!("job {job_id} vanished before its result arrived");
            return false;
        };
        if !job.is_processing() {
            debug!("ignoring duplicate resolution for job {job_id}");
            return false;
        }

        match outcome {
            Ok(Normalized { file_type, result }) => {
                info!("job {job_id} done ({file_type})");
                job.file_type = file_type;
                job.status = JobStatus::Done { result };
            }
            Err(err) => {
                let kind = match err {
                    TrackError::Normalize(_) => FailureKind::Normalization,
                    TrackError::Transport(_) | TrackError::Rejected(_) => FailureKind::Transport,
                };
                warn!("job {job_id} failed: {err}");
                // no confirmed type without a result, fall back to the upload's extension
                let hint = FileType::from_file_name(&job.file_name);
                job.file_type = hint;
                job.status = JobStatus::Error {
                    kind,
                    reason: err.to_string(),
                };
            }
        }
        true
    }

    /// Runs [`resolve_job`](Self::resolve_job) on its own task.
    pub fn spawn_resolution(self: &Arc<Self>, submission: Submission) -> JoinHandle<bool> {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            tracker
                .resolve_job(submission.job_id, &submission.result_id)
                .await
        })
    }

    /// Upload, then fetch the result in the background.
    pub async fn track(self: &Arc<Self>, file: UploadFile) -> Result<TrackedJob, TrackError> {
        let submission = self.submit_upload(file).await?;
        let job_id = submission.job_id;
        Ok(TrackedJob {
            job_id,
            resolution: self.spawn_resolution(submission),
        })
    }

    pub fn get(&self, job_id: JobId) -> Option<Job> {
        self.jobs.get(&job_id).map(|job| job.value().clone())
    }

    pub fn is_pending(&self, job_id: JobId) -> bool {
        self.jobs
            .get(&job_id)
            .map(|job| job.is_processing())
            .unwrap_or(false)
    }

    /// Every job in id order.
    pub fn jobs(&self) -> Vec<Job> {
        self.snapshot(|_| true)
    }

    pub fn pending(&self) -> Vec<Job> {
        self.snapshot(Job::is_processing)
    }

    /// Jobs routed to one result table, in id order. `Unknown` jobs match neither.
    pub fn list_by_category(&self, category: FileCategory) -> Vec<Job> {
        self.snapshot(|job| job.category() == Some(category))
    }

    pub fn remove(&self, job_id: JobId) -> Option<Job> {
        let removed = self.jobs.remove(&job_id).map(|(_, job)| job);
        if removed.is_some() {
            info!("job {job_id} removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn snapshot(&self, keep: impl Fn(&Job) -> bool) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        jobs.sort_by_key(|job| job.id);
        jobs
    }
}
