use analysis_service_cli::tracker::JobTracker;
use std::sync::Arc;

// One tracker for every browser tab: the dashboard shows a single job list.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<JobTracker>,
}

impl AppState {
    pub fn new(tracker: Arc<JobTracker>) -> Self {
        AppState { tracker }
    }
}
