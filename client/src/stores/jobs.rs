//! Job portal store.

use std::sync::Arc;

use stash_engine::domain::{Job, JobFilter, JobPatch, PostJob};
use stash_engine::{Position, Reconciliation};
use tokio::sync::watch;

use crate::binding::EpochToken;
use crate::error::Result;
use crate::store::{ErrorPolicy, Outcome, RemoteStore, Routes};
use crate::transport::{ApiRequest, Transport};

const JOBS_PATH: &str = "/api/v1/job";
const APPLY_PATH: &str = "/api/v1/application/apply";

/// Job listings plus the active search filters.
#[derive(Debug)]
pub struct JobStore {
    jobs: RemoteStore<Job>,
    filters: watch::Sender<JobFilter>,
}

impl JobStore {
    pub fn new(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        let routes = Routes::new(JOBS_PATH, "jobs", "job").prepend();
        Self {
            jobs: RemoteStore::new("jobs", transport, routes, policy),
            filters: watch::Sender::new(JobFilter::default()),
        }
    }

    pub fn set_filters(&self, filters: JobFilter) {
        self.filters.send_replace(filters);
    }

    pub fn filters(&self) -> JobFilter {
        self.filters.borrow().clone()
    }

    /// Load listings matching the current keyword. The backend only searches
    /// by keyword; the other filters apply locally via [`filtered`](Self::filtered).
    pub async fn fetch_all(&self, token: &EpochToken) -> Outcome {
        let keyword = self.filters.borrow().keyword.clone().unwrap_or_default();
        let request = ApiRequest::get(format!("{}/get", JOBS_PATH)).query("keyword", keyword);
        self.jobs.fetch_with(request, "jobs", token).await
    }

    /// Post a new job; it appears first.
    pub async fn post_job(&self, job: &PostJob, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::post(format!("{}/post", JOBS_PATH));
        self.jobs
            .create_with(request, job, "job", Position::Prepend, token)
            .await
    }

    pub async fn update_job(&self, id: &str, patch: &JobPatch, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::put(format!("{}/update/{}", JOBS_PATH, id));
        self.jobs
            .update_with(request, patch, id.to_string(), patch.clone(), "job", token)
            .await
    }

    pub async fn remove_job(&self, id: &str, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::delete(format!("{}/delete/{}", JOBS_PATH, id));
        self.jobs.remove_with(request, id.to_string(), token).await
    }

    /// Apply to a job as `user_id`. The backend only confirms; the
    /// application is recorded locally.
    pub async fn apply(&self, id: &str, user_id: &str, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::get(format!("{}/{}", APPLY_PATH, id));
        let (id, user_id) = (id.to_string(), user_id.to_string());

        self.jobs
            .confirm_with(
                request,
                None::<&serde_json::Value>,
                move |current| {
                    let job = current.get(&id)?;
                    if job.has_applied(&user_id) {
                        return None;
                    }
                    let mut applications = job.applications.clone();
                    applications.push(user_id);
                    Some(Reconciliation::Update {
                        id,
                        confirmed: None,
                        patch: JobPatch {
                            applications: Some(applications),
                            ..Default::default()
                        },
                    })
                },
                token,
            )
            .await
    }

    /// Loaded jobs passing every filter, in list order.
    pub fn filtered(&self) -> Vec<Job> {
        let filters = self.filters();
        self.jobs
            .entities()
            .into_iter()
            .filter(|job| filters.matches(job))
            .collect()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.entities()
    }

    pub fn store(&self) -> &RemoteStore<Job> {
        &self.jobs
    }
}
