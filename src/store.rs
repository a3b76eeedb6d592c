//! Client-side cache of job applications plus the active filter criteria.
//!
//! The store owns its repository and is mutated through `&mut self`, so a
//! single owner (the CLI command or the browser loop) drives it. Filtered and
//! sorted views are derived on read from the cache and the criteria.

use crate::api::JobRepository;
use crate::error::Result;
use crate::filters::{self, FilterCriteria, FilterUpdate, JobCounts};
use crate::models::{JobApplication, JobUpdate, NewJobApplication};

pub struct JobStore<R> {
    repository: R,
    jobs: Vec<JobApplication>,
    filters: FilterCriteria,
    loading: bool,
    error: Option<String>,
}

impl<R: JobRepository> JobStore<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            jobs: Vec::new(),
            filters: FilterCriteria::default(),
            loading: false,
            error: None,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    // --- State ---

    pub fn all_jobs(&self) -> &[JobApplication] {
        &self.jobs
    }

    /// Replace the cache wholesale.
    pub fn set_jobs(&mut self, jobs: Vec<JobApplication>) {
        self.jobs = jobs;
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // --- Derived views ---

    pub fn filtered_jobs(&self) -> Vec<&JobApplication> {
        filters::filter_jobs(&self.jobs, &self.filters)
    }

    pub fn sorted_jobs(&self) -> Vec<&JobApplication> {
        filters::sort_jobs(&self.filtered_jobs(), self.filters.sort)
    }

    /// Counts over the filtered view, not the whole cache.
    pub fn job_counts(&self) -> JobCounts {
        filters::count_jobs(self.filtered_jobs())
    }

    // --- Actions ---

    /// Load the collection once. A non-empty cache makes this a no-op.
    pub async fn fetch_jobs(&mut self) {
        if !self.jobs.is_empty() {
            tracing::debug!(cached = self.jobs.len(), "job cache already populated");
            return;
        }

        self.loading = true;
        match self.repository.list_jobs().await {
            Ok(jobs) => {
                tracing::debug!(count = jobs.len(), "fetched jobs");
                self.jobs = jobs;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch jobs");
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
    }

    /// Drop the cache so the next [`fetch_jobs`](Self::fetch_jobs) goes to the repository.
    pub fn invalidate(&mut self) {
        self.jobs.clear();
    }

    pub fn set_filters(&mut self, update: FilterUpdate) {
        self.filters = update.merge_into(&self.filters);
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterCriteria::default();
    }

    /// Delete remotely, then drop the first cached record with `id`.
    ///
    /// The request is sent even when `id` is not cached.
    pub async fn delete_job(&mut self, id: &str) -> Result<()> {
        if let Err(err) = self.repository.delete_job(id).await {
            tracing::warn!(id, error = %err, "failed to delete job");
            self.error = Some(err.to_string());
            return Err(err);
        }

        if let Some(idx) = self.jobs.iter().position(|job| job.id == id) {
            self.jobs.remove(idx);
        }
        Ok(())
    }

    pub async fn create_job(&mut self, job: &NewJobApplication) -> Result<JobApplication> {
        match self.repository.create_job(job).await {
            Ok(created) => {
                self.jobs.push(created.clone());
                Ok(created)
            }
            Err(err) => {
                tracing::warn!(company = %job.company, error = %err, "failed to create job");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Update remotely, then swap the server's copy into the cache.
    pub async fn update_job(&mut self, id: &str, updates: &JobUpdate) -> Result<JobApplication> {
        match self.repository.update_job(id, updates).await {
            Ok(updated) => {
                match self.jobs.iter_mut().find(|job| job.id == id) {
                    Some(cached) => *cached = updated.clone(),
                    None => self.jobs.push(updated.clone()),
                }
                Ok(updated)
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to update job");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Cached record if present, otherwise a single-record request.
    pub async fn find_job(&self, id: &str) -> Result<JobApplication> {
        if let Some(job) = self.jobs.iter().find(|job| job.id == id) {
            return Ok(job.clone());
        }
        self.repository.get_job(id).await
    }
}
