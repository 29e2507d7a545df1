//! Storage contracts and in-memory implementations.
//!
//! The services own all writes; stores only persist and query. The
//! `(job_id, user_id)` uniqueness invariant lives here, not in the service
//! layer, because check-then-act above the store is racy under concurrent
//! requests for the same pair.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use hireboard_core::{ApplicationId, JobId, Page, PageRequest, SortDir, SortKey, UserId};

use crate::application::JobApplication;
use crate::job::{Job, JobCategory, JobType};

/// Storage-layer failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The `(job_id, user_id)` pair already has an application.
    #[error("an application for this job and user already exists")]
    DuplicateApplication,

    /// Update target does not exist.
    #[error("record not found")]
    NotFound,

    /// Backend failure (connection, constraint, corrupt row).
    #[error("storage error: {0}")]
    Backend(String),
}

/// Persistence for job postings.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: Job) -> Result<(), StoreError>;

    async fn update(&self, job: &Job) -> Result<(), StoreError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    /// Active jobs, paged and sorted by the caller's key.
    async fn list_active(
        &self,
        page: PageRequest,
        key: SortKey,
        dir: SortDir,
    ) -> Result<Page<Job>, StoreError>;

    /// Case-insensitive substring match over title, company name, and
    /// location (union), active jobs only, newest first.
    async fn search_active(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError>;

    async fn list_active_by_category(
        &self,
        category: JobCategory,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError>;

    async fn list_active_by_type(
        &self,
        job_type: JobType,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError>;

    /// Active jobs whose advertised range fits inside `[min, max]`, sorted
    /// by minimum salary ascending. Jobs without both bounds are excluded.
    async fn list_active_by_salary_range(
        &self,
        min: f64,
        max: f64,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError>;

    /// Everything this user ever posted, active or not, newest first.
    async fn list_by_poster(&self, poster: UserId) -> Result<Vec<Job>, StoreError>;
}

/// Persistence for applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert, enforcing `(job_id, user_id)` uniqueness.
    async fn insert(&self, application: JobApplication) -> Result<(), StoreError>;

    async fn update(&self, application: &JobApplication) -> Result<(), StoreError>;

    async fn get(&self, id: ApplicationId) -> Result<Option<JobApplication>, StoreError>;

    async fn find_by_job_and_user(
        &self,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<Option<JobApplication>, StoreError>;

    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, StoreError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<JobApplication>, StoreError>;

    async fn count_for_job(&self, job_id: JobId) -> Result<u64, StoreError>;
}

fn sort_jobs(jobs: &mut [Job], key: SortKey, dir: SortDir) {
    jobs.sort_by(|a, b| {
        let ordering = match key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::CompanyName => a.company_name.cmp(&b.company_name),
            SortKey::SalaryMin => a
                .salary_min
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&b.salary_min.unwrap_or(f64::NEG_INFINITY)),
            SortKey::SalaryMax => a
                .salary_max
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&b.salary_max.unwrap_or(f64::NEG_INFINITY)),
        };
        let ordering = match dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        };
        // Stable tiebreak so paging never shuffles equal keys.
        ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
}

/// In-memory job store for dev/tests.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_active(&self, filter: impl Fn(&Job) -> bool) -> Vec<Job> {
        let jobs = self.jobs.read().unwrap_or_else(|p| p.into_inner());
        jobs.values()
            .filter(|j| j.is_active && filter(j))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|p| p.into_inner());
        jobs.insert(job.id, job);
        Ok(())
    }

    async fn update(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|p| p.into_inner());
        if !jobs.contains_key(&job.id) {
            return Err(StoreError::NotFound);
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let jobs = self.jobs.read().unwrap_or_else(|p| p.into_inner());
        Ok(jobs.get(&id).cloned())
    }

    async fn list_active(
        &self,
        page: PageRequest,
        key: SortKey,
        dir: SortDir,
    ) -> Result<Page<Job>, StoreError> {
        let mut jobs = self.collect_active(|_| true);
        sort_jobs(&mut jobs, key, dir);
        Ok(Page::from_sorted(jobs, page))
    }

    async fn search_active(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let needle = keyword.to_lowercase();
        let mut jobs = self.collect_active(|j| {
            j.title.to_lowercase().contains(&needle)
                || j.company_name.to_lowercase().contains(&needle)
                || j.location.to_lowercase().contains(&needle)
        });
        sort_jobs(&mut jobs, SortKey::CreatedAt, SortDir::Desc);
        Ok(Page::from_sorted(jobs, page))
    }

    async fn list_active_by_category(
        &self,
        category: JobCategory,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let mut jobs = self.collect_active(|j| j.category == category);
        sort_jobs(&mut jobs, SortKey::CreatedAt, SortDir::Desc);
        Ok(Page::from_sorted(jobs, page))
    }

    async fn list_active_by_type(
        &self,
        job_type: JobType,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let mut jobs = self.collect_active(|j| j.job_type == job_type);
        sort_jobs(&mut jobs, SortKey::CreatedAt, SortDir::Desc);
        Ok(Page::from_sorted(jobs, page))
    }

    async fn list_active_by_salary_range(
        &self,
        min: f64,
        max: f64,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let mut jobs = self.collect_active(|j| match (j.salary_min, j.salary_max) {
            (Some(lo), Some(hi)) => lo >= min && hi <= max,
            _ => false,
        });
        sort_jobs(&mut jobs, SortKey::SalaryMin, SortDir::Asc);
        Ok(Page::from_sorted(jobs, page))
    }

    async fn list_by_poster(&self, poster: UserId) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().unwrap_or_else(|p| p.into_inner());
        let mut mine: Vec<Job> = jobs
            .values()
            .filter(|j| j.posted_by_user_id == poster)
            .cloned()
            .collect();
        sort_jobs(&mut mine, SortKey::CreatedAt, SortDir::Desc);
        Ok(mine)
    }
}

/// In-memory application store for dev/tests.
///
/// Uniqueness is enforced by check-then-insert under one write lock, which
/// serializes concurrent applies for the same `(job, user)` pair.
#[derive(Debug, Default)]
pub struct InMemoryApplicationStore {
    applications: RwLock<HashMap<ApplicationId, JobApplication>>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, application: JobApplication) -> Result<(), StoreError> {
        let mut applications = self
            .applications
            .write()
            .unwrap_or_else(|p| p.into_inner());

        let duplicate = applications
            .values()
            .any(|a| a.job_id == application.job_id && a.user_id == application.user_id);
        if duplicate {
            return Err(StoreError::DuplicateApplication);
        }

        applications.insert(application.id, application);
        Ok(())
    }

    async fn update(&self, application: &JobApplication) -> Result<(), StoreError> {
        let mut applications = self
            .applications
            .write()
            .unwrap_or_else(|p| p.into_inner());
        if !applications.contains_key(&application.id) {
            return Err(StoreError::NotFound);
        }
        applications.insert(application.id, application.clone());
        Ok(())
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<JobApplication>, StoreError> {
        let applications = self.applications.read().unwrap_or_else(|p| p.into_inner());
        Ok(applications.get(&id).cloned())
    }

    async fn find_by_job_and_user(
        &self,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<Option<JobApplication>, StoreError> {
        let applications = self.applications.read().unwrap_or_else(|p| p.into_inner());
        Ok(applications
            .values()
            .find(|a| a.job_id == job_id && a.user_id == user_id)
            .cloned())
    }

    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, StoreError> {
        let applications = self.applications.read().unwrap_or_else(|p| p.into_inner());
        let mut result: Vec<JobApplication> = applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        result.sort_by_key(|a| a.applied_at);
        Ok(result)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<JobApplication>, StoreError> {
        let applications = self.applications.read().unwrap_or_else(|p| p.into_inner());
        let mut result: Vec<JobApplication> = applications
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|a| a.applied_at);
        Ok(result)
    }

    async fn count_for_job(&self, job_id: JobId) -> Result<u64, StoreError> {
        let applications = self.applications.read().unwrap_or_else(|p| p.into_inner());
        Ok(applications.values().filter(|a| a.job_id == job_id).count() as u64)
    }
}
