//! Response DTOs and query-parameter mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hireboard_core::{
    ApplicationId, DomainError, DomainResult, JobId, Page, PageRequest, SortDir, SortKey, UserId,
};
use hireboard_jobs::{ApplicationStatus, Job, JobApplication};

use crate::app::state::AppState;

/// Job representation plus how many applications it has drawn.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    #[serde(flatten)]
    pub job: Job,
    pub application_count: u64,
}

pub async fn job_to_response(state: &AppState, job: Job) -> DomainResult<JobResponse> {
    let application_count = state.applications.count_for_job(job.id).await?;
    Ok(JobResponse {
        job,
        application_count,
    })
}

pub async fn job_page_to_response(
    state: &AppState,
    page: Page<Job>,
) -> DomainResult<Page<JobResponse>> {
    let mut items = Vec::with_capacity(page.items.len());
    for job in page.items {
        items.push(job_to_response(state, job).await?);
    }
    Ok(Page {
        items,
        page: page.page,
        size: page.size,
        total_elements: page.total_elements,
        total_pages: page.total_pages,
    })
}

/// Application representation joined with job display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: String,
    pub user_id: UserId,
    pub username: String,
    pub user_email: String,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationResponse {
    /// `job` may be gone (soft data drift); display fields degrade to
    /// "Unknown" instead of failing the read.
    pub fn from_parts(application: JobApplication, job: Option<&Job>) -> Self {
        Self {
            id: application.id,
            job_id: application.job_id,
            job_title: job.map_or_else(|| "Unknown".to_string(), |j| j.title.clone()),
            company_name: job.map_or_else(|| "Unknown".to_string(), |j| j.company_name.clone()),
            user_id: application.user_id,
            username: application.username,
            user_email: application.user_email,
            cover_letter: application.cover_letter,
            resume_url: application.resume_url,
            status: application.status,
            applied_at: application.applied_at,
            updated_at: application.updated_at,
        }
    }
}

/// Look up the job behind an application for response display; a missing
/// job is a display concern, not an error.
pub async fn application_to_response(
    state: &AppState,
    application: JobApplication,
) -> DomainResult<ApplicationResponse> {
    let job = match state.jobs.get_job(application.job_id).await {
        Ok(job) => Some(job),
        Err(DomainError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };
    Ok(ApplicationResponse::from_parts(application, job.as_ref()))
}

/// `page`, `size`, `sortBy`, `sortDir` with the documented defaults.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortDir")]
    pub sort_dir: Option<String>,
}

impl PageQuery {
    pub fn resolve(&self) -> DomainResult<(PageRequest, SortKey, SortDir)> {
        let request = self.page_request()?;
        let key = match &self.sort_by {
            Some(raw) => raw.parse::<SortKey>()?,
            None => SortKey::default(),
        };
        let dir = match &self.sort_dir {
            Some(raw) => raw.parse::<SortDir>()?,
            None => SortDir::default(),
        };
        Ok((request, key, dir))
    }

    pub fn page_request(&self) -> DomainResult<PageRequest> {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl SearchQuery {
    pub fn page_request(&self) -> DomainResult<PageRequest> {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SalaryRangeQuery {
    #[serde(rename = "minSalary")]
    pub min_salary: f64,
    #[serde(rename = "maxSalary")]
    pub max_salary: f64,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl SalaryRangeQuery {
    pub fn page_request(&self) -> DomainResult<PageRequest> {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}
