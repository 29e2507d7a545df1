//! Application service: the submit/review/withdraw state machine.

use std::sync::Arc;

use tracing::info;

use hireboard_core::{ApplicationId, DomainError, DomainResult, JobId};
use hireboard_events::{
    ApplicationStatusChanged, ApplicationSubmitted, DomainEvent, EventPublisher,
};
use hireboard_identity::IdentityProvider;

use crate::access::{map_store_error, resolve_caller};
use crate::application::{ApplicationDraft, ApplicationStatus, JobApplication};
use crate::job::Job;
use crate::store::{ApplicationStore, JobStore, StoreError};

/// An application joined with its job, where the job still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRecord {
    pub application: JobApplication,
    pub job: Option<Job>,
}

/// Orchestrates application mutations. Only the job owner moves an
/// application through the review states; only the applicant withdraws.
#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationStore>,
    jobs: Arc<dyn JobStore>,
    identity: Arc<dyn IdentityProvider>,
    publisher: EventPublisher,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        jobs: Arc<dyn JobStore>,
        identity: Arc<dyn IdentityProvider>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            applications,
            jobs,
            identity,
            publisher,
        }
    }

    async fn get_job_or_not_found(&self, id: JobId) -> DomainResult<Job> {
        self.jobs
            .get(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("job not found: {id}")))
    }

    /// Submit an application. The cover letter is validated before any
    /// lookup or write; the `(job, user)` uniqueness race is settled by the
    /// store, not by a pre-check here.
    pub async fn apply_for_job(
        &self,
        job_id: JobId,
        draft: ApplicationDraft,
        token: &str,
    ) -> DomainResult<JobApplication> {
        draft.validate()?;

        let caller = resolve_caller(self.identity.as_ref(), token).await?;
        if caller.is_employer() {
            return Err(DomainError::authorization("employers cannot apply for jobs"));
        }

        let job = self.get_job_or_not_found(job_id).await?;
        if !job.is_active {
            return Err(DomainError::job_closed(
                "this job is no longer accepting applications",
            ));
        }

        let application = JobApplication::new(job.id, &caller, draft);
        self.applications
            .insert(application.clone())
            .await
            .map_err(|e| match e {
                StoreError::DuplicateApplication => {
                    DomainError::conflict("you have already applied for this job")
                }
                other => map_store_error(other),
            })?;
        info!(application_id = %application.id, job_id = %job.id, "application submitted");

        self.publisher
            .publish(&DomainEvent::ApplicationSubmitted(ApplicationSubmitted {
                application_id: application.id,
                job_id: job.id,
                job_title: job.title.clone(),
                company_name: job.company_name.clone(),
                applicant_username: application.username.clone(),
                applicant_email: application.user_email.clone(),
                employer_email: job.posted_by_email.clone(),
            }));

        Ok(application)
    }

    /// All applications for a job, visible to its poster only.
    pub async fn get_applications_for_job(
        &self,
        job_id: JobId,
        token: &str,
    ) -> DomainResult<(Job, Vec<JobApplication>)> {
        let caller = resolve_caller(self.identity.as_ref(), token).await?;

        let job = self.get_job_or_not_found(job_id).await?;
        if !job.is_posted_by(caller.id) {
            return Err(DomainError::authorization(
                "you can only view applications for your own jobs",
            ));
        }

        let applications = self
            .applications
            .list_for_job(job_id)
            .await
            .map_err(map_store_error)?;
        Ok((job, applications))
    }

    /// The caller's applications, joined with whatever job rows still
    /// resolve.
    pub async fn get_my_applications(&self, token: &str) -> DomainResult<Vec<ApplicationRecord>> {
        let caller = resolve_caller(self.identity.as_ref(), token).await?;

        let applications = self
            .applications
            .list_for_user(caller.id)
            .await
            .map_err(map_store_error)?;

        let mut records = Vec::with_capacity(applications.len());
        for application in applications {
            let job = self
                .jobs
                .get(application.job_id)
                .await
                .map_err(map_store_error)?;
            records.push(ApplicationRecord { application, job });
        }
        Ok(records)
    }

    /// Owner-driven status transition. Any review state may be set in any
    /// order, but `WITHDRAWN` belongs to the applicant, and a withdrawn
    /// application stays withdrawn.
    pub async fn update_application_status(
        &self,
        application_id: ApplicationId,
        new_status: ApplicationStatus,
        token: &str,
    ) -> DomainResult<JobApplication> {
        if new_status.is_withdrawn() {
            return Err(DomainError::validation(
                "WITHDRAWN is set by withdrawing the application, not by a status update",
            ));
        }

        let caller = resolve_caller(self.identity.as_ref(), token).await?;

        let mut application = self
            .applications
            .get(application_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| {
                DomainError::not_found(format!("application not found: {application_id}"))
            })?;

        let job = self.get_job_or_not_found(application.job_id).await?;
        if !job.is_posted_by(caller.id) {
            return Err(DomainError::authorization(
                "you can only update applications for your own jobs",
            ));
        }

        if application.status.is_withdrawn() {
            return Err(DomainError::conflict(
                "the applicant has withdrawn this application",
            ));
        }

        let old_status = application.status;
        application.set_status(new_status);
        self.applications
            .update(&application)
            .await
            .map_err(map_store_error)?;
        info!(
            application_id = %application.id,
            old_status = %old_status,
            new_status = %new_status,
            "application status updated"
        );

        self.publisher
            .publish(&DomainEvent::ApplicationStatusChanged(
                ApplicationStatusChanged {
                    application_id: application.id,
                    job_id: job.id,
                    job_title: job.title.clone(),
                    company_name: job.company_name.clone(),
                    applicant_username: application.username.clone(),
                    applicant_email: application.user_email.clone(),
                    old_status: old_status.as_str().to_string(),
                    new_status: new_status.as_str().to_string(),
                },
            ));

        Ok(application)
    }

    /// Applicant withdraws their own application for a job. Unconditional
    /// and idempotent: whatever state the review reached, the applicant can
    /// always leave, and leaving twice is not an error.
    pub async fn withdraw_application(
        &self,
        job_id: JobId,
        token: &str,
    ) -> DomainResult<JobApplication> {
        let caller = resolve_caller(self.identity.as_ref(), token).await?;

        let mut application = self
            .applications
            .find_by_job_and_user(job_id, caller.id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::not_found("application not found for this job"))?;

        if !application.status.is_withdrawn() {
            application.set_status(ApplicationStatus::Withdrawn);
            self.applications
                .update(&application)
                .await
                .map_err(map_store_error)?;
            info!(application_id = %application.id, "application withdrawn");
        }

        Ok(application)
    }

    /// How many applications a job has received; used by job read models.
    pub async fn count_for_job(&self, job_id: JobId) -> DomainResult<u64> {
        self.applications
            .count_for_job(job_id)
            .await
            .map_err(map_store_error)
    }
}
