//! Job lifecycle service: create/read/update/soft-delete postings.

use std::sync::Arc;

use tracing::{info, warn};

use hireboard_core::{DomainError, DomainResult, JobId, Page, PageRequest, SortDir, SortKey};
use hireboard_events::{DomainEvent, EventPublisher, JobPosted};
use hireboard_identity::IdentityProvider;

use crate::access::{map_store_error, resolve_caller};
use crate::job::{Job, JobCategory, JobDraft, JobType};
use crate::store::JobStore;

/// Orchestrates job mutations: authorization, validation, the store write,
/// and the best-effort event that follows it.
#[derive(Clone)]
pub struct JobService {
    jobs: Arc<dyn JobStore>,
    identity: Arc<dyn IdentityProvider>,
    publisher: EventPublisher,
}

impl JobService {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        identity: Arc<dyn IdentityProvider>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            jobs,
            identity,
            publisher,
        }
    }

    /// Create a posting. Employer-only; the caller's identity is frozen into
    /// the job. The `JobPosted` event carries the subscriber list for the
    /// job's category, resolved here. When that lookup is down the event
    /// goes out with an empty list: the committed job row wins over the
    /// side effect.
    pub async fn create_job(&self, draft: JobDraft, token: &str) -> DomainResult<Job> {
        let caller = resolve_caller(self.identity.as_ref(), token).await?;
        if !caller.is_employer() {
            return Err(DomainError::authorization("only employers can create jobs"));
        }

        draft.validate()?;

        let job = Job::from_draft(draft, &caller);
        self.jobs
            .insert(job.clone())
            .await
            .map_err(map_store_error)?;
        info!(job_id = %job.id, title = %job.title, "job created");

        let recipients = match self
            .identity
            .subscribers_for_category(job.category.as_str())
            .await
        {
            Ok(subscribers) => subscribers.into_iter().map(|s| s.email).collect(),
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "subscriber lookup failed, publishing without recipients");
                Vec::new()
            }
        };

        self.publisher
            .publish(&DomainEvent::JobPosted(JobPosted {
                job_id: job.id,
                title: job.title.clone(),
                company_name: job.company_name.clone(),
                location: job.location.clone(),
                category: job.category.as_str().to_string(),
                salary_min: job.salary_min,
                salary_max: job.salary_max,
                posted_by_username: job.posted_by_username.clone(),
                posted_by_email: job.posted_by_email.clone(),
                recipient_emails: recipients,
            }));

        Ok(job)
    }

    pub async fn get_job(&self, id: JobId) -> DomainResult<Job> {
        self.jobs
            .get(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("job not found: {id}")))
    }

    pub async fn get_active_jobs(
        &self,
        page: PageRequest,
        key: SortKey,
        dir: SortDir,
    ) -> DomainResult<Page<Job>> {
        self.jobs
            .list_active(page, key, dir)
            .await
            .map_err(map_store_error)
    }

    pub async fn search_jobs(&self, keyword: &str, page: PageRequest) -> DomainResult<Page<Job>> {
        self.jobs
            .search_active(keyword, page)
            .await
            .map_err(map_store_error)
    }

    pub async fn get_jobs_by_category(
        &self,
        category: JobCategory,
        page: PageRequest,
    ) -> DomainResult<Page<Job>> {
        self.jobs
            .list_active_by_category(category, page)
            .await
            .map_err(map_store_error)
    }

    pub async fn get_jobs_by_type(
        &self,
        job_type: JobType,
        page: PageRequest,
    ) -> DomainResult<Page<Job>> {
        self.jobs
            .list_active_by_type(job_type, page)
            .await
            .map_err(map_store_error)
    }

    pub async fn get_jobs_by_salary_range(
        &self,
        min: f64,
        max: f64,
        page: PageRequest,
    ) -> DomainResult<Page<Job>> {
        self.jobs
            .list_active_by_salary_range(min, max, page)
            .await
            .map_err(map_store_error)
    }

    /// Everything the calling employer has posted, soft-deleted included.
    pub async fn get_my_jobs(&self, token: &str) -> DomainResult<Vec<Job>> {
        let caller = resolve_caller(self.identity.as_ref(), token).await?;
        if !caller.is_employer() {
            return Err(DomainError::authorization(
                "only employers can view their jobs",
            ));
        }

        self.jobs
            .list_by_poster(caller.id)
            .await
            .map_err(map_store_error)
    }

    /// Ownership is by identity, not role: only the original poster may
    /// update, whatever their role says today.
    pub async fn update_job(&self, id: JobId, draft: JobDraft, token: &str) -> DomainResult<Job> {
        let caller = resolve_caller(self.identity.as_ref(), token).await?;

        let mut job = self.get_job(id).await?;
        if !job.is_posted_by(caller.id) {
            return Err(DomainError::authorization(
                "you can only update your own jobs",
            ));
        }

        draft.validate()?;
        job.apply_update(draft);
        self.jobs.update(&job).await.map_err(map_store_error)?;
        info!(job_id = %job.id, "job updated");

        Ok(job)
    }

    /// Soft delete. Idempotent: deleting an already-inactive job is a no-op
    /// success and cannot resurrect or corrupt anything.
    pub async fn delete_job(&self, id: JobId, token: &str) -> DomainResult<()> {
        let caller = resolve_caller(self.identity.as_ref(), token).await?;

        let mut job = self.get_job(id).await?;
        if !job.is_posted_by(caller.id) {
            return Err(DomainError::authorization(
                "you can only delete your own jobs",
            ));
        }

        if !job.is_active {
            info!(job_id = %job.id, "job already inactive");
            return Ok(());
        }

        job.deactivate();
        self.jobs.update(&job).await.map_err(map_store_error)?;
        info!(job_id = %job.id, "job deactivated");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::job::tests::valid_draft;
    use crate::store::InMemoryJobStore;
    use hireboard_core::UserId;
    use hireboard_events::routing_keys;
    use hireboard_events::MessageBroker;
    use hireboard_events::{InMemoryBroker, QueueSubscription};
    use hireboard_identity::{
        CategorySubscriber, IdentityError, Role, StaticDirectory, UserProfile,
    };

    struct Harness {
        service: JobService,
        directory: Arc<StaticDirectory>,
        job_posted: QueueSubscription,
    }

    fn harness() -> Harness {
        harness_with_identity(Arc::new(StaticDirectory::new()))
    }

    fn harness_with_identity(directory: Arc<StaticDirectory>) -> Harness {
        let broker = Arc::new(InMemoryBroker::new());
        let job_posted = broker.bind(routing_keys::JOB_POSTED);
        let service = JobService::new(
            Arc::new(InMemoryJobStore::new()),
            directory.clone(),
            EventPublisher::new(broker),
        );
        Harness {
            service,
            directory,
            job_posted,
        }
    }

    fn employer(directory: &StaticDirectory, token: &str) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(),
            username: format!("emp-{token}"),
            email: format!("{token}@initech.example"),
            role: Role::Employer,
        };
        directory.insert_user(token, profile.clone());
        profile
    }

    fn seeker(directory: &StaticDirectory, token: &str) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(),
            username: format!("seeker-{token}"),
            email: format!("{token}@example.com"),
            role: Role::User,
        };
        directory.insert_user(token, profile.clone());
        profile
    }

    #[tokio::test]
    async fn create_job_publishes_event_with_subscribed_recipients() {
        let h = harness();
        employer(&h.directory, "emp");
        for name in ["ada", "grace"] {
            h.directory.subscribe(
                "SOFTWARE_DEVELOPMENT",
                CategorySubscriber {
                    user_id: UserId::new(),
                    username: name.into(),
                    email: format!("{name}@example.com"),
                },
            );
        }

        let job = h.service.create_job(valid_draft(), "emp").await.unwrap();
        assert!(job.is_active);

        let delivery = h
            .job_posted
            .recv_timeout(Duration::from_millis(200))
            .expect("event should be on the queue");
        let event: hireboard_events::JobPosted = delivery.envelope.decode().unwrap();
        assert_eq!(event.job_id, job.id);
        assert_eq!(event.recipient_emails.len(), 2);
    }

    #[tokio::test]
    async fn create_job_rejects_non_employers() {
        let h = harness();
        seeker(&h.directory, "peter");

        let err = h
            .service
            .create_job(valid_draft(), "peter")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
    }

    #[tokio::test]
    async fn inverted_salary_range_persists_nothing_and_publishes_nothing() {
        let h = harness();
        employer(&h.directory, "emp");

        let draft = crate::job::JobDraft {
            salary_min: Some(50_000.0),
            salary_max: Some(40_000.0),
            ..valid_draft()
        };
        let err = h.service.create_job(draft, "emp").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let page = h
            .service
            .get_active_jobs(PageRequest::default(), SortKey::CreatedAt, SortDir::Desc)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(h.job_posted.recv_timeout(Duration::from_millis(20)).is_none());
    }

    #[tokio::test]
    async fn unknown_token_is_an_authentication_error() {
        let h = harness();
        let err = h
            .service
            .create_job(valid_draft(), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authentication(_)));
    }

    struct OfflineIdentity;

    #[async_trait]
    impl IdentityProvider for OfflineIdentity {
        async fn resolve_token(&self, _token: &str) -> Result<UserProfile, IdentityError> {
            Err(IdentityError::Unavailable("connection refused".into()))
        }

        async fn subscribers_for_category(
            &self,
            _category: &str,
        ) -> Result<Vec<CategorySubscriber>, IdentityError> {
            Err(IdentityError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn unreachable_identity_service_fails_the_request_as_unavailable() {
        let broker = Arc::new(InMemoryBroker::new());
        let service = JobService::new(
            Arc::new(InMemoryJobStore::new()),
            Arc::new(OfflineIdentity),
            EventPublisher::new(broker),
        );

        let err = service.create_job(valid_draft(), "any").await.unwrap_err();
        assert!(matches!(err, DomainError::DependencyUnavailable(_)));
    }

    /// Token resolution works, the subscriber lookup is down.
    struct DegradedSubscriptions {
        inner: StaticDirectory,
    }

    #[async_trait]
    impl IdentityProvider for DegradedSubscriptions {
        async fn resolve_token(&self, token: &str) -> Result<UserProfile, IdentityError> {
            self.inner.resolve_token(token).await
        }

        async fn subscribers_for_category(
            &self,
            _category: &str,
        ) -> Result<Vec<CategorySubscriber>, IdentityError> {
            Err(IdentityError::Unavailable("timed out".into()))
        }
    }

    #[tokio::test]
    async fn subscriber_outage_degrades_to_empty_recipient_list() {
        let inner = StaticDirectory::new();
        employer(&inner, "emp");
        let broker = Arc::new(InMemoryBroker::new());
        let job_posted = broker.bind(routing_keys::JOB_POSTED);
        let service = JobService::new(
            Arc::new(InMemoryJobStore::new()),
            Arc::new(DegradedSubscriptions { inner }),
            EventPublisher::new(broker),
        );

        let job = service.create_job(valid_draft(), "emp").await.unwrap();

        let delivery = job_posted
            .recv_timeout(Duration::from_millis(200))
            .expect("event should still be published");
        let event: hireboard_events::JobPosted = delivery.envelope.decode().unwrap();
        assert_eq!(event.job_id, job.id);
        assert!(event.recipient_emails.is_empty());
    }

    #[tokio::test]
    async fn delete_twice_is_idempotent() {
        let h = harness();
        employer(&h.directory, "emp");
        let job = h.service.create_job(valid_draft(), "emp").await.unwrap();

        h.service.delete_job(job.id, "emp").await.unwrap();
        h.service.delete_job(job.id, "emp").await.unwrap();

        let fetched = h.service.get_job(job.id).await.unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn update_and_delete_require_ownership_not_role() {
        let h = harness();
        employer(&h.directory, "emp-a");
        employer(&h.directory, "emp-b");

        let job = h.service.create_job(valid_draft(), "emp-a").await.unwrap();

        let err = h
            .service
            .update_job(job.id, valid_draft(), "emp-b")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));

        let err = h.service.delete_job(job.id, "emp-b").await.unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
    }

    #[tokio::test]
    async fn update_missing_job_is_not_found() {
        let h = harness();
        employer(&h.directory, "emp");

        let err = h
            .service
            .update_job(JobId::new(), valid_draft(), "emp")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn my_jobs_is_employer_only_and_scoped_to_the_caller() {
        let h = harness();
        employer(&h.directory, "emp-a");
        employer(&h.directory, "emp-b");
        seeker(&h.directory, "peter");

        h.service.create_job(valid_draft(), "emp-a").await.unwrap();
        h.service.create_job(valid_draft(), "emp-a").await.unwrap();
        h.service.create_job(valid_draft(), "emp-b").await.unwrap();

        assert_eq!(h.service.get_my_jobs("emp-a").await.unwrap().len(), 2);
        assert!(matches!(
            h.service.get_my_jobs("peter").await.unwrap_err(),
            DomainError::Authorization(_)
        ));
    }
}
