//! Postgres-backed stores.
//!
//! The `(job_id, user_id)` uniqueness invariant is enforced by a database
//! constraint here; error code 23505 on insert is translated to
//! [`StoreError::DuplicateApplication`] so the service layer sees the same
//! contract as with the in-memory store.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use hireboard_core::{ApplicationId, JobId, Page, PageRequest, SortDir, SortKey, UserId};

use crate::application::{ApplicationStatus, JobApplication};
use crate::job::{ExperienceLevel, Job, JobCategory, JobType};
use crate::store::{ApplicationStore, JobStore, StoreError};

/// Create the tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            company_name TEXT NOT NULL,
            location TEXT NOT NULL,
            job_type TEXT NOT NULL,
            category TEXT NOT NULL,
            experience_level TEXT NOT NULL,
            salary_min DOUBLE PRECISION,
            salary_max DOUBLE PRECISION,
            skills_required TEXT,
            posted_by_user_id UUID NOT NULL,
            posted_by_username TEXT NOT NULL,
            posted_by_email TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            application_deadline TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(db_error)?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_jobs_active_created ON jobs (is_active, created_at DESC)",
    )
    .execute(pool)
    .await
    .map_err(db_error)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_applications (
            id UUID PRIMARY KEY,
            job_id UUID NOT NULL,
            user_id UUID NOT NULL,
            username TEXT NOT NULL,
            user_email TEXT NOT NULL,
            cover_letter TEXT NOT NULL,
            resume_url TEXT,
            status TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            CONSTRAINT uq_job_applications_job_user UNIQUE (job_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(db_error)?;

    Ok(())
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn unique_violation(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return StoreError::DuplicateApplication;
        }
    }
    db_error(e)
}

fn sort_column(key: SortKey) -> &'static str {
    match key {
        SortKey::CreatedAt => "created_at",
        SortKey::UpdatedAt => "updated_at",
        SortKey::Title => "title",
        SortKey::CompanyName => "company_name",
        SortKey::SalaryMin => "salary_min",
        SortKey::SalaryMax => "salary_max",
    }
}

fn sort_direction(dir: SortDir) -> &'static str {
    match dir {
        SortDir::Asc => "ASC",
        SortDir::Desc => "DESC",
    }
}

fn job_from_row(row: &PgRow) -> Result<Job, StoreError> {
    let job_type: String = row.try_get("job_type").map_err(db_error)?;
    let category: String = row.try_get("category").map_err(db_error)?;
    let experience_level: String = row.try_get("experience_level").map_err(db_error)?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get::<Uuid, _>("id").map_err(db_error)?),
        title: row.try_get("title").map_err(db_error)?,
        description: row.try_get("description").map_err(db_error)?,
        company_name: row.try_get("company_name").map_err(db_error)?,
        location: row.try_get("location").map_err(db_error)?,
        job_type: job_type
            .parse::<JobType>()
            .map_err(|e| StoreError::Backend(format!("corrupt job row: {e}")))?,
        category: category
            .parse::<JobCategory>()
            .map_err(|e| StoreError::Backend(format!("corrupt job row: {e}")))?,
        experience_level: experience_level
            .parse::<ExperienceLevel>()
            .map_err(|e| StoreError::Backend(format!("corrupt job row: {e}")))?,
        salary_min: row.try_get("salary_min").map_err(db_error)?,
        salary_max: row.try_get("salary_max").map_err(db_error)?,
        skills_required: row.try_get("skills_required").map_err(db_error)?,
        posted_by_user_id: UserId::from_uuid(
            row.try_get::<Uuid, _>("posted_by_user_id").map_err(db_error)?,
        ),
        posted_by_username: row.try_get("posted_by_username").map_err(db_error)?,
        posted_by_email: row.try_get("posted_by_email").map_err(db_error)?,
        is_active: row.try_get("is_active").map_err(db_error)?,
        application_deadline: row.try_get("application_deadline").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

fn application_from_row(row: &PgRow) -> Result<JobApplication, StoreError> {
    let status: String = row.try_get("status").map_err(db_error)?;

    Ok(JobApplication {
        id: ApplicationId::from_uuid(row.try_get::<Uuid, _>("id").map_err(db_error)?),
        job_id: JobId::from_uuid(row.try_get::<Uuid, _>("job_id").map_err(db_error)?),
        user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id").map_err(db_error)?),
        username: row.try_get("username").map_err(db_error)?,
        user_email: row.try_get("user_email").map_err(db_error)?,
        cover_letter: row.try_get("cover_letter").map_err(db_error)?,
        resume_url: row.try_get("resume_url").map_err(db_error)?,
        status: status
            .parse::<ApplicationStatus>()
            .map_err(|e| StoreError::Backend(format!("corrupt application row: {e}")))?,
        applied_at: row.try_get("applied_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

fn collect_jobs(rows: &[PgRow]) -> Result<Vec<Job>, StoreError> {
    rows.iter().map(job_from_row).collect()
}

fn page_of(items: Vec<Job>, total: i64, page: PageRequest) -> Page<Job> {
    let total_elements = total.max(0) as usize;
    Page {
        items,
        page: page.page(),
        size: page.size(),
        total_elements,
        total_pages: total_elements.div_ceil(page.size()),
    }
}

const JOB_COLUMNS: &str = "id, title, description, company_name, location, job_type, category, \
     experience_level, salary_min, salary_max, skills_required, posted_by_user_id, \
     posted_by_username, posted_by_email, is_active, application_deadline, created_at, updated_at";

/// Postgres job store.
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, description, company_name, location, job_type,
                category, experience_level, salary_min, salary_max, skills_required,
                posted_by_user_id, posted_by_username, posted_by_email, is_active,
                application_deadline, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company_name)
        .bind(&job.location)
        .bind(job.job_type.as_str())
        .bind(job.category.as_str())
        .bind(job.experience_level.as_str())
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.skills_required)
        .bind(job.posted_by_user_id.as_uuid())
        .bind(&job.posted_by_username)
        .bind(&job.posted_by_email)
        .bind(job.is_active)
        .bind(job.application_deadline)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn update(&self, job: &Job) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET title = $2, description = $3, company_name = $4, location = $5,
                job_type = $6, category = $7, experience_level = $8, salary_min = $9,
                salary_max = $10, skills_required = $11, is_active = $12,
                application_deadline = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.company_name)
        .bind(&job.location)
        .bind(job.job_type.as_str())
        .bind(job.category.as_str())
        .bind(job.experience_level.as_str())
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(&job.skills_required)
        .bind(job.is_active)
        .bind(job.application_deadline)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn list_active(
        &self,
        page: PageRequest,
        key: SortKey,
        dir: SortDir,
    ) -> Result<Page<Job>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE is_active = TRUE \
             ORDER BY {} {}, id ASC LIMIT $1 OFFSET $2",
            sort_column(key),
            sort_direction(dir),
        );
        let rows = sqlx::query(&sql)
            .bind(page.size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let items = collect_jobs(&rows)?;

        let total: i64 = sqlx::query("SELECT COUNT(*) FROM jobs WHERE is_active = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?
            .try_get(0)
            .map_err(db_error)?;

        Ok(page_of(items, total, page))
    }

    async fn search_active(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let pattern = format!("%{keyword}%");

        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE is_active = TRUE \
             AND (title ILIKE $1 OR company_name ILIKE $1 OR location ILIKE $1) \
             ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(&pattern)
            .bind(page.size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let items = collect_jobs(&rows)?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) FROM jobs WHERE is_active = TRUE \
             AND (title ILIKE $1 OR company_name ILIKE $1 OR location ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?
        .try_get(0)
        .map_err(db_error)?;

        Ok(page_of(items, total, page))
    }

    async fn list_active_by_category(
        &self,
        category: JobCategory,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE is_active = TRUE AND category = $1 \
             ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(category.as_str())
            .bind(page.size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let items = collect_jobs(&rows)?;

        let total: i64 =
            sqlx::query("SELECT COUNT(*) FROM jobs WHERE is_active = TRUE AND category = $1")
                .bind(category.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?
                .try_get(0)
                .map_err(db_error)?;

        Ok(page_of(items, total, page))
    }

    async fn list_active_by_type(
        &self,
        job_type: JobType,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE is_active = TRUE AND job_type = $1 \
             ORDER BY created_at DESC, id ASC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(job_type.as_str())
            .bind(page.size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let items = collect_jobs(&rows)?;

        let total: i64 =
            sqlx::query("SELECT COUNT(*) FROM jobs WHERE is_active = TRUE AND job_type = $1")
                .bind(job_type.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?
                .try_get(0)
                .map_err(db_error)?;

        Ok(page_of(items, total, page))
    }

    async fn list_active_by_salary_range(
        &self,
        min: f64,
        max: f64,
        page: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE is_active = TRUE \
             AND salary_min >= $1 AND salary_max <= $2 \
             ORDER BY salary_min ASC, id ASC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query(&sql)
            .bind(min)
            .bind(max)
            .bind(page.size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let items = collect_jobs(&rows)?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) FROM jobs WHERE is_active = TRUE \
             AND salary_min >= $1 AND salary_max <= $2",
        )
        .bind(min)
        .bind(max)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?
        .try_get(0)
        .map_err(db_error)?;

        Ok(page_of(items, total, page))
    }

    async fn list_by_poster(&self, poster: UserId) -> Result<Vec<Job>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE posted_by_user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(poster.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        collect_jobs(&rows)
    }
}

const APPLICATION_COLUMNS: &str =
    "id, job_id, user_id, username, user_email, cover_letter, resume_url, status, applied_at, \
     updated_at";

/// Postgres application store.
#[derive(Debug, Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, application: JobApplication) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO job_applications (id, job_id, user_id, username, user_email,
                cover_letter, resume_url, status, applied_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.job_id.as_uuid())
        .bind(application.user_id.as_uuid())
        .bind(&application.username)
        .bind(&application.user_email)
        .bind(&application.cover_letter)
        .bind(&application.resume_url)
        .bind(application.status.as_str())
        .bind(application.applied_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_violation)?;

        Ok(())
    }

    async fn update(&self, application: &JobApplication) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE job_applications SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(application.id.as_uuid())
                .bind(application.status.as_str())
                .bind(application.updated_at)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<JobApplication>, StoreError> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(application_from_row).transpose()
    }

    async fn find_by_job_and_user(
        &self,
        job_id: JobId,
        user_id: UserId,
    ) -> Result<Option<JobApplication>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE job_id = $1 AND user_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(job_id.as_uuid())
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(application_from_row).transpose()
    }

    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE job_id = $1 \
             ORDER BY applied_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(job_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(application_from_row).collect()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<JobApplication>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE user_id = $1 \
             ORDER BY applied_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(application_from_row).collect()
    }

    async fn count_for_job(&self, job_id: JobId) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) FROM job_applications WHERE job_id = $1")
            .bind(job_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let count: i64 = row.try_get(0).map_err(db_error)?;
        Ok(count.max(0) as u64)
    }
}
