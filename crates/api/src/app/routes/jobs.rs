//! Job posting routes.

use std::sync::Arc;

use axum::extract::{Extension, OriginalUri, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use hireboard_core::JobId;
use hireboard_jobs::{JobCategory, JobDraft, JobType};

use crate::app::dto::{self, PageQuery, SalaryRangeQuery, SearchQuery};
use crate::app::errors::ApiError;
use crate::app::state::AppState;
use crate::middleware::AuthToken;

pub fn public_router() -> Router {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/search", get(search_jobs))
        .route("/jobs/category/:category", get(jobs_by_category))
        .route("/jobs/type/:job_type", get(jobs_by_type))
        .route("/jobs/salary-range", get(jobs_by_salary_range))
        .route("/jobs/:id", get(get_job))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/my-jobs", get(my_jobs))
        .route("/jobs/:id", put(update_job).delete(delete_job))
}

pub async fn create_job(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
    Json(draft): Json<JobDraft>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let job = state
        .jobs
        .create_job(draft, token.as_str())
        .await
        .map_err(&reject)?;
    let body = dto::job_to_response(&state, job).await.map_err(&reject)?;

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn get_job(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let id: JobId = id.parse().map_err(&reject)?;
    let job = state.jobs.get_job(id).await.map_err(&reject)?;
    let body = dto::job_to_response(&state, job).await.map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn list_jobs(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let (page, key, dir) = params.resolve().map_err(&reject)?;
    let jobs = state
        .jobs
        .get_active_jobs(page, key, dir)
        .await
        .map_err(&reject)?;
    let body = dto::job_page_to_response(&state, jobs)
        .await
        .map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn search_jobs(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let page = params.page_request().map_err(&reject)?;
    let jobs = state
        .jobs
        .search_jobs(&params.keyword, page)
        .await
        .map_err(&reject)?;
    let body = dto::job_page_to_response(&state, jobs)
        .await
        .map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn jobs_by_category(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(category): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let category: JobCategory = category.parse().map_err(&reject)?;
    let page = params.page_request().map_err(&reject)?;
    let jobs = state
        .jobs
        .get_jobs_by_category(category, page)
        .await
        .map_err(&reject)?;
    let body = dto::job_page_to_response(&state, jobs)
        .await
        .map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn jobs_by_type(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(job_type): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let job_type: JobType = job_type.parse().map_err(&reject)?;
    let page = params.page_request().map_err(&reject)?;
    let jobs = state
        .jobs
        .get_jobs_by_type(job_type, page)
        .await
        .map_err(&reject)?;
    let body = dto::job_page_to_response(&state, jobs)
        .await
        .map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn jobs_by_salary_range(
    Extension(state): Extension<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SalaryRangeQuery>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let page = params.page_request().map_err(&reject)?;
    let jobs = state
        .jobs
        .get_jobs_by_salary_range(params.min_salary, params.max_salary, page)
        .await
        .map_err(&reject)?;
    let body = dto::job_page_to_response(&state, jobs)
        .await
        .map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn my_jobs(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let jobs = state
        .jobs
        .get_my_jobs(token.as_str())
        .await
        .map_err(&reject)?;

    let mut body = Vec::with_capacity(jobs.len());
    for job in jobs {
        body.push(dto::job_to_response(&state, job).await.map_err(&reject)?);
    }

    Ok(Json(body).into_response())
}

pub async fn update_job(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(draft): Json<JobDraft>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let id: JobId = id.parse().map_err(&reject)?;
    let job = state
        .jobs
        .update_job(id, draft, token.as_str())
        .await
        .map_err(&reject)?;
    let body = dto::job_to_response(&state, job).await.map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn delete_job(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let id: JobId = id.parse().map_err(&reject)?;
    state
        .jobs
        .delete_job(id, token.as_str())
        .await
        .map_err(&reject)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
