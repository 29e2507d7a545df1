//! Application routes.

use std::sync::Arc;

use axum::extract::{Extension, OriginalUri, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};

use hireboard_core::{ApplicationId, JobId};
use hireboard_jobs::{ApplicationDraft, ApplicationStatus};

use crate::app::dto::{self, ApplicationResponse, StatusQuery};
use crate::app::errors::ApiError;
use crate::app::state::AppState;
use crate::middleware::AuthToken;

pub fn router() -> Router {
    Router::new()
        .route("/jobs/:id/apply", post(apply_for_job))
        .route("/jobs/:id/applications", get(applications_for_job))
        .route("/jobs/applications/my-applications", get(my_applications))
        .route("/jobs/applications/:id/status", patch(update_status))
        .route("/jobs/:id/applications/withdraw", delete(withdraw))
}

pub async fn apply_for_job(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(draft): Json<ApplicationDraft>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let job_id: JobId = id.parse().map_err(&reject)?;
    let application = state
        .applications
        .apply_for_job(job_id, draft, token.as_str())
        .await
        .map_err(&reject)?;
    let body = dto::application_to_response(&state, application)
        .await
        .map_err(&reject)?;

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn applications_for_job(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let job_id: JobId = id.parse().map_err(&reject)?;
    let (job, applications) = state
        .applications
        .get_applications_for_job(job_id, token.as_str())
        .await
        .map_err(&reject)?;

    let body: Vec<ApplicationResponse> = applications
        .into_iter()
        .map(|application| ApplicationResponse::from_parts(application, Some(&job)))
        .collect();

    Ok(Json(body).into_response())
}

pub async fn my_applications(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let records = state
        .applications
        .get_my_applications(token.as_str())
        .await
        .map_err(&reject)?;

    let body: Vec<ApplicationResponse> = records
        .into_iter()
        .map(|record| ApplicationResponse::from_parts(record.application, record.job.as_ref()))
        .collect();

    Ok(Json(body).into_response())
}

pub async fn update_status(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Query(params): Query<StatusQuery>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let application_id: ApplicationId = id.parse().map_err(&reject)?;
    let status: ApplicationStatus = params.status.parse().map_err(&reject)?;

    let application = state
        .applications
        .update_application_status(application_id, status, token.as_str())
        .await
        .map_err(&reject)?;
    let body = dto::application_to_response(&state, application)
        .await
        .map_err(&reject)?;

    Ok(Json(body).into_response())
}

pub async fn withdraw(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<AuthToken>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let reject = |e| ApiError::from_domain(e, uri.path());

    let job_id: JobId = id.parse().map_err(&reject)?;
    let application = state
        .applications
        .withdraw_application(job_id, token.as_str())
        .await
        .map_err(&reject)?;
    let body = dto::application_to_response(&state, application)
        .await
        .map_err(&reject)?;

    Ok(Json(body).into_response())
}
