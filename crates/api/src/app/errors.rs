//! Consistent error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use hireboard_core::DomainError;

/// A domain error bound to the request path, ready to render as
/// `{status, error, message, path}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    title: &'static str,
    message: String,
    path: String,
}

impl ApiError {
    pub fn from_domain(err: DomainError, path: &str) -> Self {
        let (status, title) = match &err {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            DomainError::Authentication(_) => (StatusCode::UNAUTHORIZED, "Authentication Required"),
            DomainError::Authorization(_) => (StatusCode::FORBIDDEN, "Access Denied"),
            DomainError::JobClosed(_) => (StatusCode::FORBIDDEN, "Job Closed"),
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            DomainError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            DomainError::DependencyUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Dependency Unavailable")
            }
            DomainError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };

        Self {
            status,
            title,
            message: err.to_string(),
            path: path.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status, self.title, self.message, &self.path)
    }
}

pub fn error_response(
    status: StatusCode,
    title: &str,
    message: impl Into<String>,
    path: &str,
) -> Response {
    (
        status,
        Json(json!({
            "status": status.as_u16(),
            "error": title,
            "message": message.into(),
            "path": path,
        })),
    )
        .into_response()
}
