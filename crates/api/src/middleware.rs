//! Bearer-token extraction for authenticated routes.
//!
//! The middleware only enforces that a bearer token is present; whether it
//! is valid is the identity collaborator's call, made by the service layer
//! (an invalid token surfaces as 401 from there).

use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::app::errors::error_response;

/// The raw bearer credential, passed through to the identity service.
#[derive(Debug, Clone)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn require_bearer(mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    match extract_bearer(req.headers()) {
        Some(token) => {
            req.extensions_mut().insert(AuthToken(token));
            next.run(req).await
        }
        None => error_response(
            StatusCode::UNAUTHORIZED,
            "Authentication Required",
            "missing or malformed Authorization header",
            &path,
        ),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
