//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error taxonomy.
///
/// Variants map 1:1 onto HTTP statuses at the API boundary, but the mapping
/// itself lives in the api crate. Infrastructure errors are translated into
/// one of these at the service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing or invalid credential.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Wrong role, or not the owner of the resource.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// The job is no longer accepting applications.
    ///
    /// Authorization-class: surfaced as 403, but kept distinct so callers
    /// can tell "closed" from "not yours".
    #[error("job closed: {0}")]
    JobClosed(String),

    /// Unknown job or application id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate application, or a state that forbids the transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A required collaborator (identity service, broker) is unreachable.
    /// Recoverable; must not corrupt state.
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Catch-all for unexpected internal failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn job_closed(msg: impl Into<String>) -> Self {
        Self::JobClosed(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::DependencyUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
