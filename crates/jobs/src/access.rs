//! Caller resolution and error translation shared by the services.

use hireboard_core::{DomainError, DomainResult};
use hireboard_identity::{IdentityError, IdentityProvider, UserProfile};

use crate::store::StoreError;

/// Resolve the bearer token behind a request, or fail the request.
///
/// An unreachable identity service is a `DependencyUnavailable`, not an
/// authentication failure: the caller may well hold a valid credential.
pub(crate) async fn resolve_caller(
    identity: &dyn IdentityProvider,
    token: &str,
) -> DomainResult<UserProfile> {
    identity.resolve_token(token).await.map_err(|e| match e {
        IdentityError::InvalidToken => DomainError::authentication("invalid or expired credential"),
        IdentityError::Unavailable(msg) => {
            DomainError::unavailable(format!("identity service: {msg}"))
        }
    })
}

pub(crate) fn map_store_error(e: StoreError) -> DomainError {
    match e {
        StoreError::DuplicateApplication => {
            DomainError::conflict("an application for this job and user already exists")
        }
        StoreError::NotFound => DomainError::not_found("record not found"),
        StoreError::Backend(msg) => DomainError::internal(msg),
    }
}
