//! Identity collaborator contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::user::{CategorySubscriber, UserProfile};

/// Failure modes of the identity collaborator.
///
/// `Unavailable` is recoverable and must not be conflated with a bad
/// credential: callers decide per call site whether to fail or degrade.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid or expired credential")]
    InvalidToken,

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous lookups against the identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to the user behind it.
    async fn resolve_token(&self, token: &str) -> Result<UserProfile, IdentityError>;

    /// Users who subscribed to notifications for a job category.
    async fn subscribers_for_category(
        &self,
        category: &str,
    ) -> Result<Vec<CategorySubscriber>, IdentityError>;
}
