//! In-memory identity directory for dev and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::provider::{IdentityError, IdentityProvider};
use crate::user::{CategorySubscriber, UserProfile};

/// Fixed token -> user mapping plus category subscriptions.
///
/// Stands in for the identity service where spinning one up is not worth it.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    users: RwLock<HashMap<String, UserProfile>>,
    subscriptions: RwLock<HashMap<String, Vec<CategorySubscriber>>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user reachable via `token`.
    pub fn insert_user(&self, token: impl Into<String>, profile: UserProfile) {
        let mut users = self.users.write().unwrap_or_else(|p| p.into_inner());
        users.insert(token.into(), profile);
    }

    /// Subscribe a user to a category's job-posted notifications.
    pub fn subscribe(&self, category: impl Into<String>, subscriber: CategorySubscriber) {
        let mut subs = self.subscriptions.write().unwrap_or_else(|p| p.into_inner());
        subs.entry(category.into()).or_default().push(subscriber);
    }
}

#[async_trait]
impl IdentityProvider for StaticDirectory {
    async fn resolve_token(&self, token: &str) -> Result<UserProfile, IdentityError> {
        let users = self.users.read().unwrap_or_else(|p| p.into_inner());
        users.get(token).cloned().ok_or(IdentityError::InvalidToken)
    }

    async fn subscribers_for_category(
        &self,
        category: &str,
    ) -> Result<Vec<CategorySubscriber>, IdentityError> {
        let subs = self.subscriptions.read().unwrap_or_else(|p| p.into_inner());
        Ok(subs.get(category).cloned().unwrap_or_default())
    }
}
