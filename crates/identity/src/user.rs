//! User representations served by the identity collaborator.

use serde::{Deserialize, Serialize};

use hireboard_core::UserId;

/// Platform role, as reported by the identity service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular job seeker.
    User,
    /// Company account posting jobs.
    Employer,
    /// Platform administrator.
    Admin,
}

/// The resolved identity behind a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl UserProfile {
    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }
}

/// A user subscribed to notifications for a job category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySubscriber {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}
