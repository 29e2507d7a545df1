//! HTTP client for the identity service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::provider::{IdentityError, IdentityProvider};
use crate::user::{CategorySubscriber, UserProfile};

/// Identity service client with a bounded per-request timeout.
///
/// The identity lookup is a blocking dependency of every authenticated
/// request, so a hung identity service must surface as `Unavailable` quickly
/// rather than stalling the caller.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityClient {
    async fn resolve_token(&self, token: &str) -> Result<UserProfile, IdentityError> {
        let response = self
            .client
            .get(self.url("/api/auth/me"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<UserProfile>()
                .await
                .map_err(|e| IdentityError::Unavailable(format!("malformed profile: {e}"))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IdentityError::InvalidToken),
            status => Err(IdentityError::Unavailable(format!(
                "identity service returned {status}"
            ))),
        }
    }

    async fn subscribers_for_category(
        &self,
        category: &str,
    ) -> Result<Vec<CategorySubscriber>, IdentityError> {
        let response = self
            .client
            .get(self.url("/api/preferences/subscribers"))
            .query(&[("category", category)])
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<Vec<CategorySubscriber>>()
                .await
                .map_err(|e| IdentityError::Unavailable(format!("malformed subscriber list: {e}"))),
            status => Err(IdentityError::Unavailable(format!(
                "identity service returned {status}"
            ))),
        }
    }
}
