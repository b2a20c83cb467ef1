//! Credential transport contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::session::SessionTokens;

/// Exchanges a refresh token for a new token pair.
///
/// Implementations talk to the auth service; the coalescer treats every call
/// as a potentially failing external operation.
#[async_trait]
pub trait CredentialTransport: Send + Sync {
    async fn refresh(&self, refresh_token: &str, access_token: &str) -> AuthResult<SessionTokens>;
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
    access_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

/// HTTP credential transport against the auth service.
pub struct HttpCredentialTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCredentialTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CredentialTransport for HttpCredentialTransport {
    async fn refresh(&self, refresh_token: &str, access_token: &str) -> AuthResult<SessionTokens> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest {
                refresh_token,
                access_token,
            })
            .send()
            .await
            .map_err(|e| AuthError::transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::auth_failure(format!(
                "refresh token rejected ({})",
                status
            )));
        }
        if !status.is_success() {
            return Err(AuthError::transport(format!(
                "refresh endpoint returned {}",
                status
            )));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::transport(e.to_string()))?;

        debug!("Refreshed session tokens, expire at {}", body.expires_at);
        Ok(SessionTokens::new(
            body.access_token,
            body.refresh_token,
            body.expires_at,
        ))
    }
}
