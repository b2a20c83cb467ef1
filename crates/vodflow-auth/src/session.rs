//! Session token models.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identity whose session the tokens belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct IdentityId(pub String);

impl IdentityId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Access/refresh token pair with the access token's expiry.
///
/// Tokens are opaque here; issuance and verification live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SessionTokens {
    /// Short-lived access token presented on requests
    pub access_token: String,
    /// Long-lived token exchanged for a new pair
    pub refresh_token: String,
    /// When the access token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl SessionTokens {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// Whether the access token expires within `margin` from now.
    ///
    /// The margin keeps a token from expiring mid-request.
    pub fn expires_within(&self, margin: Duration) -> bool {
        let margin = ChronoDuration::from_std(margin).unwrap_or_else(|_| ChronoDuration::zero());
        Utc::now() + margin >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_outside_margin() {
        let tokens = SessionTokens::new("a", "r", Utc::now() + ChronoDuration::seconds(300));
        assert!(!tokens.expires_within(Duration::from_secs(10)));
    }

    #[test]
    fn test_near_expiry_inside_margin() {
        let tokens = SessionTokens::new("a", "r", Utc::now() + ChronoDuration::seconds(5));
        assert!(tokens.expires_within(Duration::from_secs(10)));
    }

    #[test]
    fn test_expired_token_inside_any_margin() {
        let tokens = SessionTokens::new("a", "r", Utc::now() - ChronoDuration::seconds(1));
        assert!(tokens.expires_within(Duration::ZERO));
    }
}
