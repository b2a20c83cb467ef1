//! Auth error types.

use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors from the credential refresh path.
///
/// `Clone` is required so a coalesced refresh can hand the same failure to
/// every waiting caller; transport errors are therefore carried as strings.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The refresh token was rejected (revoked or expired). The caller must
    /// force re-authentication; retrying will not help.
    #[error("Refresh rejected: {0}")]
    AuthFailure(String),

    /// Network or server failure reaching the credential endpoint.
    #[error("Credential transport error: {0}")]
    Transport(String),
}

impl AuthError {
    pub fn auth_failure(msg: impl Into<String>) -> Self {
        Self::AuthFailure(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// True when the session is unrecoverable and the user must log in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, AuthError::AuthFailure(_))
    }
}
