//! Single-flight session refresh.
//!
//! Many requests can observe the same near-expiry token at once. Letting
//! each start its own refresh burns the refresh token (rotation invalidates
//! the old one) and hammers the auth service. The coalescer keeps one
//! in-flight refresh per identity; racing callers await the same shared
//! future and all receive the same resulting pair.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::AuthResult;
use crate::session::{IdentityId, SessionTokens};
use crate::transport::CredentialTransport;

/// Refresh margin: a token expiring within this window is refreshed.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(10);

type SharedRefresh = Shared<BoxFuture<'static, AuthResult<SessionTokens>>>;

/// Deduplicates concurrent refresh attempts per identity.
pub struct RefreshCoalescer {
    transport: Arc<dyn CredentialTransport>,
    in_flight: Mutex<HashMap<IdentityId, SharedRefresh>>,
    expiry_margin: Duration,
}

impl RefreshCoalescer {
    pub fn new(transport: Arc<dyn CredentialTransport>) -> Self {
        Self::with_margin(transport, DEFAULT_EXPIRY_MARGIN)
    }

    pub fn with_margin(transport: Arc<dyn CredentialTransport>, expiry_margin: Duration) -> Self {
        Self {
            transport,
            in_flight: Mutex::new(HashMap::new()),
            expiry_margin,
        }
    }

    /// Whether `tokens` are close enough to expiry to need a refresh.
    pub fn needs_refresh(&self, tokens: &SessionTokens) -> bool {
        tokens.expires_within(self.expiry_margin)
    }

    /// Return `current` untouched when still fresh, otherwise join or start
    /// a refresh for `identity`.
    pub async fn ensure_fresh(
        &self,
        identity: &IdentityId,
        current: &SessionTokens,
    ) -> AuthResult<SessionTokens> {
        if !self.needs_refresh(current) {
            return Ok(current.clone());
        }
        self.refresh(identity, current).await
    }

    /// Join the in-flight refresh for `identity`, or start one.
    ///
    /// The in-flight marker is removed once the operation settles, success
    /// or failure alike, so a failed attempt never blocks the next one. On
    /// `AuthFailure` the caller must fall back to re-authentication; the
    /// coalescer does not retry.
    pub async fn refresh(
        &self,
        identity: &IdentityId,
        current: &SessionTokens,
    ) -> AuthResult<SessionTokens> {
        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(identity) {
                Some(existing) => {
                    debug!(identity = %identity, "Joining in-flight session refresh");
                    existing.clone()
                }
                None => {
                    let transport = Arc::clone(&self.transport);
                    let refresh_token = current.refresh_token.clone();
                    let access_token = current.access_token.clone();
                    let flight: SharedRefresh = async move {
                        transport.refresh(&refresh_token, &access_token).await
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(identity.clone(), flight.clone());
                    debug!(identity = %identity, "Starting session refresh");
                    flight
                }
            }
        };

        let result = flight.clone().await;

        // Clear the marker unconditionally, but only if it is still ours: a
        // refresh started after ours settled must not be evicted.
        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight
                .get(identity)
                .is_some_and(|existing| existing.ptr_eq(&flight))
            {
                in_flight.remove(identity);
            }
        }

        if let Err(e) = &result {
            warn!(identity = %identity, "Session refresh failed: {}", e);
        }
        result
    }

    /// Number of identities with a refresh in flight (test helper).
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}
