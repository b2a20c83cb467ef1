//! Session token refresh with single-flight coalescing.
//!
//! This crate provides:
//! - `SessionTokens` and the expiry-margin check
//! - The `CredentialTransport` contract with an HTTP implementation
//! - `RefreshCoalescer`: one in-flight refresh per identity

pub mod coalescer;
pub mod error;
pub mod session;
pub mod transport;

pub use coalescer::{RefreshCoalescer, DEFAULT_EXPIRY_MARGIN};
pub use error::{AuthError, AuthResult};
pub use session::{IdentityId, SessionTokens};
pub use transport::{CredentialTransport, HttpCredentialTransport};
