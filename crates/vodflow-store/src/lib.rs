//! Durable video store contract.
//!
//! This crate provides:
//! - The `VideoStore` trait consumed by the queue, recovery sync, and worker
//! - `InMemoryVideoStore` for tests and local wiring

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{InMemoryVideoStore, VideoStore};
