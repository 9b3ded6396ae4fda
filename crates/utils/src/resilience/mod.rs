//! Resilience patterns for talking to flaky remote services.
//!
//! ## Key Components
//!
//! - **`config`**: `RetryPolicy` and the HTTP status classifier.
//! - **`retry`**: the bounded, strictly sequential retry loop.

pub mod config;
pub mod retry;

pub use config::{RetryPolicy, StatusClass};
pub use retry::{retry, Attempt, RetryOutcome};
