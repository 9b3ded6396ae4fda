//! HTTP access to the envlift API
//!
//! [`ApiClient`] wraps a `reqwest` client with the fixed identification
//! headers, an optional per-request timeout, and the bounded retry policy from
//! `envlift-utils`. Response bodies are decoded with the typed schemas in
//! [`schema`].

pub mod client;
pub mod schema;
pub mod secrets;

pub use client::{ApiClient, ApiRequest, ApiResponse, ClientConfig};
pub use schema::{parse_secrets, ErrorResponse, SecretValue};
