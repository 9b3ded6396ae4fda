//! Secret delivery for envlift
//!
//! Fetches secrets for a scope (falling back to a local snapshot when the
//! service cannot be reached), merges them into the process environment, and
//! runs the requested command with the result.

pub mod exec;
pub mod fallback;
pub mod fetch;
pub mod inject;

pub use exec::execute_command;
pub use fallback::FallbackCache;
pub use fetch::{
    ApiSecretsSource, FetchOptions, FetchState, FetchedSecrets, SecretFetcher, SecretsOrigin,
    SecretsSource,
};
pub use inject::merge_environment;
