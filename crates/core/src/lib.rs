//! Core domain types, errors, and constants for `envlift`.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate in the
//!   workspace. Each variant corresponds to one failure class the CLI reports.
//! - **`types`**: the option whitelist, resolution provenance and the decoded
//!   secrets map.
//! - **`constants`**: environment variable names, defaults and wire-level header values.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
