//! Shared utilities for envlift
//!
//! This crate provides the file, path, retry and logging helpers used
//! throughout the envlift workspace.

pub mod atomic_file;
pub mod file_lock;
pub mod resilience;
pub mod tracing;
pub mod xdg;

pub use atomic_file::*;
pub use file_lock::*;
pub use resilience::*;
pub use xdg::*;
