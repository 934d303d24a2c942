//! Core building blocks shared by every command
//!
//! - **config**: progress.toml parsing and validation
//! - **error**: error types with contextual help and exit codes
//! - **format**: JSON/YAML document reading and rendering

pub mod config;
pub mod error;
pub mod format;
