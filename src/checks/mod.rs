//! Advisory warnings
//!
//! Every rule implements the `Check` trait and is registered in
//! `create_default_engine()`. Rules annotate records; they never change the
//! derived state.
//!
//! # Built-in Rules
//!
//! - **W001 published-version-mismatch**: published tag version differs from the plan
//! - **W002 orphaned-artifacts**: artifacts exist although no release is planned
//! - **W003 api-renamed**: API has a configured successor name
//! - **W004 draft-without-snapshot**: draft release without a snapshot branch
//! - **W005 missing-target-version**: planned release without a target version

mod draft_without_snapshot;
mod missing_version;
mod orphaned;
mod published_version;
mod renamed;
mod runner;
mod trait_def;

pub use runner::{WarningEngine, create_default_engine};
pub use trait_def::{Check, WarningContext};
