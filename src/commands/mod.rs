//! CLI commands for release-progress
//!
//! - **collect**: derive states, milestones and warnings for a master schedule
//! - **validate**: check an existing progress document against the schema

pub mod collect;
pub mod validate;

pub use collect::{CollectArgs, run_collect};
pub use validate::run_validate;
