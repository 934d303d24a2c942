//! Data model: plan entries, artifacts, states, records and the output document

pub mod artifacts;
pub mod document;
pub mod plan;
pub mod record;
pub mod state;
