//! Release derivation: tag matching, state rules and milestones

pub mod milestones;
pub mod state;
pub mod tags;
