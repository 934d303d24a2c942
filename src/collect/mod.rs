//! Progress collection and output validation

mod collector;
pub mod schema;

pub use collector::Collector;
