pub mod counters;
pub mod snapshot;

pub use counters::PipelineCounters;
pub use snapshot::{RunSnapshot, RunTimer};
