//! Runtime configuration of the pipeline.
//!
//! These are the validated values the processors run with. Reading them
//! from a file is handled by the server crate. Every `Default` matches the
//! behaviour of a stock deployment.

mod aggregator;
mod collector;
mod fetch;

pub use aggregator::AggregatorConfig;
pub use collector::CollectorConfig;
pub use fetch::FetchConfig;
