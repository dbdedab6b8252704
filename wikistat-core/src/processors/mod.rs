//! Processors of the ingestion pipeline.
//!
//! - `Collector`: Subscribes to the event source, pushes `ClassifiedEvent`s
//!   into the event queue
//! - `Aggregator`: Drains the event queue once per cycle, persists per-language
//!   tallies
//! - `LiveFetcher`: Opens a short-lived subscription per request and returns
//!   matching events
//! - `supervise`: Restarts a failing task according to a `RestartPolicy`

pub mod aggregator;
pub mod collector;
pub mod live_fetcher;
pub mod supervisor;

pub use aggregator::{Aggregator, CycleError, CycleReport};
pub use collector::{CollectError, Collector, CollectorStats, EnqueueOutcome};
pub use live_fetcher::{FetchReport, LiveFetcher};
pub use supervisor::{SupervisorExit, shutdown_requested, supervise};
