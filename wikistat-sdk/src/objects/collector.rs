use serde::{Deserialize, Serialize};

/// Lifetime counters of the stream collector, as returned by
/// `GET /api/v1/collector`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorCounters {
    /// Payloads read from the stream.
    pub received: u64,
    /// Payloads that were not valid change events.
    pub decode_failures: u64,
    /// Events handed to the aggregation queue.
    pub enqueued: u64,
    /// Events dropped because the queue stayed full.
    pub dropped: u64,
    /// Times the subscription was (re)opened.
    pub subscriptions: u64,
}
