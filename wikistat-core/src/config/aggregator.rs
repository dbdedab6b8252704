use std::time::Duration;

/// Aggregator cycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Time between cycles. Used by whoever drives the cycles.
    pub interval: Duration,
    /// Most events drained in one cycle.
    pub batch_size: usize,
    /// Longest time one cycle spends draining.
    pub drain_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            batch_size: 1000,
            drain_timeout: Duration::from_secs(2),
        }
    }
}
