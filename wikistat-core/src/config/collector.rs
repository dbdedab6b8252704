use crate::events::DEFAULT_QUEUE_CAPACITY;
use crate::utils::RestartPolicy;
use std::time::Duration;

/// Collector and event queue settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Capacity of the queue between collector and aggregator.
    pub queue_capacity: usize,
    /// How long to wait for queue space before dropping an event.
    pub enqueue_timeout: Duration,
    /// What to do when the subscription fails.
    pub restart: RestartPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enqueue_timeout: Duration::from_secs(1),
            restart: RestartPolicy::default(),
        }
    }
}
