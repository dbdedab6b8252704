//! Event queue factory and handles.
//!
//! The queue is the only state shared between the collector (single
//! producer) and the aggregator (single consumer). It is bounded, so a
//! stalled aggregator makes the collector apply backpressure instead of
//! growing memory.

use super::types::ClassifiedEvent;
use tokio::sync::mpsc;

/// Default capacity of the event queue.
///
/// Large enough to hold several aggregation intervals of a busy stream.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Sender handle for classified events (held by the collector).
pub type EventQueueSender = mpsc::Sender<ClassifiedEvent>;
/// Receiver handle for classified events (held by the aggregator).
pub type EventQueueReceiver = mpsc::Receiver<ClassifiedEvent>;

/// Create a new event queue holding at most `capacity` events.
///
/// `capacity` is clamped to at least 1.
pub fn event_queue(capacity: usize) -> (EventQueueSender, EventQueueReceiver) {
    mpsc::channel(capacity.max(1))
}
