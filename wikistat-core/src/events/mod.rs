//! Event types and the bounded queue between collector and aggregator.
//!
//! # Event Flow
//!
//! 1. The event source yields raw payloads
//! 2. `Collector` decodes and classifies them into `ClassifiedEvent`s
//! 3. `Collector` pushes them into the event queue
//! 4. `Aggregator` drains the queue each cycle and persists the tally

pub mod channels;
pub mod types;

pub use channels::{DEFAULT_QUEUE_CAPACITY, EventQueueReceiver, EventQueueSender, event_queue};
pub use types::ClassifiedEvent;
