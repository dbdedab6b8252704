//! Aggregator processor.
//!
//! Each call to [`Aggregator::cycle`] drains a bounded batch from the event
//! queue, tallies it per language and applies the tally to the counter
//! store as one atomic increment. The timer driving the cycles lives with
//! the caller; cycles must not overlap, which `&mut self` enforces.
//!
//! A cycle whose increment fails discards its tally. Drained events are not
//! put back, so a store outage loses at most the events of the failed
//! cycles.

use crate::config::AggregatorConfig;
use crate::entities::LanguageTally;
use crate::events::EventQueueReceiver;
use crate::store::{CounterStore, StoreError};
use std::time::Duration;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// What a successful cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Events taken off the queue.
    pub drained: usize,
    /// Distinct languages among them.
    pub languages: usize,
}

impl CycleReport {
    pub fn is_empty(&self) -> bool {
        self.drained == 0
    }
}

#[derive(Debug, Error)]
pub enum CycleError {
    /// The tally could not be written; it has been discarded.
    #[error("failed to persist {events} events across {languages} languages: {source}")]
    Persist {
        events: usize,
        languages: usize,
        #[source]
        source: StoreError,
    },
}

pub struct Aggregator<S> {
    queue: EventQueueReceiver,
    store: S,
    batch_size: usize,
    drain_timeout: Duration,
}

impl<S: CounterStore> Aggregator<S> {
    /// Create a new Aggregator.
    ///
    /// # Arguments
    ///
    /// * `queue` - Receiver half of the event queue
    /// * `store` - Where tallies are persisted
    /// * `config` - Batch cap and drain deadline (the interval is ignored)
    pub fn new(queue: EventQueueReceiver, store: S, config: &AggregatorConfig) -> Self {
        Self {
            queue,
            store,
            batch_size: config.batch_size.max(1),
            drain_timeout: config.drain_timeout,
        }
    }

    /// Run one cycle against today's UTC date.
    pub async fn cycle(&mut self) -> Result<CycleReport, CycleError> {
        self.cycle_at(OffsetDateTime::now_utc().date()).await
    }

    /// Run one cycle, crediting every drained event to `date`.
    pub async fn cycle_at(&mut self, date: Date) -> Result<CycleReport, CycleError> {
        let tally = self.drain();
        let report = CycleReport {
            drained: usize::try_from(tally.total()).unwrap_or(usize::MAX),
            languages: tally.languages(),
        };

        if report.is_empty() {
            debug!("Aggregation cycle found no events");
            return Ok(report);
        }

        if let Err(source) = self.store.increment(date, &tally).await {
            error!(
                %date,
                events = report.drained,
                languages = report.languages,
                error = %source,
                "Failed to persist tally, discarding it"
            );
            return Err(CycleError::Persist {
                events: report.drained,
                languages: report.languages,
                source,
            });
        }

        info!(
            %date,
            events = report.drained,
            languages = report.languages,
            "Aggregation cycle committed"
        );
        Ok(report)
    }

    /// Whether every sender is gone and nothing is left to drain.
    pub fn is_finished(&self) -> bool {
        self.queue.is_closed() && self.queue.is_empty()
    }

    /// Take events off the queue until the batch is full, the queue is
    /// empty, or the drain deadline passes.
    fn drain(&mut self) -> LanguageTally {
        let deadline = Instant::now() + self.drain_timeout;
        let mut tally = LanguageTally::new();
        let mut drained = 0;

        while drained < self.batch_size && Instant::now() < deadline {
            match self.queue.try_recv() {
                Ok(event) => {
                    tally.record(event.language);
                    drained += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        tally
    }
}
