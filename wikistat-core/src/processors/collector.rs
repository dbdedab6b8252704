//! Collector processor.
//!
//! The Collector is responsible for:
//! - Holding the long-lived subscription to the event source
//! - Decoding each payload into a `ChangeEvent` (undecodable payloads are
//!   logged and skipped)
//! - Classifying the event's language
//! - Pushing the result into the event queue, applying backpressure when
//!   the queue is full
//!
//! Every subscription ends in an error, clean or not: [`Collector::collect`]
//! runs exactly one, and [`Collector::run`] puts it under a supervisor that
//! resubscribes after the configured [`RestartPolicy`] backoff.

use crate::config::CollectorConfig;
use crate::events::{ClassifiedEvent, EventQueueSender};
use crate::processors::supervisor::{SupervisorExit, supervise};
use crate::source::{EventSource, SourceError};
use crate::utils::RestartPolicy;
use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use wikistat_sdk::objects::{ChangeEvent, CollectorCounters};

/// Errors that end a collection session.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Subscribing failed or the subscription broke.
    #[error("subscription failed: {0}")]
    Source(#[from] SourceError),

    /// The source closed the subscription without an error.
    #[error("subscription ended")]
    StreamEnded,
}

/// Result of handing one event to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Enqueued,
    /// The queue stayed full for the whole enqueue timeout.
    Dropped,
    /// The aggregator is gone.
    Closed,
}

/// Lifetime counters, shared with whoever wants to report them.
#[derive(Debug, Default)]
pub struct CollectorStats {
    received: AtomicU64,
    decode_failures: AtomicU64,
    enqueued: AtomicU64,
    dropped: AtomicU64,
    subscriptions: AtomicU64,
}

impl CollectorStats {
    pub fn snapshot(&self) -> CollectorCounters {
        CollectorCounters {
            received: self.received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Feeds the event queue from an [`EventSource`].
pub struct Collector<S> {
    source: S,
    queue: EventQueueSender,
    enqueue_timeout: Duration,
    restart: RestartPolicy,
    stats: Arc<CollectorStats>,
}

impl<S: EventSource> Collector<S> {
    /// Create a new Collector.
    ///
    /// # Arguments
    ///
    /// * `source` - Where payloads come from
    /// * `queue` - Sender half of the event queue
    /// * `config` - Enqueue timeout and restart policy
    pub fn new(source: S, queue: EventQueueSender, config: &CollectorConfig) -> Self {
        Self {
            source,
            queue,
            enqueue_timeout: config.enqueue_timeout,
            restart: config.restart,
            stats: Arc::new(CollectorStats::default()),
        }
    }

    /// Handle to the collector's counters.
    pub fn stats(&self) -> Arc<CollectorStats> {
        Arc::clone(&self.stats)
    }

    /// Run the Collector under its restart policy until shutdown is
    /// signaled, the restart budget is spent, or the queue closes.
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> SupervisorExit {
        info!("Collector started");
        let collector = &self;
        let exit = supervise("collector", self.restart, shutdown_rx, || collector.collect()).await;
        info!(?exit, "Collector stopped");
        exit
    }

    /// Run one subscription, forwarding events until it ends.
    ///
    /// A subscription that ends cleanly is reported as
    /// [`CollectError::StreamEnded`] so the supervisor's backoff applies
    /// before the next one. Returns `Ok(())` only when the event queue has
    /// been closed.
    pub async fn collect(&self) -> Result<(), CollectError> {
        let mut payloads = self.source.subscribe().await?;
        CollectorStats::bump(&self.stats.subscriptions);
        info!("Collector subscribed to event source");

        while let Some(payload) = payloads.next().await {
            let payload = payload?;
            CollectorStats::bump(&self.stats.received);

            let event = match ChangeEvent::decode(&payload) {
                Ok(event) => event,
                Err(e) => {
                    CollectorStats::bump(&self.stats.decode_failures);
                    warn!(error = %e, "Discarding undecodable payload");
                    continue;
                }
            };

            let classified = ClassifiedEvent::classify(event);
            if self.enqueue(classified).await == EnqueueOutcome::Closed {
                info!("Event queue closed, collector stopping");
                return Ok(());
            }
        }

        debug!("Subscription ended");
        Err(CollectError::StreamEnded)
    }

    /// Push one event, waiting at most the enqueue timeout for space.
    pub async fn enqueue(&self, event: ClassifiedEvent) -> EnqueueOutcome {
        let event = match self.queue.try_send(event) {
            Ok(()) => {
                CollectorStats::bump(&self.stats.enqueued);
                return EnqueueOutcome::Enqueued;
            }
            Err(TrySendError::Closed(_)) => return EnqueueOutcome::Closed,
            Err(TrySendError::Full(event)) => event,
        };

        match self.queue.send_timeout(event, self.enqueue_timeout).await {
            Ok(()) => {
                CollectorStats::bump(&self.stats.enqueued);
                EnqueueOutcome::Enqueued
            }
            Err(SendTimeoutError::Timeout(event)) => {
                CollectorStats::bump(&self.stats.dropped);
                warn!(
                    language = %event.language,
                    timeout_ms = self.enqueue_timeout.as_millis() as u64,
                    "Event queue full, dropping event"
                );
                EnqueueOutcome::Dropped
            }
            Err(SendTimeoutError::Closed(_)) => EnqueueOutcome::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_queue;
    use crate::source::testing::{ScriptedSource, Session, payload};
    use crate::utils::Backoff;
    use bytes::Bytes;

    fn config(queue_capacity: usize) -> CollectorConfig {
        CollectorConfig {
            queue_capacity,
            ..CollectorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_decodes_classifies_and_skips_garbage() {
        let source = ScriptedSource::new([
            Session::Payloads(vec![
                payload("Berlin", "de.wikipedia.org"),
                Bytes::from_static(b"{not json"),
                payload("Q42", "www.wikidata.org"),
            ]),
            Session::FailSubscribe,
        ]);
        let (tx, mut rx) = event_queue(16);
        let collector = Collector::new(source, tx, &config(16));

        let result = collector.collect().await;
        assert!(matches!(result, Err(CollectError::StreamEnded)));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.event.title, "Berlin");
        assert_eq!(first.language, "de");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.event.title, "Q42");
        assert_eq!(second.language, "en");
        assert!(rx.try_recv().is_err());

        let counters = collector.stats().snapshot();
        assert_eq!(counters.received, 3);
        assert_eq!(counters.decode_failures, 1);
        assert_eq!(counters.enqueued, 2);
        assert_eq!(counters.dropped, 0);
        assert_eq!(counters.subscriptions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clean_end_resubscribes_after_backoff() {
        let source = Arc::new(ScriptedSource::new([
            Session::Payloads(vec![payload("A", "fr.wikipedia.org")]),
            Session::Payloads(vec![payload("B", "fr.wikipedia.org")]),
            Session::PayloadsThenError(vec![payload("C", "fr.wikipedia.org")]),
        ]));
        let (tx, mut rx) = event_queue(16);
        let config = CollectorConfig {
            restart: RestartPolicy {
                backoff: Backoff::Fixed(Duration::from_secs(1)),
                max_restarts: Some(2),
            },
            ..config(16)
        };
        let collector = Collector::new(Arc::clone(&source), tx, &config);
        let stats = collector.stats();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let started = tokio::time::Instant::now();
        let exit = collector.run(shutdown_rx).await;

        assert_eq!(exit, SupervisorExit::GaveUp { restarts: 2 });
        // Each clean end waited out the one-second backoff.
        assert!(started.elapsed() >= Duration::from_secs(2));
        let titles: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.event.title)
            .collect();
        assert_eq!(titles, ["A", "B", "C"]);
        assert_eq!(stats.snapshot().subscriptions, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_subscriptions_do_not_spin() {
        let sessions = (0..50)
            .map(|_| Session::Payloads(vec![]))
            .collect::<Vec<_>>();
        let source = Arc::new(ScriptedSource::new(sessions));
        let (tx, _rx) = event_queue(4);
        let config = CollectorConfig {
            restart: RestartPolicy::fixed(Duration::from_secs(1)),
            ..config(4)
        };
        let collector = Collector::new(Arc::clone(&source), tx, &config);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(collector.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        shutdown_tx.send(true).unwrap();
        assert_eq!(handle.await.unwrap(), SupervisorExit::Shutdown);

        // One subscription per second of backoff, not fifty at once.
        assert_eq!(source.subscribe_calls(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_queue_drops_one_event_per_blocked_push() {
        let payloads = (0..5)
            .map(|i| payload(&format!("P{i}"), "it.wikipedia.org"))
            .collect();
        let source = ScriptedSource::new([Session::PayloadsThenError(payloads)]);
        let (tx, mut rx) = event_queue(2);
        let collector = Collector::new(source, tx, &config(2));

        let started = tokio::time::Instant::now();
        assert!(collector.collect().await.is_err());

        // Two fit, the other three each waited the full second.
        assert!(started.elapsed() >= Duration::from_secs(3));
        let counters = collector.stats().snapshot();
        assert_eq!(counters.enqueued, 2);
        assert_eq!(counters.dropped, 3);

        // FIFO order is preserved for what made it in.
        assert_eq!(rx.try_recv().unwrap().event.title, "P0");
        assert_eq!(rx.try_recv().unwrap().event.title, "P1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_push_succeeds_when_space_frees_up() {
        let source = ScriptedSource::new([]);
        let (tx, mut rx) = event_queue(1);
        let collector = Collector::new(source, tx, &config(1));

        let event = |title: &str| {
            ClassifiedEvent::classify(ChangeEvent {
                title: title.into(),
                ..ChangeEvent::default()
            })
        };
        assert_eq!(collector.enqueue(event("a")).await, EnqueueOutcome::Enqueued);

        let consumer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let first = rx.recv().await.unwrap();
            (first, rx)
        });
        assert_eq!(collector.enqueue(event("b")).await, EnqueueOutcome::Enqueued);

        let (first, mut rx) = consumer.await.unwrap();
        assert_eq!(first.event.title, "a");
        assert_eq!(rx.recv().await.unwrap().event.title, "b");
        assert_eq!(collector.stats().snapshot().dropped, 0);
    }

    #[tokio::test]
    async fn test_closed_queue_stops_cleanly() {
        let source = ScriptedSource::new([Session::PayloadsThenHang(vec![payload(
            "X",
            "ja.wikipedia.org",
        )])]);
        let (tx, rx) = event_queue(4);
        drop(rx);
        let collector = Collector::new(source, tx, &config(4));

        assert!(collector.collect().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_resubscribes_after_backoff() {
        let source = Arc::new(ScriptedSource::new([
            Session::FailSubscribe,
            Session::PayloadsThenError(vec![payload("A", "nl.wikipedia.org")]),
            Session::FailSubscribe,
            Session::FailSubscribe,
        ]));
        let (tx, mut rx) = event_queue(4);
        let config = CollectorConfig {
            restart: RestartPolicy {
                backoff: Backoff::Fixed(Duration::from_secs(1)),
                max_restarts: Some(3),
            },
            ..config(4)
        };
        let collector = Collector::new(Arc::clone(&source), tx, &config);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let started = tokio::time::Instant::now();
        let exit = collector.run(shutdown_rx).await;

        // Four failures: three restarts with a one-second wait each, then
        // the budget is spent.
        assert_eq!(exit, SupervisorExit::GaveUp { restarts: 3 });
        assert_eq!(source.subscribe_calls(), 4);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(rx.try_recv().unwrap().event.title, "A");
    }
}
