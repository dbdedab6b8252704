//! Background workers: the supervised collector and the aggregation timer.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use wikistat_core::processors::{Aggregator, Collector, SupervisorExit, shutdown_requested};
use wikistat_core::source::EventSource;
use wikistat_core::store::CounterStore;

/// Spawn the collector under its restart policy.
pub fn spawn_collector<S>(
    collector: Collector<S>,
    shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<SupervisorExit>
where
    S: EventSource + 'static,
{
    tokio::spawn(collector.run(shutdown_rx))
}

/// Spawn the aggregation loop.
pub fn spawn_aggregator<S>(
    aggregator: Aggregator<S>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: CounterStore + 'static,
{
    tokio::spawn(run_aggregator(aggregator, interval, shutdown_rx))
}

/// Run one cycle per `interval` until shutdown, then one last cycle to
/// flush whatever is still queued.
///
/// Cycles never overlap: a slow cycle delays the next tick instead of
/// stacking ticks up. The loop also ends once the collector is gone and
/// the queue is empty.
pub async fn run_aggregator<S: CounterStore>(
    mut aggregator: Aggregator<S>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(interval_ms = interval.as_millis() as u64, "Aggregator started");

    loop {
        tokio::select! {
            biased;

            _ = shutdown_requested(&mut shutdown_rx) => {
                tracing::info!("Aggregator received shutdown signal");
                break;
            }

            _ = ticker.tick() => {
                // The cycle logs its own failure; the next tick starts
                // from a fresh tally.
                match aggregator.cycle().await {
                    Ok(report) => {
                        tracing::debug!(events = report.drained, "Aggregation tick done")
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Aggregation tick failed, tally discarded")
                    }
                }
                if aggregator.is_finished() {
                    tracing::warn!("Event queue closed, aggregator stopping");
                    return;
                }
            }
        }
    }

    match aggregator.cycle().await {
        Ok(report) => tracing::info!(events = report.drained, "Final aggregation flush done"),
        Err(e) => tracing::error!(error = %e, "Final aggregation flush failed"),
    }
    tracing::info!("Aggregator shutdown complete");
}
