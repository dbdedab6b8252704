//! Application state shared across all request handlers.

use crate::preferences::ChannelPreferences;
use std::sync::Arc;
use wikistat_core::processors::{CollectorStats, LiveFetcher};
use wikistat_core::source::EventSource;
use wikistat_core::store::CounterStore;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Durable daily counters.
    pub store: Arc<dyn CounterStore>,
    /// Opens one live subscription per `/recent` request.
    pub fetcher: Arc<LiveFetcher<Arc<dyn EventSource>>>,
    /// Per-channel language choices.
    pub preferences: ChannelPreferences,
    /// Counters of the running collector.
    pub collector_stats: Arc<CollectorStats>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CounterStore>,
        fetcher: LiveFetcher<Arc<dyn EventSource>>,
        preferences: ChannelPreferences,
        collector_stats: Arc<CollectorStats>,
    ) -> Self {
        Self {
            store,
            fetcher: Arc::new(fetcher),
            preferences,
            collector_stats,
        }
    }
}
