//! On-demand filtered reads of the live change feed.
//!
//! Every fetch opens its own short-lived subscription, independent of the
//! collector's, and keeps the events classified under the requested
//! language until either the result limit or the deadline is reached.

use crate::config::FetchConfig;
use crate::source::{EventSource, SourceError};
use futures_util::StreamExt;
use tracing::{debug, warn};
use wikistat_sdk::objects::{ChangeEvent, FetchCompletion, LanguageCode};

/// The events a fetch gathered and why it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub events: Vec<ChangeEvent>,
    pub completion: FetchCompletion,
}

pub struct LiveFetcher<S> {
    source: S,
    config: FetchConfig,
}

impl<S: EventSource> LiveFetcher<S> {
    pub fn new(source: S, config: FetchConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Up to `max_events` live events in `language`, in arrival order.
    ///
    /// An empty result does not tell "nothing matched" from "the feed was
    /// unreachable"; use [`LiveFetcher::fetch_report`] for that.
    pub async fn fetch(&self, language: &LanguageCode) -> Vec<ChangeEvent> {
        self.fetch_report(language).await.events
    }

    /// Like [`LiveFetcher::fetch`], with the reason collection stopped.
    ///
    /// Returns within the configured timeout plus the time it takes to drop
    /// the subscription.
    #[tracing::instrument(skip_all, fields(%language))]
    pub async fn fetch_report(&self, language: &LanguageCode) -> FetchReport {
        let mut events = Vec::new();
        let completion = match tokio::time::timeout(
            self.config.timeout,
            self.collect_matching(language, &mut events),
        )
        .await
        {
            Ok(Ok(completion)) => completion,
            Ok(Err(e)) => {
                warn!(error = %e, "Live fetch could not read the event source");
                FetchCompletion::SourceFailed {
                    reason: e.to_string(),
                }
            }
            Err(_) => FetchCompletion::TimedOut,
        };

        debug!(found = events.len(), ?completion, "Live fetch finished");
        FetchReport { events, completion }
    }

    async fn collect_matching(
        &self,
        language: &LanguageCode,
        events: &mut Vec<ChangeEvent>,
    ) -> Result<FetchCompletion, SourceError> {
        if self.config.max_events == 0 {
            return Ok(FetchCompletion::Filled);
        }

        let mut payloads = self.source.subscribe().await?;
        while let Some(payload) = payloads.next().await {
            let payload = payload?;
            let event = match ChangeEvent::decode(&payload) {
                Ok(event) => event,
                Err(e) => {
                    debug!(error = %e, "Skipping undecodable payload");
                    continue;
                }
            };

            if event.language() != *language {
                continue;
            }
            events.push(event);
            if events.len() >= self.config.max_events {
                return Ok(FetchCompletion::Filled);
            }
        }
        Ok(FetchCompletion::StreamEnded)
    }
}
