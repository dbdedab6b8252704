//! Raw payload sources.
//!
//! An [`EventSource`] opens a subscription and yields one raw payload per
//! feed message. Reconnecting after a dropped subscription is the caller's
//! job: the collector runs under a supervisor, the live fetcher simply
//! reports the failure.

mod sse;

pub use sse::{SseDecoder, SseEventSource};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::sync::Arc;
use thiserror::Error;

/// The payloads of one subscription, in arrival order.
///
/// An `Err` item is terminal: the subscription is unusable afterwards.
pub type PayloadStream = BoxStream<'static, Result<Bytes, SourceError>>;

/// Errors that can occur while subscribing to or reading a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("stream endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    /// Any other transport failure.
    #[error("stream error: {0}")]
    Transport(String),
}

/// A long-lived subscription to the change feed.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Open a new, independent subscription.
    async fn subscribe(&self) -> Result<PayloadStream, SourceError>;
}

#[async_trait]
impl<S: EventSource + ?Sized> EventSource for Arc<S> {
    async fn subscribe(&self) -> Result<PayloadStream, SourceError> {
        (**self).subscribe().await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted [`EventSource`] for processor tests.

    use super::{EventSource, PayloadStream, SourceError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures_util::{StreamExt, stream};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// What one call to `subscribe` produces.
    pub enum Session {
        /// Yields the payloads, then ends cleanly.
        Payloads(Vec<Bytes>),
        /// Yields the payloads, then a terminal error.
        PayloadsThenError(Vec<Bytes>),
        /// Yields the payloads, then never yields again.
        PayloadsThenHang(Vec<Bytes>),
        /// `subscribe` itself fails.
        FailSubscribe,
    }

    /// Plays back sessions in order. Once they run out, every subscription
    /// hangs without yielding.
    pub struct ScriptedSource {
        sessions: Mutex<VecDeque<Session>>,
        subscribe_calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn new(sessions: impl IntoIterator<Item = Session>) -> Self {
            Self {
                sessions: Mutex::new(sessions.into_iter().collect()),
                subscribe_calls: AtomicUsize::new(0),
            }
        }

        pub fn subscribe_calls(&self) -> usize {
            self.subscribe_calls.load(Ordering::SeqCst)
        }
    }

    fn items(payloads: Vec<Bytes>) -> impl futures_util::Stream<Item = Result<Bytes, SourceError>> {
        stream::iter(payloads.into_iter().map(Ok))
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn subscribe(&self) -> Result<PayloadStream, SourceError> {
            self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
            let session = self.sessions.lock().unwrap().pop_front();
            match session {
                Some(Session::Payloads(payloads)) => Ok(items(payloads).boxed()),
                Some(Session::PayloadsThenError(payloads)) => Ok(items(payloads)
                    .chain(stream::once(async {
                        Err(SourceError::Transport("connection reset".into()))
                    }))
                    .boxed()),
                Some(Session::PayloadsThenHang(payloads)) => {
                    Ok(items(payloads).chain(stream::pending()).boxed())
                }
                Some(Session::FailSubscribe) => {
                    Err(SourceError::Transport("connection refused".into()))
                }
                None => Ok(stream::pending().boxed()),
            }
        }
    }

    /// A JSON payload for an event on `domain`.
    pub fn payload(title: &str, domain: &str) -> Bytes {
        Bytes::from(
            serde_json::json!({
                "title": title,
                "title_url": format!("https://{domain}/wiki/{title}"),
                "user": "tester",
                "bot": false,
                "timestamp": 1_700_000_000,
                "meta": {"domain": domain},
                "server_name": domain,
            })
            .to_string(),
        )
    }
}
