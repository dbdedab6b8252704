//! Server-sent events source for the Wikimedia stream.
//!
//! Only the `data:` field is used. `event:`, `id:` and `retry:` fields and
//! comment lines are skipped.

use super::{EventSource, PayloadStream, SourceError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{StreamExt, stream};
use reqwest::header::ACCEPT;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Subscribes to an SSE endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct SseEventSource {
    url: Url,
    http_client: reqwest::Client,
}

impl SseEventSource {
    /// The public recent-change stream.
    pub const RECENT_CHANGE_URL: &str = "https://stream.wikimedia.org/v2/stream/recentchange";

    /// Create a source for `url`.
    ///
    /// The client has a connect timeout but no overall request timeout,
    /// because a subscription is expected to stay open indefinitely.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            http_client: reqwest::Client::builder()
                .user_agent(concat!("wikistat/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl EventSource for SseEventSource {
    async fn subscribe(&self) -> Result<PayloadStream, SourceError> {
        let response = self
            .http_client
            .get(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }
        debug!(url = %self.url, "SSE subscription opened");

        let body = response.bytes_stream().boxed();
        let state = Some((body, SseDecoder::new(), VecDeque::new()));

        let payloads = stream::unfold(state, |state| async move {
            let Some((mut body, mut decoder, mut ready)) = state else {
                return None;
            };
            loop {
                if let Some(payload) = ready.pop_front() {
                    return Some((Ok(payload), Some((body, decoder, ready))));
                }
                match body.next().await {
                    Some(Ok(chunk)) => ready.extend(decoder.feed(&chunk)),
                    Some(Err(e)) => return Some((Err(SourceError::Request(e)), None)),
                    None => return None,
                }
            }
        });

        Ok(payloads.boxed())
    }
}

/// Incremental SSE framer.
///
/// Feed it body chunks as they arrive; it returns the `data` of every
/// event completed by that chunk. Lines may be split across chunks and may
/// end in `\n` or `\r\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: BytesMut,
    data: BytesMut,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        let mut events = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.line.extend_from_slice(&rest[..pos]);
            rest = &rest[pos + 1..];
            let mut line = self.line.split();
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.line.extend_from_slice(rest);
        events
    }

    fn process_line(&mut self, line: &[u8]) -> Option<Bytes> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line[0] == b':' {
            return None;
        }

        let (field, value) = match line.iter().position(|&b| b == b':') {
            Some(colon) => {
                let value = &line[colon + 1..];
                (&line[..colon], value.strip_prefix(b" ").unwrap_or(value))
            }
            None => (line, &[][..]),
        };

        if field == b"data" {
            self.data.extend_from_slice(value);
            self.data.extend_from_slice(b"\n");
        }
        None
    }

    fn dispatch(&mut self) -> Option<Bytes> {
        if self.data.is_empty() {
            return None;
        }
        let mut data = self.data.split();
        // Drop the newline appended after the last data line.
        data.truncate(data.len() - 1);
        Some(data.freeze())
    }
}
