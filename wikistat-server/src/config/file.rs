//! TOML file configuration structures.
//!
//! These structs directly map to the `wikistat-config.toml` file format.
//! Every section and every field is optional.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;
use wikistat_core::events::DEFAULT_QUEUE_CAPACITY;
use wikistat_core::source::SseEventSource;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub stream: StreamConfig,
    pub collector: CollectorConfig,
    pub aggregator: AggregatorConfig,
    pub fetch: FetchConfig,
    pub restart: RestartConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Event stream section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// SSE endpoint of the recent-change feed.
    #[serde(default = "default_stream_url")]
    pub url: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
        }
    }
}

fn default_stream_url() -> String {
    SseEventSource::RECENT_CHANGE_URL.to_string()
}

impl StreamConfig {
    pub fn parsed_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub queue_capacity: usize,
    pub enqueue_timeout_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enqueue_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub interval_ms: u64,
    pub batch_size: usize,
    pub drain_timeout_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            batch_size: 1000,
            drain_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub max_events: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_events: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    #[default]
    Fixed,
    Exponential,
}

/// Collector restart section.
///
/// With `strategy = "fixed"` every restart waits `delay_ms`. With
/// `"exponential"` the wait starts at `delay_ms` and doubles up to
/// `max_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub strategy: BackoffStrategy,
    pub delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
    /// Omit to restart forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_restarts: Option<u32>,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            delay_ms: 1000,
            max_delay_ms: 60_000,
            jitter: false,
            max_restarts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.stream.url, SseEventSource::RECENT_CHANGE_URL);
        assert_eq!(config.collector.queue_capacity, 10_000);
        assert_eq!(config.aggregator.interval_ms, 5000);
        assert_eq!(config.aggregator.batch_size, 1000);
        assert_eq!(config.fetch.max_events, 10);
        assert_eq!(config.restart.strategy, BackoffStrategy::Fixed);
        assert_eq!(config.restart.max_restarts, None);
    }

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[stream]
url = "http://localhost:9000/stream"

[collector]
queue_capacity = 500
enqueue_timeout_ms = 250

[aggregator]
interval_ms = 10000
batch_size = 200
drain_timeout_ms = 500

[fetch]
timeout_ms = 5000
max_events = 3

[restart]
strategy = "exponential"
delay_ms = 500
max_delay_ms = 30000
jitter = true
max_restarts = 20
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(
            config.stream.parsed_url().unwrap().as_str(),
            "http://localhost:9000/stream"
        );
        assert_eq!(config.collector.queue_capacity, 500);
        assert_eq!(config.aggregator.batch_size, 200);
        assert_eq!(config.fetch.timeout_ms, 5000);
        assert_eq!(config.restart.strategy, BackoffStrategy::Exponential);
        assert!(config.restart.jitter);
        assert_eq!(config.restart.max_restarts, Some(20));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: FileConfig = toml::from_str("[aggregator]\nbatch_size = 50\n").unwrap();
        assert_eq!(config.aggregator.batch_size, 50);
        assert_eq!(config.aggregator.interval_ms, 5000);
        assert_eq!(config.aggregator.drain_timeout_ms, 2000);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[restart]\nstrategy = \"random\"\n");
        assert!(result.is_err());
    }
}
