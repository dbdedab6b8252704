//! Configuration module for wikistat-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{BackoffStrategy, FileConfig, RestartConfig};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;
use wikistat_core::config::{AggregatorConfig, CollectorConfig, FetchConfig};
use wikistat_core::utils::{Backoff, RestartPolicy};

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid stream url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration, converted into the types the pipeline runs with.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub stream_url: Url,
    pub collector: CollectorConfig,
    pub aggregator: AggregatorConfig,
    pub fetch: FetchConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (a missing file means all defaults)
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        self.build(file_config)
    }

    /// Apply overrides to an already parsed file, then validate and convert it.
    pub fn build(&self, mut file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            stream_url: file_config.stream.parsed_url()?,
            collector: CollectorConfig {
                queue_capacity: file_config.collector.queue_capacity,
                enqueue_timeout: Duration::from_millis(file_config.collector.enqueue_timeout_ms),
                restart: convert_restart(&file_config.restart),
            },
            aggregator: AggregatorConfig {
                interval: Duration::from_millis(file_config.aggregator.interval_ms),
                batch_size: file_config.aggregator.batch_size,
                drain_timeout: Duration::from_millis(file_config.aggregator.drain_timeout_ms),
            },
            fetch: FetchConfig {
                timeout: Duration::from_millis(file_config.fetch.timeout_ms),
                max_events: file_config.fetch.max_events,
            },
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let checks = [
        (config.collector.queue_capacity == 0, "collector.queue_capacity must be at least 1"),
        (config.aggregator.interval_ms == 0, "aggregator.interval_ms must be positive"),
        (config.aggregator.batch_size == 0, "aggregator.batch_size must be at least 1"),
        (config.fetch.timeout_ms == 0, "fetch.timeout_ms must be positive"),
        (config.fetch.max_events == 0, "fetch.max_events must be at least 1"),
    ];
    if let Some((_, message)) = checks.iter().find(|(failed, _)| *failed) {
        return Err(ConfigError::ValidationError((*message).to_string()));
    }

    if config.restart.strategy == BackoffStrategy::Exponential
        && config.restart.delay_ms > config.restart.max_delay_ms
    {
        return Err(ConfigError::ValidationError(format!(
            "restart.delay_ms ({}) exceeds restart.max_delay_ms ({})",
            config.restart.delay_ms, config.restart.max_delay_ms
        )));
    }
    Ok(())
}

fn convert_restart(restart: &RestartConfig) -> RestartPolicy {
    let backoff = match restart.strategy {
        BackoffStrategy::Fixed => Backoff::Fixed(Duration::from_millis(restart.delay_ms)),
        BackoffStrategy::Exponential => Backoff::Exponential {
            initial: Duration::from_millis(restart.delay_ms),
            max: Duration::from_millis(restart.max_delay_ms),
            jitter: restart.jitter,
        },
    };
    RestartPolicy {
        backoff,
        max_restarts: restart.max_restarts,
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
