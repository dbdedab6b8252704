//! Durable per-day, per-language counters.
//!
//! [`CounterStore`] is the seam between the aggregator / query API and the
//! storage backend. `DatabaseProcessor` implements it on top of the
//! `daily_stats` table; [`MemoryCounterStore`] keeps the same semantics in
//! process memory.

mod memory;
mod postgres;

pub use memory::MemoryCounterStore;

use crate::entities::{DailyLanguageCounter, LanguageTally};
use async_trait::async_trait;
use thiserror::Error;
use time::Date;
use wikistat_sdk::objects::LanguageCode;

/// Errors raised by a counter store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend refused the write for a reason of its own.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add every entry of `tally` to the counters of `date`, atomically.
    ///
    /// Applying the same tally twice counts it twice.
    async fn increment(&self, date: Date, tally: &LanguageTally) -> Result<(), StoreError>;

    /// The counter for (`date`, `language`), or `None` if it was never
    /// incremented.
    async fn get_stats(
        &self,
        date: Date,
        language: &LanguageCode,
    ) -> Result<Option<DailyLanguageCounter>, StoreError>;
}

#[async_trait]
impl<S: CounterStore + ?Sized> CounterStore for std::sync::Arc<S> {
    async fn increment(&self, date: Date, tally: &LanguageTally) -> Result<(), StoreError> {
        (**self).increment(date, tally).await
    }

    async fn get_stats(
        &self,
        date: Date,
        language: &LanguageCode,
    ) -> Result<Option<DailyLanguageCounter>, StoreError> {
        (**self).get_stats(date, language).await
    }
}
