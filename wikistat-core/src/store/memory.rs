use super::{CounterStore, StoreError};
use crate::entities::{DailyLanguageCounter, LanguageTally};
use async_trait::async_trait;
use std::collections::HashMap;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use wikistat_sdk::objects::LanguageCode;

/// Counters held in process memory. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    rows: RwLock<HashMap<(Date, LanguageCode), DailyLanguageCounter>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (date, language) rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, date: Date, tally: &LanguageTally) -> Result<(), StoreError> {
        if tally.is_empty() {
            return Ok(());
        }
        let now = OffsetDateTime::now_utc();
        // One write guard for the whole tally keeps the update atomic.
        let mut rows = self.rows.write().await;
        for (language, count) in tally.iter() {
            let count = i64::try_from(count).unwrap_or(i64::MAX);
            rows.entry((date, language.clone()))
                .and_modify(|row| {
                    row.change_count = row.change_count.saturating_add(count);
                    row.last_updated = now;
                })
                .or_insert_with(|| DailyLanguageCounter {
                    date,
                    language: language.to_string(),
                    change_count: count,
                    last_updated: now,
                });
        }
        Ok(())
    }

    async fn get_stats(
        &self,
        date: Date,
        language: &LanguageCode,
    ) -> Result<Option<DailyLanguageCounter>, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .get(&(date, language.clone()))
            .cloned())
    }
}
