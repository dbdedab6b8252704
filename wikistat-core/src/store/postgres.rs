use super::{CounterStore, StoreError};
use crate::entities::{DailyLanguageCounter, GetDailyStats, IncrementDailyStats, LanguageTally};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use time::Date;
use wikistat_sdk::objects::LanguageCode;

#[async_trait]
impl CounterStore for DatabaseProcessor {
    async fn increment(&self, date: Date, tally: &LanguageTally) -> Result<(), StoreError> {
        self.process(IncrementDailyStats {
            date,
            tally: tally.clone(),
        })
        .await?;
        Ok(())
    }

    async fn get_stats(
        &self,
        date: Date,
        language: &LanguageCode,
    ) -> Result<Option<DailyLanguageCounter>, StoreError> {
        let counter = self
            .process(GetDailyStats {
                date,
                language: language.clone(),
            })
            .await?;
        Ok(counter)
    }
}
