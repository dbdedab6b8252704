use crate::framework::{DatabaseAccessor, DatabaseProcessor};
use kanau::processor::Processor;
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};
use wikistat_sdk::objects::{DailyStatsResponse, LanguageCode, format_date};

/// One row of `daily_stats`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DailyLanguageCounter {
    pub date: Date,
    pub language: String,
    pub change_count: i64,
    pub last_updated: OffsetDateTime,
}

impl DailyLanguageCounter {
    /// Add `count` to the counter of (`date`, `language`), creating it if absent.
    pub async fn increment(
        db: &mut impl DatabaseAccessor,
        date: Date,
        language: &str,
        count: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO daily_stats (date, language, change_count, last_updated)
            VALUES ($1, $2, $3, CURRENT_TIMESTAMP)
            ON CONFLICT (date, language)
            DO UPDATE SET
                change_count = daily_stats.change_count + EXCLUDED.change_count,
                last_updated = CURRENT_TIMESTAMP
            "#,
        )
        .bind(date)
        .bind(language)
        .bind(count)
        .execute(db.acquire())
        .await?;
        Ok(())
    }

    pub fn to_response(&self) -> DailyStatsResponse {
        DailyStatsResponse {
            date: format_date(self.date),
            language: LanguageCode::parse(&self.language).unwrap_or_default(),
            change_count: self.change_count,
            last_updated: self.last_updated.unix_timestamp(),
        }
    }
}

/// Per-cycle count of events by language.
///
/// Ordered by language so every transaction touches rows in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTally {
    counts: BTreeMap<LanguageCode, u64>,
}

impl LanguageTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, language: LanguageCode) {
        self.add(language, 1);
    }

    pub fn add(&mut self, language: LanguageCode, count: u64) {
        *self.counts.entry(language).or_insert(0) += count;
    }

    pub fn get(&self, language: &LanguageCode) -> u64 {
        self.counts.get(language).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct languages.
    pub fn languages(&self) -> usize {
        self.counts.len()
    }

    /// Number of events across all languages.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LanguageCode, u64)> {
        self.counts.iter().map(|(language, count)| (language, *count))
    }
}

impl FromIterator<LanguageCode> for LanguageTally {
    fn from_iter<I: IntoIterator<Item = LanguageCode>>(iter: I) -> Self {
        let mut tally = Self::new();
        for language in iter {
            tally.record(language);
        }
        tally
    }
}

#[derive(Debug, Clone)]
/// Look up the counter of one (date, language) pair.
///
/// `None` means the pair was never incremented, which is not the same as a
/// row holding zero.
pub struct GetDailyStats {
    pub date: Date,
    pub language: LanguageCode,
}

impl Processor<GetDailyStats> for DatabaseProcessor {
    type Output = Option<DailyLanguageCounter>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetDailyStats")]
    async fn process(
        &self,
        query: GetDailyStats,
    ) -> Result<Option<DailyLanguageCounter>, sqlx::Error> {
        let counter = sqlx::query_as::<_, DailyLanguageCounter>(
            r#"
            SELECT date, language, change_count, last_updated
            FROM daily_stats
            WHERE date = $1 AND language = $2
            "#,
        )
        .bind(query.date)
        .bind(query.language.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(counter)
    }
}

#[derive(Debug, Clone)]
/// Apply a whole tally to one day's counters in a single transaction.
///
/// Either every language is incremented or none is.
pub struct IncrementDailyStats {
    pub date: Date,
    pub tally: LanguageTally,
}

impl Processor<IncrementDailyStats> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:IncrementDailyStats")]
    async fn process(&self, insert: IncrementDailyStats) -> Result<(), sqlx::Error> {
        if insert.tally.is_empty() {
            return Ok(());
        }

        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.begin().await?;
        for (language, count) in insert.tally.iter() {
            let count = i64::try_from(count).unwrap_or(i64::MAX);
            DailyLanguageCounter::increment(&mut tx, insert.date, language.as_str(), count).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> LanguageCode {
        LanguageCode::parse(s).unwrap()
    }

    #[test]
    fn test_tally_counts_per_language() {
        let tally: LanguageTally = ["de", "en", "de", "fr", "de"].into_iter().map(code).collect();
        assert_eq!(tally.get(&code("de")), 3);
        assert_eq!(tally.get(&code("en")), 1);
        assert_eq!(tally.get(&code("ja")), 0);
        assert_eq!(tally.languages(), 3);
        assert_eq!(tally.total(), 5);
    }

    #[test]
    fn test_tally_iterates_in_language_order() {
        let mut tally = LanguageTally::new();
        tally.add(code("fr"), 2);
        tally.add(code("de"), 1);
        tally.add(code("en"), 4);
        let order: Vec<_> = tally.iter().map(|(l, _)| l.as_str().to_owned()).collect();
        assert_eq!(order, ["de", "en", "fr"]);
    }
}
