pub mod daily_stats;

pub use daily_stats::{DailyLanguageCounter, GetDailyStats, IncrementDailyStats, LanguageTally};
