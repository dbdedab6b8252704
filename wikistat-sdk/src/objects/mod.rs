pub mod change_event;
pub mod channel;
pub mod collector;
pub mod language;
pub mod recent;
pub mod stats;

pub use change_event::{ChangeEvent, EventMeta};
pub use channel::{ChannelLanguage, SetChannelLanguage};
pub use collector::CollectorCounters;
pub use language::{CROSS_LANGUAGE_HOST, InvalidLanguageCode, LanguageCode, classify};
pub use recent::{FetchCompletion, RecentChangesResponse};
pub use stats::{DailyStatsResponse, format_date, parse_date};

use serde::{Deserialize, Serialize};

/// JSON body returned alongside every non-2xx response of the query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
