//! Per-channel language preferences.
//!
//! Kept in memory only; every channel starts out on English.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use wikistat_sdk::objects::LanguageCode;

#[derive(Debug, Clone, Default)]
pub struct ChannelPreferences {
    languages: Arc<RwLock<HashMap<String, LanguageCode>>>,
}

impl ChannelPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// The channel's language, or English if it never chose one.
    pub async fn language(&self, channel_id: &str) -> LanguageCode {
        self.languages
            .read()
            .await
            .get(channel_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set_language(&self, channel_id: &str, language: LanguageCode) {
        self.languages
            .write()
            .await
            .insert(channel_id.to_owned(), language);
    }
}
