//! Event types flowing through the aggregation queue.

use wikistat_sdk::objects::{ChangeEvent, LanguageCode};

/// A decoded change event together with the language it was classified
/// under at collection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub event: ChangeEvent,
    pub language: LanguageCode,
}

impl ClassifiedEvent {
    /// Classify `event` with [`ChangeEvent::language`].
    pub fn classify(event: ChangeEvent) -> Self {
        let language = event.language();
        Self { event, language }
    }
}
