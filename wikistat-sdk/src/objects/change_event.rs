//! The recent-change payload as published on the Wikimedia event stream.
//!
//! Only the fields wikistat uses are modelled; everything else in the
//! payload is ignored. Every field may be absent or `null`.

use serde::{Deserialize, Deserializer, Serialize};

use super::language::{LanguageCode, classify};

/// One edit, page creation or log action from the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bot: bool,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: EventMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// The `meta` envelope of a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Reads `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ChangeEvent {
    /// Decode one JSON payload.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    pub fn domain(&self) -> Option<&str> {
        self.meta.domain.as_deref()
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// The language this event is counted under. See [`classify`].
    pub fn language(&self) -> LanguageCode {
        classify(self.domain(), self.server_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let payload = br#"{
            "$schema": "/mediawiki/recentchange/1.0.0",
            "meta": {"uri": "https://de.wikipedia.org/wiki/Berlin", "domain": "de.wikipedia.org", "stream": "mediawiki.recentchange"},
            "type": "edit",
            "title": "Berlin",
            "title_url": "https://de.wikipedia.org/wiki/Berlin",
            "user": "Example",
            "bot": false,
            "timestamp": 1700000000,
            "server_name": "de.wikipedia.org"
        }"#;
        let event = ChangeEvent::decode(payload).unwrap();
        assert_eq!(event.title, "Berlin");
        assert_eq!(event.user, "Example");
        assert!(!event.bot);
        assert_eq!(event.timestamp, 1_700_000_000);
        assert_eq!(event.domain(), Some("de.wikipedia.org"));
        assert_eq!(event.language(), "de");
    }

    #[test]
    fn test_decode_sparse_payload() {
        let event = ChangeEvent::decode(br#"{"server_name": "fr.wikipedia.org"}"#).unwrap();
        assert!(event.title.is_empty());
        assert_eq!(event.domain(), None);
        assert_eq!(event.language(), "fr");
    }

    #[test]
    fn test_decode_null_fields_as_absent() {
        let payload = br#"{
            "title": null,
            "title_url": null,
            "user": null,
            "bot": null,
            "timestamp": null,
            "server_name": null,
            "meta": {"domain": "de.wikipedia.org"}
        }"#;
        let event = ChangeEvent::decode(payload).unwrap();
        assert!(event.title.is_empty());
        assert!(event.user.is_empty());
        assert!(!event.bot);
        assert_eq!(event.timestamp, 0);
        assert_eq!(event.server_name(), None);
        assert_eq!(event.language(), "de");

        let event =
            ChangeEvent::decode(br#"{"title": "Paris", "meta": null, "server_name": "fr.wikipedia.org"}"#)
                .unwrap();
        assert_eq!(event.title, "Paris");
        assert_eq!(event.meta, EventMeta::default());
        assert_eq!(event.language(), "fr");

        let event = ChangeEvent::decode(br#"{"meta": {"domain": null}}"#).unwrap();
        assert_eq!(event.domain(), None);
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(ChangeEvent::decode(b"not json").is_err());
        assert!(ChangeEvent::decode(br#"{"timestamp": "yesterday"}"#).is_err());
        assert!(ChangeEvent::decode(br#"{"bot": "#).is_err());
    }
}
