//! Language classification of change events.
//!
//! Every wiki lives on a host whose first label is its language
//! (`de.wikipedia.org`, `ja.wiktionary.org`). Hosts that do not follow that
//! shape, and the multilingual Wikidata host, are counted as English.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host shared by every language edition. Edits there count as `"en"`.
pub const CROSS_LANGUAGE_HOST: &str = "www.wikidata.org";

/// Upper bound for user-supplied codes. Derived codes are always two characters.
const MAX_CODE_LEN: usize = 16;

/// A language code such as `"en"` or `"de"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(CompactString);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid language code {0:?}: expected 1-16 ASCII letters, digits or '-'")]
pub struct InvalidLanguageCode(pub String);

impl LanguageCode {
    /// The fallback code, `"en"`.
    pub fn english() -> Self {
        Self(CompactString::const_new("en"))
    }

    /// Validate a code supplied by a caller (query string, request body).
    pub fn parse(code: &str) -> Result<Self, InvalidLanguageCode> {
        let valid = !code.is_empty()
            && code.len() <= MAX_CODE_LEN
            && code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
        if valid {
            Ok(Self(CompactString::new(code)))
        } else {
            Err(InvalidLanguageCode(code.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = InvalidLanguageCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0.into_string()
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Derive the language code of an event from its domain and server name.
///
/// 1. The cross-language host on either field yields `"en"`.
/// 2. The domain is used when non-empty, the server name otherwise.
/// 3. A first dot-separated label of exactly two characters is the code.
/// 4. Anything else yields `"en"`.
pub fn classify(domain: Option<&str>, server_name: Option<&str>) -> LanguageCode {
    let domain = domain.unwrap_or_default();
    let server_name = server_name.unwrap_or_default();

    if domain == CROSS_LANGUAGE_HOST || server_name == CROSS_LANGUAGE_HOST {
        return LanguageCode::english();
    }

    let host = if domain.is_empty() { server_name } else { domain };
    match host.split('.').next() {
        Some(label) if label.chars().count() == 2 => LanguageCode(CompactString::new(label)),
        _ => LanguageCode::english(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_domain() {
        assert_eq!(classify(Some("de.wikipedia.org"), None), "de");
        assert_eq!(
            classify(Some("ja.wiktionary.org"), Some("fr.wikipedia.org")),
            "ja"
        );
    }

    #[test]
    fn test_cross_language_host_is_english() {
        assert_eq!(classify(Some(""), Some("www.wikidata.org")), "en");
        assert_eq!(classify(Some("www.wikidata.org"), None), "en");
        // The cross-language rule wins even when the other field has a code.
        assert_eq!(classify(Some("de.wikipedia.org"), Some("www.wikidata.org")), "en");
    }

    #[test]
    fn test_long_first_label_falls_back_to_english() {
        assert_eq!(classify(Some("commons.wikimedia.org"), None), "en");
        assert_eq!(classify(Some("simple.wikipedia.org"), None), "en");
    }

    #[test]
    fn test_server_name_only_used_when_domain_empty() {
        assert_eq!(classify(None, Some("es.wikipedia.org")), "es");
        assert_eq!(classify(Some(""), Some("it.wikipedia.org")), "it");
        // A non-empty domain without a code does not fall through to the server name.
        assert_eq!(
            classify(Some("meta.wikimedia.org"), Some("es.wikipedia.org")),
            "en"
        );
    }

    #[test]
    fn test_missing_fields_default_to_english() {
        assert_eq!(classify(None, None), "en");
        assert_eq!(classify(Some(""), Some("")), "en");
    }

    #[test]
    fn test_parse_user_supplied_codes() {
        assert_eq!(LanguageCode::parse("pt").unwrap(), "pt");
        assert_eq!(LanguageCode::parse("zh-yue").unwrap(), "zh-yue");
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("de fr").is_err());
        assert!(LanguageCode::parse("averyveryverylongcode").is_err());
    }

    #[test]
    fn test_serde_rejects_invalid_codes() {
        let code: LanguageCode = serde_json::from_str("\"de\"").unwrap();
        assert_eq!(code, "de");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"de\"");
        assert!(serde_json::from_str::<LanguageCode>("\"d e\"").is_err());
    }
}
