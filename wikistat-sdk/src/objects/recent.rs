//! Live recent-change lookup types.

use serde::{Deserialize, Serialize};

use super::change_event::ChangeEvent;
use super::language::LanguageCode;

/// Why a live fetch stopped collecting.
///
/// An empty result with [`FetchCompletion::TimedOut`] means nothing matched
/// in time; an empty result with [`FetchCompletion::SourceFailed`] means the
/// stream could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchCompletion {
    /// The result limit was reached.
    Filled,
    /// The deadline passed first.
    TimedOut,
    /// The stream ended on its own before either limit.
    StreamEnded,
    /// Subscribing or reading failed.
    SourceFailed { reason: String },
}

/// `GET /api/v1/recent` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentChangesResponse {
    pub language: LanguageCode,
    pub completion: FetchCompletion,
    pub events: Vec<ChangeEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_wire_format() {
        let json = serde_json::to_value(FetchCompletion::SourceFailed {
            reason: "connection refused".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "source_failed", "reason": "connection refused"})
        );
        let json = serde_json::to_value(FetchCompletion::TimedOut).unwrap();
        assert_eq!(json, serde_json::json!({"status": "timed_out"}));
    }
}
