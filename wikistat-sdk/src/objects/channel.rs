//! Per-channel language preference types.

use serde::{Deserialize, Serialize};

use super::language::LanguageCode;

/// Language preference of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLanguage {
    pub channel_id: String,
    pub language: LanguageCode,
}

/// `PUT /api/v1/channels/{channel_id}/language` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetChannelLanguage {
    pub language: LanguageCode,
}
