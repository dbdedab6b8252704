//! Custom Axum extractors for the query API.
//!
//! Provides `SelectedLanguage`, which works out which language a request is
//! about from its query string:
//!
//! - `?language=de` names the language directly
//! - `?channel=general` uses the language stored for that channel
//! - neither falls back to English
//!
//! `language` wins when both are given.

use axum::{
    extract::{FromRequestParts, Query},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use wikistat_sdk::objects::{ErrorResponse, LanguageCode};

use crate::state::AppState;

/// The language a request asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedLanguage(pub LanguageCode);

#[derive(Debug, Deserialize)]
struct LanguageParams {
    language: Option<String>,
    channel: Option<String>,
}

/// Errors that can occur while selecting the language.
#[derive(Debug, thiserror::Error)]
pub enum SelectedLanguageError {
    #[error("invalid query string")]
    InvalidQuery,
    #[error("invalid language code: {0}")]
    InvalidLanguage(String),
}

impl IntoResponse for SelectedLanguageError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(ErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for SelectedLanguage {
    type Rejection = SelectedLanguageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<LanguageParams>::from_request_parts(parts, state)
            .await
            .map_err(|_| SelectedLanguageError::InvalidQuery)?;

        if let Some(language) = params.language {
            return LanguageCode::parse(&language)
                .map(SelectedLanguage)
                .map_err(|_| SelectedLanguageError::InvalidLanguage(language));
        }

        let language = match params.channel {
            Some(channel) => state.preferences.language(&channel).await,
            None => LanguageCode::english(),
        };
        Ok(SelectedLanguage(language))
    }
}
