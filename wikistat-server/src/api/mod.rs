//! Query API handlers.
//!
//! # Endpoints
//!
//! - `GET /stats/{date}`                  – counter for one day and language
//! - `GET /recent`                        – matching events from the live stream
//! - `GET /channels/{channel_id}/language` – a channel's language
//! - `PUT /channels/{channel_id}/language` – set a channel's language
//! - `GET /collector`                     – collector counters
//!
//! `stats` and `recent` select their language with
//! [`SelectedLanguage`](extractors::SelectedLanguage).

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use wikistat_core::store::StoreError;
use wikistat_sdk::objects::ErrorResponse;

use crate::state::AppState;

mod channels;
mod collector;
pub mod extractors;
mod recent;
mod stats;

/// Build the query API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats/{date}", get(stats::get_daily_stats))
        .route("/recent", get(recent::get_recent_changes))
        .route(
            "/channels/{channel_id}/language",
            get(channels::get_channel_language).put(channels::set_channel_language),
        )
        .route("/collector", get(collector::get_collector_counters))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in query API handlers.
#[derive(Debug)]
enum ApiError {
    /// The counter store failed.
    Store(StoreError),
    /// The path date is not `YYYY-MM-DD`.
    InvalidDate(String),
    /// Nothing was recorded for the requested pair.
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Query API store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                format!("invalid date {date:?}, expected YYYY-MM-DD"),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
