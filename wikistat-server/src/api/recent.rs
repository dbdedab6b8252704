use axum::{Json, extract::State, response::IntoResponse};
use wikistat_sdk::objects::RecentChangesResponse;

use super::extractors::SelectedLanguage;
use crate::state::AppState;

/// `GET /recent` - live events in the selected language.
///
/// Holds the request open until the fetch fills up or times out. A feed
/// failure is reported in `completion`, not as an HTTP error.
pub(super) async fn get_recent_changes(
    state: State<AppState>,
    SelectedLanguage(language): SelectedLanguage,
) -> impl IntoResponse {
    let report = state.fetcher.fetch_report(&language).await;
    Json(RecentChangesResponse {
        language,
        completion: report.completion,
        events: report.events,
    })
}
