use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use wikistat_core::store::CounterStore;
use wikistat_sdk::objects::parse_date;

use super::ApiError;
use super::extractors::SelectedLanguage;
use crate::state::AppState;

/// `GET /stats/{date}` - the counter of one day and language.
pub(super) async fn get_daily_stats(
    state: State<AppState>,
    Path(date): Path<String>,
    SelectedLanguage(language): SelectedLanguage,
) -> Result<impl IntoResponse, ApiError> {
    let day = parse_date(&date).map_err(|_| ApiError::InvalidDate(date.clone()))?;

    let counter = state
        .store
        .get_stats(day, &language)
        .await
        .map_err(ApiError::Store)?
        .ok_or_else(|| ApiError::NotFound(format!("no stats for {language} on {date}")))?;

    Ok(Json(counter.to_response()))
}
