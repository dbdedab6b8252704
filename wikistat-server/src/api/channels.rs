use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use wikistat_sdk::objects::{ChannelLanguage, SetChannelLanguage};

use crate::state::AppState;

/// `GET /channels/{channel_id}/language`
pub(super) async fn get_channel_language(
    state: State<AppState>,
    Path(channel_id): Path<String>,
) -> impl IntoResponse {
    let language = state.preferences.language(&channel_id).await;
    Json(ChannelLanguage {
        channel_id,
        language,
    })
}

/// `PUT /channels/{channel_id}/language`
///
/// The body's language code is validated while deserializing, so a bad
/// code is rejected by the `Json` extractor.
pub(super) async fn set_channel_language(
    state: State<AppState>,
    Path(channel_id): Path<String>,
    Json(body): Json<SetChannelLanguage>,
) -> impl IntoResponse {
    state
        .preferences
        .set_language(&channel_id, body.language.clone())
        .await;
    tracing::info!(%channel_id, language = %body.language, "Channel language updated");

    Json(ChannelLanguage {
        channel_id,
        language: body.language,
    })
}
