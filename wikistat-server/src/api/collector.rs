use axum::{Json, extract::State, response::IntoResponse};

use crate::state::AppState;

/// `GET /collector` - lifetime counters of the collector.
pub(super) async fn get_collector_counters(state: State<AppState>) -> impl IntoResponse {
    Json(state.collector_stats.snapshot())
}
