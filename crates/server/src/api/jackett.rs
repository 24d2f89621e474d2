//! Jackett custom indexer config endpoints.
//!
//! Generation failures are reported in the envelope `code`, not the HTTP
//! status; every handler answers 200.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use jackett_bridge_core::{ApiEnvelope, ConfigEntry, GenerationSummary, IndexerOption};

use crate::state::AppState;

/// GET /api/v1/jackett/list_custom_configs
pub async fn list_custom_configs(
    State(state): State<Arc<AppState>>,
) -> Json<ApiEnvelope<Vec<ConfigEntry>>> {
    Json(state.generator().list_custom_configs().await)
}

/// GET /api/v1/jackett/indexers
pub async fn list_indexers(
    State(state): State<Arc<AppState>>,
) -> Json<ApiEnvelope<Vec<IndexerOption>>> {
    Json(state.generator().list_indexers().await)
}

#[derive(Debug, Serialize)]
pub struct JackettStatusResponse {
    pub enabled: bool,
    pub configured: bool,
    pub host: String,
    pub selected_indexers: Vec<String>,
    pub refresh_interval_hours: u64,
    pub last_run: Option<GenerationSummary>,
}

/// GET /api/v1/jackett/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<JackettStatusResponse> {
    let generator = state.generator();
    let settings = generator.settings();

    Json(JackettStatusResponse {
        enabled: settings.enabled,
        configured: settings.connection().is_complete(),
        host: settings.connection().base_url().to_string(),
        selected_indexers: settings.indexers.clone(),
        refresh_interval_hours: state.config().refresh.interval_hours,
        last_run: generator.last_run().await,
    })
}
