use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use smartspend_storage as storage;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingPayload {
    pub value: String,
}

/// GET /api/settings/{key} — e.g. the display currency symbol.
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SettingPayload>, ApiError> {
    let value = storage::get_setting(&state.db, &key)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(SettingPayload { value }))
}

pub async fn put(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<SettingPayload>,
) -> Result<Json<SettingPayload>, ApiError> {
    storage::set_setting(&state.db, &key, &payload.value).await?;
    Ok(Json(payload))
}
