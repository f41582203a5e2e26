use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use smartspend_core::{Money, SavingEntry};
use smartspend_storage as storage;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<SavingEntry>>, ApiError> {
    Ok(Json(storage::list_savings(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct SavingPayload {
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}

impl SavingPayload {
    fn validate(self) -> Result<SavingEntry, ApiError> {
        Ok(SavingEntry::new(
            Money::from_decimal(self.amount),
            self.category,
            self.date,
        )?)
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<SavingPayload>,
) -> Result<(StatusCode, Json<SavingEntry>), ApiError> {
    let mut saving = payload.validate()?;
    let id = storage::insert_saving(&state.db, &saving).await?;
    saving.id = Some(id);
    Ok((StatusCode::CREATED, Json(saving)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SavingPayload>,
) -> Result<Json<SavingEntry>, ApiError> {
    let mut saving = payload.validate()?;
    if !storage::update_saving(&state.db, id, &saving).await? {
        return Err(ApiError::NotFound);
    }
    saving.id = Some(id);
    Ok(Json(saving))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !storage::delete_saving(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
