use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use smartspend_core::{Income, Money};
use smartspend_storage as storage;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Income>>, ApiError> {
    Ok(Json(storage::list_income(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct IncomePayload {
    pub source: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl IncomePayload {
    fn validate(self) -> Result<Income, ApiError> {
        Ok(Income::new(
            self.source,
            Money::from_decimal(self.amount),
            self.date,
        )?)
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<IncomePayload>,
) -> Result<(StatusCode, Json<Income>), ApiError> {
    let mut income = payload.validate()?;
    let id = storage::insert_income(&state.db, &income).await?;
    income.id = Some(id);
    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<IncomePayload>,
) -> Result<Json<Income>, ApiError> {
    let mut income = payload.validate()?;
    if !storage::update_income(&state.db, id, &income).await? {
        return Err(ApiError::NotFound);
    }
    income.id = Some(id);
    Ok(Json(income))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !storage::delete_income(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
