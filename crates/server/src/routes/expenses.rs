use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use smartspend_core::{
    Category, DateRange, Expense, ExpenseSource, Money, OcrAudit, RecurringInterval,
    ValidatedExpense,
};
use smartspend_storage as storage;

use crate::error::ApiError;
use crate::state::AppState;

/// Wire shape for creating or replacing an expense. Amounts travel as
/// decimal numbers ("45.99"), never cents.
#[derive(Debug, Deserialize)]
pub struct ExpensePayload {
    pub title: Option<String>,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub source: ExpenseSource,
    #[serde(default)]
    pub recurring: RecurringInterval,
    #[serde(default)]
    pub ocr_raw: Option<String>,
    #[serde(default)]
    pub ocr_parsed: Option<OcrAudit>,
}

impl ExpensePayload {
    fn validate(self) -> Result<ValidatedExpense, ApiError> {
        ValidatedExpense::new(
            self.title,
            Money::from_decimal(self.amount),
            self.category,
            self.date,
            self.notes,
            self.source,
            self.recurring,
            self.ocr_raw,
            self.ocr_parsed,
        )
        .map_err(ApiError::from)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub(crate) fn range_from(params: ListParams) -> Result<Option<DateRange>, ApiError> {
    match (params.start, params.end) {
        (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end))),
        (None, None) => Ok(None),
        _ => Err(ApiError::BadRequest(
            "start and end must be given together".to_string(),
        )),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let range = range_from(params)?;
    Ok(Json(storage::list_expenses(&state.db, range).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let validated = payload.validate()?;
    let id = storage::insert_expense(&state.db, &validated).await?;
    let expense = storage::get_expense(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpensePayload>,
) -> Result<Json<Expense>, ApiError> {
    let validated = payload.validate()?;
    if !storage::update_expense(&state.db, id, &validated).await? {
        return Err(ApiError::NotFound);
    }
    let expense = storage::get_expense(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(expense))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !storage::delete_expense(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
