use axum::extract::{Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use smartspend_core::{Budget, BudgetMonth, Category, Money};
use smartspend_storage as storage;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub year: i32,
    pub month: u32,
}

pub(crate) fn month_from(params: &MonthParams) -> Result<BudgetMonth, ApiError> {
    BudgetMonth::new(params.year, params.month)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid month: {}", params.month)))
}

pub async fn for_month(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Vec<Budget>>, ApiError> {
    let month = month_from(&params)?;
    Ok(Json(storage::get_budgets_for_month(&state.db, month).await?))
}

#[derive(Debug, Deserialize)]
pub struct BudgetPayload {
    pub category: Category,
    pub limit: Decimal,
    pub year: i32,
    pub month: u32,
}

/// PUT /api/budgets — one budget per (category, month); repeated calls
/// overwrite the limit.
pub async fn upsert(
    State(state): State<AppState>,
    Json(payload): Json<BudgetPayload>,
) -> Result<Json<Budget>, ApiError> {
    let month = month_from(&MonthParams {
        year: payload.year,
        month: payload.month,
    })?;
    let limit = Money::from_decimal(payload.limit);
    if !limit.is_positive() {
        return Err(ApiError::BadRequest(
            "Budget limit must be positive".to_string(),
        ));
    }
    if limit.try_to_cents().is_none() {
        return Err(ApiError::BadRequest(
            "Budget limit is out of range".to_string(),
        ));
    }
    let mut budget = Budget::new(payload.category, limit, month);
    let id = storage::upsert_budget(&state.db, &budget).await?;
    budget.id = Some(id);
    Ok(Json(budget))
}
