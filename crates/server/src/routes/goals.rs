use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use smartspend_core::{Money, SavingsGoal};
use smartspend_storage as storage;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<SavingsGoal>>, ApiError> {
    Ok(Json(storage::list_goals(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct GoalPayload {
    pub title: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<GoalPayload>,
) -> Result<(StatusCode, Json<SavingsGoal>), ApiError> {
    let mut goal = SavingsGoal::new(
        payload.title,
        Money::from_decimal(payload.target_amount),
        payload.deadline,
    )?;
    let id = storage::insert_goal(&state.db, &goal).await?;
    goal.id = Some(id);
    Ok((StatusCode::CREATED, Json(goal)))
}

#[derive(Debug, Deserialize)]
pub struct ContributionPayload {
    pub amount: Decimal,
}

pub async fn contribute(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ContributionPayload>,
) -> Result<StatusCode, ApiError> {
    let amount = Money::from_decimal(payload.amount);
    if !amount.is_positive() {
        return Err(ApiError::BadRequest(
            "Contribution must be positive".to_string(),
        ));
    }
    if amount.try_to_cents().is_none() {
        return Err(ApiError::BadRequest(
            "Contribution is out of range".to_string(),
        ));
    }
    if !storage::add_goal_contribution(&state.db, id, amount).await? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !storage::delete_goal(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
