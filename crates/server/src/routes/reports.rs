use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use smartspend_core::MonthlySummary;
use smartspend_export::{expenses_filename, write_expenses_csv};
use smartspend_storage as storage;

use super::budgets::{month_from, MonthParams};
use super::expenses::{range_from, ListParams};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/summary — spending against budgets for one month.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<MonthlySummary>, ApiError> {
    let month = month_from(&params)?;
    let expenses = storage::list_expenses(&state.db, Some(month.range())).await?;
    let budgets = storage::get_budgets_for_month(&state.db, month).await?;
    Ok(Json(MonthlySummary::compute(month, &expenses, &budgets)))
}

/// GET /api/export/expenses.csv — CSV download, optionally range-filtered.
pub async fn export_expenses(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let range = range_from(params)?;
    let expenses = storage::list_expenses(&state.db, range).await?;

    let mut buf = Vec::new();
    write_expenses_csv(&mut buf, &expenses)?;

    let filename = expenses_filename(chrono::Utc::now().date_naive());
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        buf,
    )
        .into_response())
}
