use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expense::{check_amount, check_date, ValidationError};
use super::money::Money;

/// A standalone savings log entry, independent of any goal. The category is
/// a free-text label ("emergency fund", "investments"), not the expense
/// category set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingEntry {
    pub id: Option<i64>,
    pub amount: Money,
    pub category: String,
    pub date: NaiveDate,
}

impl SavingEntry {
    pub fn new(
        amount: Money,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        check_amount(amount)?;
        check_date(date)?;
        Ok(SavingEntry {
            id: None,
            amount,
            category: category.into(),
            date,
        })
    }
}
