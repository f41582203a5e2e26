use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expense::{check_amount, check_date, ValidationError};
use super::money::Money;

/// A single income record: salary, freelance payment, refund, and so on.
/// The source is free text rather than a closed category set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: Option<i64>,
    pub source: String,
    pub amount: Money,
    pub date: NaiveDate,
}

impl Income {
    pub fn new(
        source: impl Into<String>,
        amount: Money,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        check_amount(amount)?;
        check_date(date)?;
        Ok(Income {
            id: None,
            source: source.into(),
            amount,
            date,
        })
    }
}
