use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expense::{check_amount, ValidationError};
use super::money::Money;

/// A savings target the user contributes toward over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: Option<i64>,
    pub title: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub deadline: Option<NaiveDate>,
}

impl SavingsGoal {
    pub fn new(
        title: impl Into<String>,
        target_amount: Money,
        deadline: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        check_amount(target_amount)?;
        Ok(SavingsGoal {
            id: None,
            title: title.into(),
            target_amount,
            current_amount: Money::zero(),
            deadline,
        })
    }

    pub fn add_contribution(&mut self, amount: Money) {
        self.current_amount = self.current_amount + amount;
    }

    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Progress toward the target, capped at 100.
    pub fn percent_complete(&self) -> u8 {
        let target = self.target_amount.to_cents();
        if target <= 0 {
            return 0;
        }
        let pct = self.current_amount.to_cents() * 100 / target;
        pct.clamp(0, 100) as u8
    }
}
