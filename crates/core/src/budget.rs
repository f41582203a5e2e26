use serde::{Deserialize, Serialize};

use super::category::Category;
use super::money::Money;
use super::period::BudgetMonth;

/// A per-category spending limit for one calendar month. At most one budget
/// exists per (category, month) — storage upserts on that key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Option<i64>,
    pub category: Category,
    pub limit: Money,
    pub month: BudgetMonth,
}

impl Budget {
    pub fn new(category: Category, limit: Money, month: BudgetMonth) -> Self {
        Budget {
            id: None,
            category,
            limit,
            month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_budget_has_no_id() {
        let b = Budget::new(
            Category::Food,
            Money::from_cents(50_000),
            BudgetMonth::new(2024, 3).unwrap(),
        );
        assert!(b.id.is_none());
        assert_eq!(b.limit.to_cents(), 50_000);
    }
}
