use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::budget::Budget;
use super::category::Category;
use super::expense::Expense;
use super::money::Money;
use super::period::BudgetMonth;

/// Per-category view of spending against an optional budget limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub spent: Money,
    pub limit: Option<Money>,
    /// `limit - spent`; negative when over budget. Absent without a budget.
    pub remaining: Option<Money>,
    /// Whole-percent utilization. Absent without a positive budget.
    pub percent_used: Option<u32>,
}

impl CategorySummary {
    pub fn is_over_budget(&self) -> bool {
        matches!(self.remaining, Some(r) if r < Money::zero())
    }
}

/// Aggregated month view: totals plus category breakdown. Pure derivation
/// over in-memory slices; recomputed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: BudgetMonth,
    pub total_spent: Money,
    pub categories: Vec<CategorySummary>,
}

impl MonthlySummary {
    pub fn compute(month: BudgetMonth, expenses: &[Expense], budgets: &[Budget]) -> Self {
        let mut spent_by_category: BTreeMap<String, Money> = BTreeMap::new();
        let mut total_spent = Money::zero();

        for exp in expenses.iter().filter(|e| month.contains(e.date)) {
            total_spent = total_spent + exp.amount;
            let entry = spent_by_category
                .entry(exp.category.to_string())
                .or_insert_with(Money::zero);
            *entry = *entry + exp.amount;
        }

        let month_budgets: Vec<&Budget> =
            budgets.iter().filter(|b| b.month == month).collect();

        // The breakdown covers every category that either saw spending or
        // has a budget set, in the declaration order of the closed set.
        let categories = Category::ALL
            .iter()
            .filter_map(|&cat| {
                let spent = spent_by_category
                    .get(&cat.to_string())
                    .copied()
                    .unwrap_or_else(Money::zero);
                let limit = month_budgets
                    .iter()
                    .find(|b| b.category == cat)
                    .map(|b| b.limit);
                if spent.is_zero() && limit.is_none() {
                    return None;
                }
                let remaining = limit.map(|l| l - spent);
                let percent_used = limit.and_then(|l| {
                    let cents = l.to_cents();
                    if cents > 0 {
                        Some((spent.to_cents() * 100 / cents).max(0) as u32)
                    } else {
                        None
                    }
                });
                Some(CategorySummary {
                    category: cat,
                    spent,
                    limit,
                    remaining,
                    percent_used,
                })
            })
            .collect();

        MonthlySummary {
            month,
            total_spent,
            categories,
        }
    }

    pub fn over_budget(&self) -> Vec<&CategorySummary> {
        self.categories
            .iter()
            .filter(|c| c.is_over_budget())
            .collect()
    }

    /// Overall utilization across every budgeted category, whole percent.
    /// Absent when no budget is set for the month.
    pub fn budget_utilization(&self) -> Option<u32> {
        let total_limit: i64 = self
            .categories
            .iter()
            .filter_map(|c| c.limit.map(Money::to_cents))
            .sum();
        if total_limit <= 0 {
            return None;
        }
        let budgeted_spend: i64 = self
            .categories
            .iter()
            .filter(|c| c.limit.is_some())
            .map(|c| c.spent.to_cents())
            .sum();
        Some((budgeted_spend * 100 / total_limit).max(0) as u32)
    }
}
