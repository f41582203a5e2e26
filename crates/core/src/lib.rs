pub mod budget;
pub mod category;
pub mod expense;
pub mod goal;
pub mod income;
pub mod money;
pub mod period;
pub mod saving;
pub mod summary;

pub use budget::Budget;
pub use category::Category;
pub use expense::{
    DraftExpense, Expense, ExpenseSource, OcrAudit, RecurringInterval, ValidatedExpense,
    ValidationError,
};
pub use goal::SavingsGoal;
pub use income::Income;
pub use money::Money;
pub use saving::SavingEntry;
pub use period::{BudgetMonth, DateRange};
pub use summary::{CategorySummary, MonthlySummary};
