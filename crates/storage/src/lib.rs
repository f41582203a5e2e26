pub mod db;

pub use db::{
    add_goal_contribution, create_db, delete_expense, delete_goal, delete_income, delete_saving,
    find_scan_by_hash, get_budgets_for_month, get_expense, get_setting, insert_expense,
    insert_goal, insert_income, insert_saving, insert_scan, list_expenses, list_goals, list_income,
    list_savings, set_setting, update_expense, update_income, update_saving, upsert_budget, DbPool,
    ScanRecord,
};
