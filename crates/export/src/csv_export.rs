use std::io::Write;

use chrono::NaiveDate;
use smartspend_core::{Expense, MonthlySummary};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Suggested download name, date-stamped like `smartspend_expenses_2024-03-15.csv`.
pub fn expenses_filename(today: NaiveDate) -> String {
    format!("smartspend_expenses_{}.csv", today.format("%Y-%m-%d"))
}

/// One row per expense, newest-first ordering preserved from the caller.
/// Amounts are decimal strings ("45.99"), not cents.
pub fn write_expenses_csv<W: Write>(writer: W, expenses: &[Expense]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Date", "Title", "Amount", "Category", "Notes", "Source"])?;
    for exp in expenses {
        wtr.write_record([
            exp.date.to_string().as_str(),
            exp.title.as_deref().unwrap_or(""),
            exp.amount.to_string().as_str(),
            exp.category.to_string().as_str(),
            exp.notes.as_str(),
            exp.source.to_string().as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Per-category breakdown for one month. Budget columns are blank for
/// categories without a limit.
pub fn write_summary_csv<W: Write>(writer: W, summary: &MonthlySummary) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Category", "Spent", "Limit", "Remaining", "Percent Used"])?;
    for cat in &summary.categories {
        wtr.write_record([
            cat.category.to_string(),
            cat.spent.to_string(),
            cat.limit.map(|m| m.to_string()).unwrap_or_default(),
            cat.remaining.map(|m| m.to_string()).unwrap_or_default(),
            cat.percent_used.map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.write_record([
        "Total".to_string(),
        summary.total_spent.to_string(),
        String::new(),
        String::new(),
        String::new(),
    ])?;
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartspend_core::{
        Budget, BudgetMonth, Category, ExpenseSource, Money, RecurringInterval,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(cents: i64, category: Category, notes: &str) -> Expense {
        Expense {
            id: 1,
            title: Some("Lunch".to_string()),
            amount: Money::from_cents(cents),
            category,
            date: date(2024, 3, 15),
            notes: notes.to_string(),
            source: ExpenseSource::Manual,
            recurring: RecurringInterval::None,
            ocr_raw: None,
            ocr_parsed: None,
            created_at: None,
        }
    }

    fn render_expenses(expenses: &[Expense]) -> String {
        let mut buf = Vec::new();
        write_expenses_csv(&mut buf, expenses).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn expenses_csv_has_header_and_rows() {
        let out = render_expenses(&[expense(4599, Category::Food, "pizza night")]);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Date,Title,Amount,Category,Notes,Source"));
        assert_eq!(lines.next(), Some("2024-03-15,Lunch,45.99,food,pizza night,manual"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn notes_with_commas_and_quotes_are_escaped() {
        let out = render_expenses(&[expense(100, Category::Other, "rain, \"heavy\"")]);
        assert!(out.contains("\"rain, \"\"heavy\"\"\""));
    }

    #[test]
    fn empty_expense_list_yields_header_only() {
        let out = render_expenses(&[]);
        assert_eq!(out.trim_end(), "Date,Title,Amount,Category,Notes,Source");
    }

    #[test]
    fn summary_csv_includes_budget_columns_and_total() {
        let month = BudgetMonth::new(2024, 3).unwrap();
        let expenses = vec![expense(2500, Category::Food, "")];
        let budgets = vec![Budget::new(Category::Food, Money::from_cents(5000), month)];
        let summary = MonthlySummary::compute(month, &expenses, &budgets);

        let mut buf = Vec::new();
        write_summary_csv(&mut buf, &summary).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert!(out.starts_with("Category,Spent,Limit,Remaining,Percent Used\n"));
        assert!(out.contains("food,25.00,50.00,25.00,50"));
        assert!(out.contains("Total,25.00,,,"));
    }

    #[test]
    fn unbudgeted_category_has_blank_budget_columns() {
        let month = BudgetMonth::new(2024, 3).unwrap();
        let expenses = vec![expense(999, Category::Transport, "")];
        let summary = MonthlySummary::compute(month, &expenses, &[]);

        let mut buf = Vec::new();
        write_summary_csv(&mut buf, &summary).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("transport,9.99,,,"));
    }

    #[test]
    fn filename_is_date_stamped() {
        assert_eq!(
            expenses_filename(date(2024, 3, 15)),
            "smartspend_expenses_2024-03-15.csv"
        );
    }
}
