use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use smartspend_core::{
    Budget, BudgetMonth, Category, DateRange, Expense, ExpenseSource, Income, Money, OcrAudit,
    RecurringInterval, SavingEntry, SavingsGoal, ValidatedExpense,
};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            amount_cents INTEGER NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            source TEXT NOT NULL DEFAULT 'manual',
            recurring TEXT NOT NULL DEFAULT 'none',
            ocr_raw TEXT,
            ocr_parsed TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            limit_cents INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            UNIQUE (category, year, month)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS savings_goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            target_cents INTEGER NOT NULL,
            current_cents INTEGER NOT NULL DEFAULT 0,
            deadline TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS savings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount_cents INTEGER NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_hash TEXT NOT NULL,
            ext TEXT NOT NULL,
            attachment_path TEXT NOT NULL,
            ocr_text TEXT NOT NULL,
            merchant TEXT,
            amount_cents INTEGER NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            confidence REAL NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ── Expenses ─────────────────────────────────────────────────────────────────

type ExpenseRow = (
    i64,            // id
    Option<String>, // title
    i64,            // amount_cents
    String,         // category
    String,         // date
    String,         // notes
    String,         // source
    String,         // recurring
    Option<String>, // ocr_raw
    Option<String>, // ocr_parsed
    String,         // created_at
);

const EXPENSE_COLUMNS: &str =
    "id, title, amount_cents, category, date, notes, source, recurring, ocr_raw, ocr_parsed, created_at";

fn expense_from_row(r: ExpenseRow) -> Expense {
    Expense {
        id: r.0,
        title: r.1,
        amount: Money::from_cents(r.2),
        // Lenient decode: unknown tokens fall back rather than poisoning
        // the whole listing.
        category: Category::from_str(&r.3).unwrap_or(Category::Other),
        date: r.4.parse().unwrap_or_default(),
        notes: r.5,
        source: ExpenseSource::from_str(&r.6).unwrap_or_default(),
        recurring: RecurringInterval::from_str(&r.7).unwrap_or_default(),
        ocr_raw: r.8,
        ocr_parsed: r.9.and_then(|s| serde_json::from_str::<OcrAudit>(&s).ok()),
        created_at: chrono::NaiveDateTime::parse_from_str(&r.10, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|dt| dt.and_utc()),
    }
}

pub async fn insert_expense(pool: &DbPool, exp: &ValidatedExpense) -> Result<i64, sqlx::Error> {
    let ocr_parsed = exp
        .ocr_parsed
        .as_ref()
        .and_then(|a| serde_json::to_string(a).ok());
    let row = sqlx::query(
        r#"
        INSERT INTO expenses (title, amount_cents, category, date, notes, source, recurring, ocr_raw, ocr_parsed)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&exp.title)
    .bind(exp.amount.to_cents())
    .bind(exp.category.to_string())
    .bind(exp.date.to_string())
    .bind(&exp.notes)
    .bind(exp.source.to_string())
    .bind(exp.recurring.to_string())
    .bind(&exp.ocr_raw)
    .bind(ocr_parsed)
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

pub async fn get_expense(pool: &DbPool, id: i64) -> Result<Option<Expense>, sqlx::Error> {
    let row = sqlx::query_as::<_, ExpenseRow>(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(expense_from_row))
}

/// Newest first; optionally restricted to an inclusive date range.
pub async fn list_expenses(
    pool: &DbPool,
    range: Option<DateRange>,
) -> Result<Vec<Expense>, sqlx::Error> {
    let rows = match range {
        Some(r) => {
            sqlx::query_as::<_, ExpenseRow>(&format!(
                "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE date >= ? AND date <= ? ORDER BY date DESC, id DESC"
            ))
            .bind(r.start.to_string())
            .bind(r.end.to_string())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ExpenseRow>(&format!(
                "SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY date DESC, id DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.into_iter().map(expense_from_row).collect())
}

pub async fn update_expense(
    pool: &DbPool,
    id: i64,
    exp: &ValidatedExpense,
) -> Result<bool, sqlx::Error> {
    let ocr_parsed = exp
        .ocr_parsed
        .as_ref()
        .and_then(|a| serde_json::to_string(a).ok());
    let result = sqlx::query(
        r#"
        UPDATE expenses
        SET title = ?, amount_cents = ?, category = ?, date = ?, notes = ?,
            source = ?, recurring = ?, ocr_raw = ?, ocr_parsed = ?
        WHERE id = ?
        "#,
    )
    .bind(&exp.title)
    .bind(exp.amount.to_cents())
    .bind(exp.category.to_string())
    .bind(exp.date.to_string())
    .bind(&exp.notes)
    .bind(exp.source.to_string())
    .bind(exp.recurring.to_string())
    .bind(&exp.ocr_raw)
    .bind(ocr_parsed)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_expense(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Budgets ──────────────────────────────────────────────────────────────────

/// One budget per (category, month) — repeated writes overwrite the limit.
pub async fn upsert_budget(pool: &DbPool, budget: &Budget) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO budgets (category, limit_cents, year, month)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (category, year, month) DO UPDATE SET limit_cents = excluded.limit_cents
        RETURNING id
        "#,
    )
    .bind(budget.category.to_string())
    .bind(budget.limit.to_cents())
    .bind(budget.month.year)
    .bind(budget.month.month)
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

pub async fn get_budgets_for_month(
    pool: &DbPool,
    month: BudgetMonth,
) -> Result<Vec<Budget>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, i64)>(
        "SELECT id, category, limit_cents FROM budgets WHERE year = ? AND month = ? ORDER BY category",
    )
    .bind(month.year)
    .bind(month.month)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, category, limit_cents)| Budget {
            id: Some(id),
            category: Category::from_str(&category).unwrap_or(Category::Other),
            limit: Money::from_cents(limit_cents),
            month,
        })
        .collect())
}

// ── Savings goals ────────────────────────────────────────────────────────────

pub async fn insert_goal(pool: &DbPool, goal: &SavingsGoal) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO savings_goals (title, target_cents, current_cents, deadline) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&goal.title)
    .bind(goal.target_amount.to_cents())
    .bind(goal.current_amount.to_cents())
    .bind(goal.deadline.map(|d| d.to_string()))
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

pub async fn list_goals(pool: &DbPool) -> Result<Vec<SavingsGoal>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, i64, i64, Option<String>)>(
        "SELECT id, title, target_cents, current_cents, deadline FROM savings_goals ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, title, target, current, deadline)| SavingsGoal {
            id: Some(id),
            title,
            target_amount: Money::from_cents(target),
            current_amount: Money::from_cents(current),
            deadline: deadline.and_then(|d| NaiveDate::from_str(&d).ok()),
        })
        .collect())
}

pub async fn add_goal_contribution(
    pool: &DbPool,
    id: i64,
    amount: Money,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE savings_goals SET current_cents = current_cents + ? WHERE id = ?",
    )
    .bind(amount.to_cents())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_goal(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM savings_goals WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Income ───────────────────────────────────────────────────────────────────

pub async fn insert_income(pool: &DbPool, income: &Income) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO income (source, amount_cents, date) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&income.source)
    .bind(income.amount.to_cents())
    .bind(income.date.to_string())
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

/// Most recent income date first.
pub async fn list_income(pool: &DbPool) -> Result<Vec<Income>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, i64, String)>(
        "SELECT id, source, amount_cents, date FROM income ORDER BY date DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, source, cents, date)| Income {
            id: Some(id),
            source,
            amount: Money::from_cents(cents),
            date: date.parse().unwrap_or_default(),
        })
        .collect())
}

pub async fn update_income(pool: &DbPool, id: i64, income: &Income) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE income SET source = ?, amount_cents = ?, date = ? WHERE id = ?")
        .bind(&income.source)
        .bind(income.amount.to_cents())
        .bind(income.date.to_string())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_income(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM income WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Savings log ──────────────────────────────────────────────────────────────

pub async fn insert_saving(pool: &DbPool, saving: &SavingEntry) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO savings (amount_cents, category, date) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(saving.amount.to_cents())
    .bind(&saving.category)
    .bind(saving.date.to_string())
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

/// Most recently recorded first.
pub async fn list_savings(pool: &DbPool) -> Result<Vec<SavingEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, i64, String, String)>(
        "SELECT id, amount_cents, category, date FROM savings ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, cents, category, date)| SavingEntry {
            id: Some(id),
            amount: Money::from_cents(cents),
            category,
            date: date.parse().unwrap_or_default(),
        })
        .collect())
}

pub async fn update_saving(
    pool: &DbPool,
    id: i64,
    saving: &SavingEntry,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE savings SET amount_cents = ?, category = ?, date = ? WHERE id = ?")
            .bind(saving.amount.to_cents())
            .bind(&saving.category)
            .bind(saving.date.to_string())
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_saving(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM savings WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Scans ────────────────────────────────────────────────────────────────────

/// Audit row for one scan attempt, kept even when the draft is never
/// confirmed.
#[derive(Debug, Clone)]
pub struct ScanRecord {
    pub id: i64,
    pub file_hash: String,
    pub ext: String,
    pub attachment_path: String,
    pub ocr_text: String,
    pub merchant: Option<String>,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: Category,
    pub confidence: f64,
    pub created_at: String,
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_scan(
    pool: &DbPool,
    file_hash: &str,
    ext: &str,
    attachment_path: &str,
    ocr_text: &str,
    merchant: Option<&str>,
    amount: Money,
    date: NaiveDate,
    category: Category,
    confidence: f64,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO scans (file_hash, ext, attachment_path, ocr_text, merchant, amount_cents, date, category, confidence)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(file_hash)
    .bind(ext)
    .bind(attachment_path)
    .bind(ocr_text)
    .bind(merchant)
    .bind(amount.to_cents())
    .bind(date.to_string())
    .bind(category.to_string())
    .bind(confidence)
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

/// Duplicate-upload check: scans are content-addressed by file hash.
pub async fn find_scan_by_hash(
    pool: &DbPool,
    file_hash: &str,
) -> Result<Option<ScanRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, String, String, String, Option<String>, i64, String, String, f64, String)>(
        r#"
        SELECT id, file_hash, ext, attachment_path, ocr_text, merchant, amount_cents, date, category, confidence, created_at
        FROM scans WHERE file_hash = ? ORDER BY id LIMIT 1
        "#,
    )
    .bind(file_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| ScanRecord {
        id: r.0,
        file_hash: r.1,
        ext: r.2,
        attachment_path: r.3,
        ocr_text: r.4,
        merchant: r.5,
        amount: Money::from_cents(r.6),
        date: r.7.parse().unwrap_or_default(),
        category: Category::from_str(&r.8).unwrap_or(Category::Other),
        confidence: r.9,
        created_at: r.10,
    }))
}

// ── Settings ─────────────────────────────────────────────────────────────────

pub async fn get_setting(pool: &DbPool, key: &str) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String,)>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.0))
}

pub async fn set_setting(pool: &DbPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT (key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
