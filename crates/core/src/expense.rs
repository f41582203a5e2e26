use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::Category;
use super::money::Money;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must be greater than zero (got {0})")]
    NonPositiveAmount(Money),
    #[error("Amount {0} exceeds the representable range")]
    AmountOutOfRange(Money),
    #[error("Date {0} is before the epoch floor")]
    DateBeforeEpoch(NaiveDate),
}

/// Shared gate for every monetary field that will be stored as cents.
pub(crate) fn check_amount(amount: Money) -> Result<(), ValidationError> {
    if !amount.is_positive() {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if amount.try_to_cents().is_none() {
        return Err(ValidationError::AmountOutOfRange(amount));
    }
    Ok(())
}

pub(crate) fn check_date(date: NaiveDate) -> Result<(), ValidationError> {
    let floor = NaiveDate::from_ymd_opt(EPOCH_FLOOR.0, EPOCH_FLOOR.1, EPOCH_FLOOR.2).unwrap();
    if date < floor {
        return Err(ValidationError::DateBeforeEpoch(date));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseSource {
    #[default]
    Manual,
    Receipt,
}

impl std::fmt::Display for ExpenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseSource::Manual => write!(f, "manual"),
            ExpenseSource::Receipt => write!(f, "receipt"),
        }
    }
}

impl std::str::FromStr for ExpenseSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(ExpenseSource::Manual),
            "receipt" => Ok(ExpenseSource::Receipt),
            other => Err(format!("Unknown expense source: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecurringInterval {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for RecurringInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurringInterval::None => write!(f, "none"),
            RecurringInterval::Daily => write!(f, "daily"),
            RecurringInterval::Weekly => write!(f, "weekly"),
            RecurringInterval::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for RecurringInterval {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RecurringInterval::None),
            "daily" => Ok(RecurringInterval::Daily),
            "weekly" => Ok(RecurringInterval::Weekly),
            "monthly" => Ok(RecurringInterval::Monthly),
            other => Err(format!("Unknown recurring interval: '{other}'")),
        }
    }
}

/// Audit metadata carried alongside an expense that originated from a scan.
/// Stored verbatim so the user can later see what the pipeline inferred.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrAudit {
    pub merchant: Option<String>,
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
    /// The amount the parser picked before any user edit.
    pub original_amount: Option<Money>,
    pub parsed_lines: Vec<String>,
    /// True when no date shape parsed and the processing date was used.
    pub date_inferred: bool,
}

/// An inferred, user-editable candidate expense. Created once per scan
/// attempt, edited field by field, then either confirmed or discarded.
/// Nothing is persisted until `confirm` succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftExpense {
    pub amount: Money,
    pub category: Category,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub notes: String,
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
    pub raw_text: String,
    pub parsed_lines: Vec<String>,
    pub original_amount: Option<Money>,
    pub date_inferred: bool,
}

impl DraftExpense {
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Validation gate before persistence. User edits override anything the
    /// pipeline inferred. Takes `&self` so a rejected draft survives for
    /// correction.
    pub fn confirm(&self) -> Result<ValidatedExpense, ValidationError> {
        ValidatedExpense::new(
            self.merchant.clone(),
            self.amount,
            self.category,
            self.date,
            self.notes.clone(),
            ExpenseSource::Receipt,
            RecurringInterval::None,
            Some(self.raw_text.clone()),
            Some(OcrAudit {
                merchant: self.merchant.clone(),
                confidence: self.confidence,
                matched_keywords: self.matched_keywords.clone(),
                original_amount: self.original_amount,
                parsed_lines: self.parsed_lines.clone(),
                date_inferred: self.date_inferred,
            }),
        )
    }
}

/// An expense that has passed the validation gate and may be persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedExpense {
    pub title: Option<String>,
    pub amount: Money,
    pub category: Category,
    pub date: NaiveDate,
    pub notes: String,
    pub source: ExpenseSource,
    pub recurring: RecurringInterval,
    pub ocr_raw: Option<String>,
    pub ocr_parsed: Option<OcrAudit>,
}

/// Dates before this are treated as corrupt input rather than history.
const EPOCH_FLOOR: (i32, u32, u32) = (1970, 1, 1);

impl ValidatedExpense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: Option<String>,
        amount: Money,
        category: Category,
        date: NaiveDate,
        notes: String,
        source: ExpenseSource,
        recurring: RecurringInterval,
        ocr_raw: Option<String>,
        ocr_parsed: Option<OcrAudit>,
    ) -> Result<Self, ValidationError> {
        check_amount(amount)?;
        check_date(date)?;
        Ok(ValidatedExpense {
            title,
            amount,
            category,
            date,
            notes,
            source,
            recurring,
            ocr_raw,
            ocr_parsed,
        })
    }

    /// Manual-entry constructor (no OCR provenance).
    pub fn manual(
        title: Option<String>,
        amount: Money,
        category: Category,
        date: NaiveDate,
        notes: String,
        recurring: RecurringInterval,
    ) -> Result<Self, ValidationError> {
        Self::new(
            title,
            amount,
            category,
            date,
            notes,
            ExpenseSource::Manual,
            recurring,
            None,
            None,
        )
    }
}

/// A persisted expense row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub title: Option<String>,
    pub amount: Money,
    pub category: Category,
    pub date: NaiveDate,
    pub notes: String,
    pub source: ExpenseSource,
    pub recurring: RecurringInterval,
    pub ocr_raw: Option<String>,
    pub ocr_parsed: Option<OcrAudit>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
