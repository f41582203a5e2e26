use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_currency_amount, r"[₹$€£¥]\s*([\d,]+(?:\.\d{2})?)");
re!(re_bare_amount, r"\b(\d+\.\d{2})\b");

re!(re_date_dmy, r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{2,4})\b");
re!(re_date_ymd, r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b");
re!(re_date_textual,
    r"(?i)\b(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\s+(\d{2,4})\b");

re!(re_pure_number, r"^\d+$");

/// Fields pulled out of raw OCR text. Built once per scan, immutable after
/// construction. `lines` keeps every trimmed non-empty line for downstream
/// display and debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReceipt {
    /// Largest monetary token found, or absent when nothing matched.
    pub amount: Option<Decimal>,
    pub date: NaiveDate,
    /// True when no date shape parsed and `date` is the processing date.
    pub date_inferred: bool,
    pub merchant: Option<String>,
    pub lines: Vec<String>,
    pub source_text: String,
}

/// Parse raw OCR text, defaulting the date to today when absent.
pub fn parse(text: &str) -> ParsedReceipt {
    parse_with_today(text, chrono::Utc::now().date_naive())
}

/// Deterministic variant: the processing date is supplied by the caller.
pub fn parse_with_today(text: &str, today: NaiveDate) -> ParsedReceipt {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    let amount = extract_amount(text);
    let (date, date_inferred) = match extract_date(text) {
        Some(d) => (d, false),
        None => {
            if !text.is_empty() {
                tracing::warn!("No parseable date on receipt; defaulting to {today}");
            }
            (today, true)
        }
    };
    let merchant = extract_merchant(&lines);

    ParsedReceipt {
        amount,
        date,
        date_inferred,
        merchant,
        lines,
        source_text: text.to_string(),
    }
}

// ── Amount ───────────────────────────────────────────────────────────────────

/// Collect every currency-prefixed or bare two-decimal token and keep the
/// maximum: the grand total is typically the largest number on a receipt,
/// dominating subtotals, taxes, and line items.
fn extract_amount(text: &str) -> Option<Decimal> {
    let prefixed = re_currency_amount()
        .captures_iter(text)
        .filter_map(|c| parse_decimal(c.get(1)?.as_str()));
    let bare = re_bare_amount()
        .captures_iter(text)
        .filter_map(|c| parse_decimal(c.get(1)?.as_str()));
    prefixed.chain(bare).max()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(&s.replace(',', "")).ok()
}

// ── Date ─────────────────────────────────────────────────────────────────────

/// The first date-shaped token in document order wins. When shapes match at
/// the same offset, the earlier-declared shape takes precedence.
fn extract_date(text: &str) -> Option<NaiveDate> {
    let candidates = [
        re_date_dmy().find(text).map(|m| (m.start(), DateShape::DayMonthYear)),
        re_date_ymd().find(text).map(|m| (m.start(), DateShape::YearMonthDay)),
        re_date_textual().find(text).map(|m| (m.start(), DateShape::Textual)),
    ];
    let (_, shape) = candidates
        .into_iter()
        .flatten()
        .min_by_key(|&(start, shape)| (start, shape as u8))?;

    match shape {
        DateShape::DayMonthYear => {
            let c = re_date_dmy().captures(text)?;
            let day: u32 = c.get(1)?.as_str().parse().ok()?;
            let month: u32 = c.get(2)?.as_str().parse().ok()?;
            let year = expand_year(c.get(3)?.as_str().parse().ok()?);
            NaiveDate::from_ymd_opt(year, month, day)
        }
        DateShape::YearMonthDay => {
            let c = re_date_ymd().captures(text)?;
            let year: i32 = c.get(1)?.as_str().parse().ok()?;
            let month: u32 = c.get(2)?.as_str().parse().ok()?;
            let day: u32 = c.get(3)?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        DateShape::Textual => {
            let c = re_date_textual().captures(text)?;
            let day: u32 = c.get(1)?.as_str().parse().ok()?;
            let month = abbr_month_to_num(c.get(2)?.as_str())?;
            let year = expand_year(c.get(3)?.as_str().parse().ok()?);
            NaiveDate::from_ymd_opt(year, month, day)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateShape {
    DayMonthYear = 0,
    YearMonthDay = 1,
    Textual = 2,
}

fn expand_year(y: i32) -> i32 {
    if y < 100 { 2000 + y } else { y }
}

fn abbr_month_to_num(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "jan" => Some(1), "feb" => Some(2), "mar" => Some(3), "apr" => Some(4),
        "may" => Some(5), "jun" => Some(6), "jul" => Some(7), "aug" => Some(8),
        "sep" => Some(9), "oct" => Some(10), "nov" => Some(11), "dec" => Some(12),
        _ => None,
    }
}

// ── Merchant ─────────────────────────────────────────────────────────────────

/// The merchant name is usually near the top. Scan the first three lines and
/// take the first that is not an ID number, an amount, or a date.
fn extract_merchant(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .take(3)
        .find(|l| {
            l.chars().count() > 3
                && !re_pure_number().is_match(l)
                && !l.starts_with(['₹', '$', '€', '£', '¥'])
                && !is_date_shaped(l)
        })
        .cloned()
}

fn is_date_shaped(line: &str) -> bool {
    let full = |re: &Regex| re.find(line).is_some_and(|m| m.len() == line.len());
    full(re_date_dmy()) || full(re_date_ymd()) || full(re_date_textual())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
