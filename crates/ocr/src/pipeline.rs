use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use smartspend_core::{DraftExpense, Money};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::classify::Classifier;
use crate::hash;
use crate::parse::{self, ParsedReceipt};
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};

/// How much raw OCR text is carried into the notes field for audit.
const NOTES_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] preprocess::PreprocessError),
    #[error("Text extraction failed: {0}")]
    Extraction(#[from] OcrError),
}

/// The result of a single scan attempt.
#[derive(Debug)]
pub struct ScanResult {
    /// SHA-256 hex digest of the original upload — the dedup key.
    pub hash_hex: String,
    /// Where the original image was stored in the attachments tree.
    pub attachment_path: PathBuf,
    /// Raw recognized text, possibly empty.
    pub ocr_text: String,
    /// The user-editable draft assembled from parsing + classification.
    pub draft: DraftExpense,
}

/// Orchestrates one scan: hash → content-store → preprocess → recognize →
/// parse + classify → draft. Extraction failure aborts before the parser
/// and classifier ever run. Each scan is independent; two scans in
/// sequence share nothing.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: R,
    classifier: Classifier,
    attachments_dir: PathBuf,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, classifier: Classifier, attachments_dir: PathBuf) -> Self {
        Self {
            recognizer,
            classifier,
            attachments_dir,
        }
    }

    pub async fn scan_file(&self, path: &Path) -> Result<ScanResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_lowercase();
        self.scan_bytes(&bytes, &ext).await
    }

    /// Process raw image bytes from an upload or camera capture.
    pub async fn scan_bytes(&self, data: &[u8], ext: &str) -> Result<ScanResult, PipelineError> {
        let hash_hex = hash::to_hex(&hash::sha256_bytes(data));

        let dest = hash::content_path(&self.attachments_dir, &hash_hex, ext);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, data).await?;

        let image_bytes = preprocess::normalize_for_ocr(data)?;
        let ocr_text = self.recognizer.recognize(&image_bytes)?;
        tracing::info!(hash = %hash_hex, chars = ocr_text.len(), "OCR text extracted");

        let draft = self.draft_from_text(&ocr_text, chrono::Utc::now().date_naive());

        Ok(ScanResult {
            hash_hex,
            attachment_path: dest,
            ocr_text,
            draft,
        })
    }

    /// Parse and classify already-extracted text into a draft. Pure given
    /// the processing date, so callers may re-score after the user edits
    /// the text.
    pub fn draft_from_text(&self, text: &str, today: NaiveDate) -> DraftExpense {
        let parsed = parse::parse_with_today(text, today);
        let merchant = parsed.merchant.clone().unwrap_or_default();
        let guess = self.classifier.classify(text, &merchant);
        assemble_draft(parsed, guess.category, guess.confidence, guess.matched_keywords)
    }
}

fn assemble_draft(
    parsed: ParsedReceipt,
    category: smartspend_core::Category,
    confidence: f32,
    matched_keywords: Vec<String>,
) -> DraftExpense {
    // An amount too large for cent storage is OCR noise, not a price;
    // treat it the same as no amount at all.
    let parsed_amount = parsed
        .amount
        .map(Money::from_decimal)
        .filter(|m| m.try_to_cents().is_some());
    let amount = parsed_amount.unwrap_or_else(Money::zero);

    // Merchant plus a truncated excerpt of the raw text: a display and
    // audit convenience, not a serialization format.
    let excerpt: String = parsed.source_text.chars().take(NOTES_EXCERPT_CHARS).collect();
    let ellipsis = if parsed.source_text.chars().count() > NOTES_EXCERPT_CHARS {
        "..."
    } else {
        ""
    };
    let notes = format!(
        "{}\n\nRaw OCR: {excerpt}{ellipsis}",
        parsed.merchant.as_deref().unwrap_or("Receipt")
    );

    DraftExpense {
        amount,
        category,
        date: parsed.date,
        merchant: parsed.merchant,
        notes,
        confidence,
        matched_keywords,
        raw_text: parsed.source_text,
        parsed_lines: parsed.lines,
        original_amount: parsed_amount,
        date_inferred: parsed.date_inferred,
    }
}

// ── Drop-folder intake ────────────────────────────────────────────────────────

/// Spawn a notify watcher on `watch_dir` that sends newly created file paths
/// to `tx`. The returned watcher must be kept alive for watching to
/// continue.
pub fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(ev) = event {
            if matches!(ev.kind, EventKind::Create(_)) {
                for path in ev.paths {
                    let _ = tx.try_send(path);
                }
            }
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
