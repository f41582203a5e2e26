use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use smartspend_core::DraftExpense;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub hash: String,
    pub attachment_path: String,
    /// Identical bytes were scanned before. The scan still runs; the flag
    /// lets the client warn about a probable double entry.
    pub duplicate: bool,
    pub draft: DraftExpense,
}

fn extension_for(headers: &HeaderMap) -> &'static str {
    match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some("image/png") => "png",
        Some("image/jpeg") | Some("image/jpg") => "jpg",
        Some("image/webp") => "webp",
        _ => "bin",
    }
}

/// POST /api/scan — raw image body in, draft expense out.
pub async fn scan_receipt(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ScanResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty request body".to_string()));
    }

    let ext = extension_for(&headers);
    let result = state.pipeline.scan_bytes(&body, ext).await?;

    let duplicate = smartspend_storage::find_scan_by_hash(&state.db, &result.hash_hex)
        .await?
        .is_some();

    let d = &result.draft;
    smartspend_storage::insert_scan(
        &state.db,
        &result.hash_hex,
        ext,
        result.attachment_path.to_str().unwrap_or(""),
        &result.ocr_text,
        d.merchant.as_deref(),
        d.amount,
        d.date,
        d.category,
        f64::from(d.confidence),
    )
    .await?;

    Ok(Json(ScanResponse {
        hash: result.hash_hex,
        attachment_path: result.attachment_path.display().to_string(),
        duplicate,
        draft: result.draft,
    }))
}
