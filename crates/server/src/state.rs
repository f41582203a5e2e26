use std::sync::Arc;

use smartspend_ocr::{OcrBackend, ReceiptPipeline};
use smartspend_storage::DbPool;

/// The pipeline is built once in `main` (or a test harness) and shared by
/// every handler; the backend is type-erased so the same state works with
/// mock and tesseract recognizers.
pub type SharedPipeline = Arc<ReceiptPipeline<Arc<dyn OcrBackend>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub pipeline: SharedPipeline,
}
