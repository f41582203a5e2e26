pub mod classify;
pub mod hash;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use classify::{CategoryGuess, Classifier, KeywordCatalogue, CONFIDENCE_FLOOR};
pub use hash::{content_path, sha256_bytes, to_hex};
pub use parse::{parse, parse_with_today, ParsedReceipt};
pub use pipeline::{spawn_intake_watcher, PipelineError, ReceiptPipeline, ScanResult};
pub use preprocess::{normalize_for_ocr, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
