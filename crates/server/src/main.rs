use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use smartspend_ocr::{Classifier, KeywordCatalogue, OcrBackend, ReceiptPipeline};

mod error;
mod routes;
mod state;

use state::{AppState, SharedPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = std::env::var("SMARTSPEND_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));
    let attachments_dir = data_dir.join("attachments");
    let intake_dir = data_dir.join("intake");
    std::fs::create_dir_all(&attachments_dir).context("create attachments directory")?;
    std::fs::create_dir_all(&intake_dir).context("create intake directory")?;

    let db = smartspend_storage::create_db(&data_dir.join("smartspend.db"))
        .await
        .context("open database")?;

    let pipeline: SharedPipeline = Arc::new(ReceiptPipeline::new(
        build_recognizer(),
        build_classifier(&data_dir),
        attachments_dir,
    ));

    // ── Drop-folder intake ────────────────────────────────────────────────
    // The channel bridges the notify watcher thread and the async processor.
    let (intake_tx, mut intake_rx) = mpsc::channel::<PathBuf>(64);

    let db_for_intake = db.clone();
    let pipeline_for_intake = pipeline.clone();
    tokio::spawn(async move {
        while let Some(path) = intake_rx.recv().await {
            tracing::info!("Processing intake file: {}", path.display());
            match pipeline_for_intake.scan_file(&path).await {
                Ok(result) => {
                    let ext = path.extension().and_then(|x| x.to_str()).unwrap_or("bin");
                    let d = &result.draft;
                    if let Err(e) = smartspend_storage::insert_scan(
                        &db_for_intake,
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
                    .await
                    {
                        tracing::warn!("Failed to record scan: {e}");
                    } else {
                        tracing::info!("Scan recorded: {}", result.hash_hex);
                    }
                }
                Err(e) => tracing::warn!("Intake scan failed for {}: {e}", path.display()),
            }
        }
    });

    // The watcher must be kept alive for the lifetime of the server.
    let _watcher = smartspend_ocr::spawn_intake_watcher(&intake_dir, intake_tx)
        .context("start intake folder watcher")?;
    tracing::info!("Watching intake folder: {}", intake_dir.display());

    let app = router(AppState { db, pipeline });

    let port: u16 = std::env::var("SMARTSPEND_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(7150);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listen address")?;
    tracing::info!("Listening on http://{addr}");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes::api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health() -> &'static str {
    "OK"
}

/// The keyword catalogue is overridable by dropping a `categories.toml`
/// next to the database; otherwise the built-in table is used.
fn build_classifier(data_dir: &Path) -> Classifier {
    let path = data_dir.join("categories.toml");
    if let Ok(content) = std::fs::read_to_string(&path) {
        match KeywordCatalogue::from_toml(&content) {
            Ok(catalogue) => {
                tracing::info!("Loaded keyword catalogue from {}", path.display());
                return Classifier::new(Arc::new(catalogue));
            }
            Err(e) => tracing::warn!("Ignoring {}: {e}", path.display()),
        }
    }
    Classifier::default()
}

#[cfg(feature = "tesseract")]
fn build_recognizer() -> Arc<dyn OcrBackend> {
    let data_path = std::env::var("SMARTSPEND_TESSDATA").ok();
    Arc::new(smartspend_ocr::recognizer::tesseract_backend::TesseractRecognizer::new(
        data_path, "eng",
    ))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer() -> Arc<dyn OcrBackend> {
    // Without the engine every scan yields an empty draft, which still
    // exercises the full store/parse/confirm flow during development.
    tracing::warn!("Built without the `tesseract` feature; OCR returns empty text");
    Arc::new(smartspend_ocr::MockRecognizer::new(""))
}
