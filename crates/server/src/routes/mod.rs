pub mod budgets;
pub mod expenses;
pub mod goals;
pub mod income;
pub mod reports;
pub mod savings;
pub mod scan;
pub mod settings;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Receipt uploads are capped at the boundary.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/scan",
            post(scan::scan_receipt).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            put(expenses::update).delete(expenses::remove),
        )
        .route("/income", get(income::list).post(income::create))
        .route("/income/{id}", put(income::update).delete(income::remove))
        .route("/savings", get(savings::list).post(savings::create))
        .route(
            "/savings/{id}",
            put(savings::update).delete(savings::remove),
        )
        .route("/budgets", get(budgets::for_month).put(budgets::upsert))
        .route("/summary", get(reports::summary))
        .route("/goals", get(goals::list).post(goals::create))
        .route("/goals/{id}/contribute", post(goals::contribute))
        .route("/goals/{id}", delete(goals::remove))
        .route("/export/expenses.csv", get(reports::export_expenses))
        .route(
            "/settings/{key}",
            get(settings::get).put(settings::put),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use smartspend_ocr::{Classifier, MockRecognizer, OcrBackend, ReceiptPipeline};
    use tower::ServiceExt;

    use super::*;

    async fn test_app(ocr_text: &str) -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let db = smartspend_storage::create_db(&dir.path().join("test.db"))
            .await
            .unwrap();
        let recognizer: Arc<dyn OcrBackend> = Arc::new(MockRecognizer::new(ocr_text));
        let pipeline = Arc::new(ReceiptPipeline::new(
            recognizer,
            Classifier::default(),
            dir.path().join("attachments"),
        ));
        let state = AppState { db, pipeline };
        let app = Router::new().nest("/api", api_routes()).with_state(state);
        (dir, app)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn tiny_png() -> Vec<u8> {
        use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
        use std::io::Cursor;
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([128u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn expense_payload(amount: &str, category: &str, date: &str) -> Value {
        json!({
            "title": "Test",
            "amount": amount,
            "category": category,
            "date": date,
        })
    }

    #[tokio::test]
    async fn create_and_list_expenses() {
        let (_dir, app) = test_app("").await;

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                expense_payload("45.99", "food", "2024-03-15"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["category"], "food");
        assert!(created["id"].as_i64().unwrap() > 0);

        let resp = app.oneshot(get_request("/api/expenses")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let listed = body_json(resp).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_amount_expense_is_unprocessable() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                expense_payload("0", "food", "2024-03-15"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("greater than zero"));
    }

    #[tokio::test]
    async fn oversized_amount_expense_is_unprocessable() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                expense_payload("1000000000000000000.00", "food", "2024-03-15"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("range"));
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                expense_payload("5.00", "gambling", "2024-03-15"),
            ))
            .await
            .unwrap();
        // Serde rejects the out-of-set category before the handler runs.
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn list_with_half_open_range_is_bad_request() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(get_request("/api/expenses?start=2024-03-01"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_and_delete_expense() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                expense_payload("10.00", "food", "2024-03-15"),
            ))
            .await
            .unwrap();
        let id = body_json(resp).await["id"].as_i64().unwrap();

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/expenses/{id}"),
                expense_payload("12.50", "transport", "2024-03-16"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["category"], "transport");

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/expenses/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/expenses/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scan_returns_draft_and_flags_duplicates() {
        let (_dir, app) = test_app("Joe's Pizza\n15/03/2024\nTotal $45.99").await;
        let image = tiny_png();

        let scan = |bytes: Vec<u8>| {
            Request::builder()
                .method("POST")
                .uri("/api/scan")
                .header("content-type", "image/png")
                .body(Body::from(bytes))
                .unwrap()
        };

        let resp = app.clone().oneshot(scan(image.clone())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["duplicate"], false);
        assert_eq!(body["draft"]["category"], "food");
        assert_eq!(body["draft"]["amount"], "45.99");
        assert_eq!(body["draft"]["merchant"], "Joe's Pizza");
        assert_eq!(body["draft"]["date"], "2024-03-15");

        let resp = app.oneshot(scan(image)).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["duplicate"], true);
    }

    #[tokio::test]
    async fn scan_rejects_empty_body() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/scan")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scan_of_corrupt_image_is_unprocessable() {
        let (_dir, app) = test_app("irrelevant").await;
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/scan")
                    .header("content-type", "image/png")
                    .body(Body::from("not an image"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn budget_upsert_and_summary() {
        let (_dir, app) = test_app("").await;

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/budgets",
                json!({"category": "food", "limit": "50.00", "year": 2024, "month": 3}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // Overwrite, not duplicate.
        app.clone()
            .oneshot(json_request(
                "PUT",
                "/api/budgets",
                json!({"category": "food", "limit": "75.00", "year": 2024, "month": 3}),
            ))
            .await
            .unwrap();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                expense_payload("30.00", "food", "2024-03-10"),
            ))
            .await
            .unwrap();

        let resp = app
            .clone()
            .oneshot(get_request("/api/budgets?year=2024&month=3"))
            .await
            .unwrap();
        let budgets = body_json(resp).await;
        assert_eq!(budgets.as_array().unwrap().len(), 1);
        assert_eq!(budgets[0]["limit"], "75.00");

        let resp = app
            .oneshot(get_request("/api/summary?year=2024&month=3"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let summary = body_json(resp).await;
        assert_eq!(summary["total_spent"], "30.00");
        assert_eq!(summary["categories"][0]["category"], "food");
        assert_eq!(summary["categories"][0]["percent_used"], 40);
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(get_request("/api/budgets?year=2024&month=13"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn goal_lifecycle() {
        let (_dir, app) = test_app("").await;

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/goals",
                json!({"title": "Vacation", "target_amount": "1000.00"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(resp).await["id"].as_i64().unwrap();

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/goals/{id}/contribute"),
                json!({"amount": "250.00"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app.clone().oneshot(get_request("/api/goals")).await.unwrap();
        let goals = body_json(resp).await;
        assert_eq!(goals[0]["current_amount"], "250.00");

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/goals/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn zero_target_goal_is_unprocessable() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/goals",
                json!({"title": "Nothing", "target_amount": "0"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn income_lifecycle() {
        let (_dir, app) = test_app("").await;

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/income",
                json!({"source": "Salary", "amount": "2500.00", "date": "2024-03-01"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(resp).await["id"].as_i64().unwrap();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/income",
                json!({"source": "Freelance", "amount": "400.00", "date": "2024-02-15"}),
            ))
            .await
            .unwrap();

        let resp = app.clone().oneshot(get_request("/api/income")).await.unwrap();
        let listed = body_json(resp).await;
        assert_eq!(listed.as_array().unwrap().len(), 2);
        // Most recent income date first.
        assert_eq!(listed[0]["source"], "Salary");
        assert_eq!(listed[0]["amount"], "2500.00");

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/income/{id}"),
                json!({"source": "Salary", "amount": "2600.00", "date": "2024-03-01"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["amount"], "2600.00");

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/income/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn zero_amount_income_is_unprocessable() {
        let (_dir, app) = test_app("").await;
        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/income",
                json!({"source": "Refund", "amount": "0", "date": "2024-03-01"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn savings_entry_lifecycle() {
        let (_dir, app) = test_app("").await;

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/savings",
                json!({"amount": "50.00", "category": "emergency fund", "date": "2024-03-01"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(resp).await["id"].as_i64().unwrap();

        let resp = app.clone().oneshot(get_request("/api/savings")).await.unwrap();
        let listed = body_json(resp).await;
        assert_eq!(listed[0]["category"], "emergency fund");
        assert_eq!(listed[0]["amount"], "50.00");

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/savings/{id}"),
                json!({"amount": "75.00", "category": "investments", "date": "2024-03-02"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["category"], "investments");

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/savings/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/savings/{id}"),
                json!({"amount": "10.00", "category": "misc", "date": "2024-03-03"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn settings_roundtrip_over_http() {
        let (_dir, app) = test_app("").await;

        let resp = app
            .clone()
            .oneshot(get_request("/api/settings/currency"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/settings/currency",
                json!({"value": "₹"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(get_request("/api/settings/currency"))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["value"], "₹");
    }

    #[tokio::test]
    async fn csv_export_has_csv_content_type() {
        let (_dir, app) = test_app("").await;
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                expense_payload("9.99", "transport", "2024-03-15"),
            ))
            .await
            .unwrap();

        let resp = app
            .oneshot(get_request("/api/export/expenses.csv"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["content-type"],
            "text/csv; charset=utf-8"
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Date,Title,Amount,Category,Notes,Source"));
        assert!(text.contains("2024-03-15,Test,9.99,transport,,manual"));
    }
}
