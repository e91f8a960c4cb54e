//! Server handler tests
//!
//! These run the router in-process with tower's oneshot; no backend is
//! configured, so analysis paths exercise the keyword fallback.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use finsight_core::AnalyzerConfig;

use crate::{router, AppState};

const BOUNDARY: &str = "XFINSIGHTBOUNDARY";

fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(AnalyzerConfig::new(None, None, None), vec![]))
}

fn multipart_upload(filename: &str, content: &str) -> (String, String) {
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n",
        boundary = BOUNDARY,
        filename = filename,
        content = content,
    );
    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_models_endpoint() {
    let app = router(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/models")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["models"].as_array().unwrap().len() >= 3);
    assert_eq!(json["models"][0]["provider"], "openrouter");
}

#[tokio::test]
async fn test_config_status_without_backend() {
    let app = router(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/config/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["llm_available"], false);
    assert!(json["current_model"].is_null());
}

#[tokio::test]
async fn test_configure_swaps_default_analyzer() {
    let state = test_state();

    let response = router(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/configure")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"llm_provider":"openrouter","model_name":"openai/gpt-4o-mini","api_key":"sk-test"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let active = state.current();
    assert!(active.analyzer.backend_available());
    assert_eq!(active.config.model, "openai/gpt-4o-mini");
}

#[tokio::test]
async fn test_configure_rejects_unknown_provider() {
    let response = router(test_state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/configure")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"llm_provider":"carrier-pigeon","model_name":"m","api_key":"k"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rejects_unsupported_extension() {
    let (content_type, body) = multipart_upload("notes.txt", "hello");
    let response = router(test_state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Only CSV and JSON files are supported");
}

#[tokio::test]
async fn test_analyze_csv_fallback_end_to_end() {
    let csv = "date,description,amount\n\
               2024-01-05,Monthly salary,4200.00\n\
               2024-01-09,Corner cafe coffee,-5.25\n";
    let (content_type, body) = multipart_upload("statement.csv", csv);

    let response = router(test_state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let transactions = json["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["type"], "income");
    assert_eq!(transactions[0]["category"], "Salary");
    assert_eq!(transactions[1]["type"], "expense");

    assert_eq!(json["summary"]["total_transactions"], 2);
    let total_income = json["insights"]["summary"]["total_income"].as_f64().unwrap();
    assert!((total_income - 4200.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_analyze_malformed_json_is_client_error() {
    let (content_type, body) = multipart_upload("export.json", "{broken");
    let response = router(test_state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_stream_emits_full_event_sequence() {
    let csv = "date,description,amount\n\
               2024-01-05,Monthly salary,4200.00\n\
               2024-01-09,Grocery market,-64.10\n";
    let (content_type, body) = multipart_upload("statement.csv", csv);

    let response = router(test_state())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze/stream")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("event: analysis_started"));
    assert!(text.contains("event: batch_complete"));
    assert!(text.contains("event: suggestions_generated"));
    assert!(text.contains("event: analysis_complete"));
    assert!(text.contains("\"progress_percentage\":100"));
}
