mod common;

use base64::{engine::general_purpose, Engine as _};
use common::{full_request, minimal_request, TestApp};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn generate_pdf_returns_pdf_document() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/generate-pdf", &minimal_request()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    let disposition = response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"report_"));
    assert!(disposition.ends_with(".pdf\""));

    let bytes = response.bytes().await.expect("Failed to read body");
    assert!(!bytes.is_empty());
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn generate_pdf_with_all_fields_names_file_after_recipient() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/generate-pdf", &full_request()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"report_Maria_Garcia_2025-06-15.pdf\""
    );
    let bytes = response.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn base64_output_matches_binary_output() {
    let app = TestApp::spawn().await;
    let request = full_request();

    let binary = app
        .post_json("/generate-pdf", &request)
        .await
        .bytes()
        .await
        .unwrap();

    let response = app.post_json("/generate-pdf-base64", &request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "report_Maria_Garcia_2025-06-15.pdf");
    let decoded = general_purpose::STANDARD
        .decode(body["pdf_base64"].as_str().unwrap())
        .expect("valid base64");
    assert_eq!(decoded, binary.to_vec());
}

#[tokio::test]
async fn identical_requests_produce_identical_documents() {
    let app = TestApp::spawn().await;
    let request = full_request();

    let first = app.post_json("/generate-pdf", &request).await.bytes().await.unwrap();
    let second = app.post_json("/generate-pdf", &request).await.bytes().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn boundary_scores_are_accepted() {
    let app = TestApp::spawn().await;
    let request = json!({
        "skills": [
            {"name": "Communication", "score": 0},
            {"name": "Delegation", "score": 100},
            {"name": "Coaching", "score": 50}
        ]
    });

    let response = app.post_json("/generate-pdf", &request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn single_skill_report_is_generated() {
    let app = TestApp::spawn().await;
    let request = json!({ "skills": [{"name": "Communication", "score": 42}] });

    let response = app.post_json("/generate-pdf", &request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.bytes().await.unwrap().starts_with(b"%PDF-"));
}

#[tokio::test]
async fn out_of_range_scores_are_rejected_on_every_endpoint() {
    let app = TestApp::spawn().await;
    let invalid = [
        json!({"skills": [{"name": "Communication", "score": 101}]}),
        json!({"skills": [{"name": "Communication", "score": -1}]}),
    ];

    for request in &invalid {
        for path in ["/generate-pdf", "/generate-pdf-base64", "/generate-pdf-url"] {
            let response = app.post_json(path, request).await;
            assert_eq!(
                response.status(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "{} accepted {}",
                path,
                request
            );
            let body: serde_json::Value = response.json().await.unwrap();
            assert_eq!(body["error"], "Validation error");
            assert!(body.get("pdf_base64").is_none());
        }
    }
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = TestApp::spawn().await;
    let cases = [
        json!({"skills": []}),
        json!({}),
        json!({"skills": [{"name": "", "score": 10}]}),
        json!({"skills": [{"name": "Delegation", "score": 10}, {"name": "delegation", "score": 20}]}),
        json!({"skills": [{"name": "Delegation", "score": "high"}]}),
        json!({"skills": [{"name": "Delegation", "score": 10}], "recipient": {"name": "Ana", "date": "June 1"}}),
    ];

    for request in &cases {
        let response = app.post_json("/generate-pdf", request).await;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "accepted {}",
            request
        );
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.post_raw("/generate-pdf", r#"{"skills": [{"name": "#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
