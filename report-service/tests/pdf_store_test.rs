mod common;

use common::{full_request, minimal_request, TestApp};
use report_service::config::ReportConfig;
use reqwest::StatusCode;

#[tokio::test]
async fn generated_url_serves_the_stored_pdf() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/generate-pdf-url", &full_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["expires_in_minutes"], 30);
    assert_eq!(body["filename"], "report_Maria_Garcia_2025-06-15.pdf");
    let pdf_id = body["pdf_id"].as_str().unwrap();
    assert_eq!(body["pdf_url"], format!("/pdfs/{}", pdf_id));

    let response = app.get(body["pdf_url"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"report_Maria_Garcia_2025-06-15.pdf\""
    );

    let stored = response.bytes().await.unwrap();
    let direct = app
        .post_json("/generate-pdf", &full_request())
        .await
        .bytes()
        .await
        .unwrap();
    assert_eq!(stored, direct);
}

#[tokio::test]
async fn public_base_url_prefixes_links() {
    let config = ReportConfig {
        public_base_url: Some("https://reports.example.com/".to_string()),
        ..ReportConfig::default()
    };
    let app = TestApp::spawn_with(config).await;

    let body: serde_json::Value = app
        .post_json("/generate-pdf-url", &minimal_request())
        .await
        .json()
        .await
        .unwrap();

    let pdf_id = body["pdf_id"].as_str().unwrap();
    assert_eq!(
        body["pdf_url"],
        format!("https://reports.example.com/pdfs/{}", pdf_id)
    );
}

#[tokio::test]
async fn store_status_reports_count_and_limits() {
    let app = TestApp::spawn().await;

    app.post_json("/generate-pdf-url", &minimal_request()).await;
    app.post_json("/generate-pdf-url", &minimal_request()).await;

    let body: serde_json::Value = app.get("/pdfs").await.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["ttl_minutes"], 30);
    assert_eq!(body["max_items"], 100);

    let health: serde_json::Value = app.get("/health").await.json().await.unwrap();
    assert_eq!(health["pdf_store_count"], 2);
}

#[tokio::test]
async fn deleted_pdf_is_gone() {
    let app = TestApp::spawn().await;

    let body: serde_json::Value = app
        .post_json("/generate-pdf-url", &minimal_request())
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/pdfs/{}", body["pdf_id"].as_str().unwrap());

    let response = app.delete(&path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: serde_json::Value = response.json().await.unwrap();
    assert_eq!(deleted["success"], true);

    assert_eq!(app.get(&path).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&path).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::spawn().await;

    let response = app.get(&format!("/pdfs/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "PDF not found or expired");

    assert_eq!(app.get("/pdfs/not-a-uuid").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/pdfs/not-a-uuid").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_is_capped_at_max_items() {
    let mut config = ReportConfig::default();
    config.store.max_items = 2;
    let app = TestApp::spawn_with(config).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let body: serde_json::Value = app
            .post_json("/generate-pdf-url", &minimal_request())
            .await
            .json()
            .await
            .unwrap();
        ids.push(body["pdf_id"].as_str().unwrap().to_string());
    }

    assert_eq!(app.store.len(), 2);
    assert_eq!(
        app.get(&format!("/pdfs/{}", ids[0])).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/pdfs/{}", ids[2])).await.status(),
        StatusCode::OK
    );
}
