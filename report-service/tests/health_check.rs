mod common;

use common::TestApp;
use report_service::services::metrics::init_metrics;
use std::sync::Once;

// Initialize metrics once for all tests
static INIT_METRICS: Once = Once::new();

fn ensure_metrics_initialized() {
    INIT_METRICS.call_once(|| {
        init_metrics();
    });
}

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "report-service");
    assert_eq!(body["pdf_store_count"], 0);
    assert_eq!(body["pdf_ttl_minutes"], 30);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let app = TestApp::spawn().await;

    let response = app.get("/").await;

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["service"], "report-service");
    let endpoints = body["endpoints"].as_array().expect("endpoints array");
    assert!(endpoints.iter().any(|e| e == "POST /generate-pdf"));
    assert!(endpoints.iter().any(|e| e == "POST /generate-pdf-base64"));
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    ensure_metrics_initialized();
    let app = TestApp::spawn().await;

    // Generate some traffic first
    let response = app.post_json("/generate-pdf", &common::minimal_request()).await;
    assert!(response.status().is_success());

    let response = app.get("/metrics").await;

    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("reports_generated_total"));
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .header("x-request-id", "trace-me-123")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn out_of_range_chart_size_fails_startup() {
    use report_service::config::ReportConfig;
    use report_service::startup::Application;
    use service_core::error::AppError;

    for (width, height) in [(0, 0), (50, 300), (400, 70000)] {
        let mut config = ReportConfig::default();
        config.common.port = 0;
        config.chart.width_px = width;
        config.chart.height_px = height;

        match Application::build(config).await {
            Err(AppError::ConfigError(_)) => {}
            Err(e) => panic!("unexpected error for {}x{}: {}", width, height, e),
            Ok(_) => panic!("{}x{} charts should be rejected at startup", width, height),
        }
    }
}
