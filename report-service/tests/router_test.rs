use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use report_service::config::ReportConfig;
use report_service::error::ReportError;
use report_service::models::{BrandConfig, Palette, SkillScore};
use report_service::services::{
    ChartImage, ChartKind, ChartRenderer, PdfComposer, ReportPipeline,
};
use report_service::startup::{build_router, AppState};
use std::sync::Arc;
use tower::util::ServiceExt;

struct BrokenCharts;

impl ChartRenderer for BrokenCharts {
    fn render(
        &self,
        _kind: ChartKind,
        _skills: &[SkillScore],
        _palette: &Palette,
    ) -> Result<ChartImage, ReportError> {
        Err(ReportError::render("chart backend unavailable"))
    }
}

fn broken_state() -> AppState {
    let pipeline = ReportPipeline::new(Arc::new(BrokenCharts), Arc::new(PdfComposer::new()));
    AppState::new(ReportConfig::default(), BrandConfig::default(), pipeline)
}

fn post(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const VALID: &str = r#"{"skills":[{"name":"Communication","score":85},{"name":"Delegation","score":60}]}"#;

#[tokio::test]
async fn health_succeeds_even_when_rendering_is_broken() {
    let app = build_router(broken_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn render_failure_is_server_error_without_document() {
    let app = build_router(broken_state());

    let response = app.oneshot(post("/generate-pdf", VALID)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/json"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "PDF generation failed");
    assert!(body["details"].as_str().unwrap().contains("chart backend unavailable"));
}

#[tokio::test]
async fn render_failure_stores_nothing() {
    let state = broken_state();
    let store = state.store.clone();
    let app = build_router(state);

    let response = app.oneshot(post("/generate-pdf-url", VALID)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.is_empty());
}

#[tokio::test]
async fn request_id_is_generated_when_missing() {
    let app = build_router(broken_state());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let request_id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = build_router(broken_state());

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = build_router(broken_state());
    let huge = format!(
        r#"{{"skills": [{{"name": "Communication", "score": 50}}], "title": "{}"}}"#,
        "x".repeat(2 * 1024 * 1024)
    );

    let response = app.oneshot(post("/generate-pdf", &huge)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
