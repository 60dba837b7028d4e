use crate::dtos::{HealthResponse, ServiceInfo};
use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use crate::SERVICE_NAME;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

const ENDPOINTS: &[&str] = &[
    "GET /health",
    "GET /metrics",
    "POST /generate-pdf",
    "POST /generate-pdf-base64",
    "POST /generate-pdf-url",
    "GET /pdfs",
    "GET /pdfs/:pdf_id",
    "DELETE /pdfs/:pdf_id",
];

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Leadership skills PDF report service".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// Liveness only; never touches the rendering pipeline.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        pdf_store_count: state.store.len(),
        pdf_ttl_minutes: state.store.ttl_minutes(),
    })
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
