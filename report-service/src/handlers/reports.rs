use crate::dtos::{PdfBase64Response, PdfUrlResponse};
use crate::models::{ReportArtifact, ReportRequest};
use crate::services::metrics::{record_report_failure, record_report_generated};
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

pub async fn generate_pdf(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReportRequest>,
) -> Result<Response, AppError> {
    let artifact = render(&state, request, "pdf").await?;
    Ok(pdf_response(artifact.content_type, &artifact.content_disposition(), artifact.bytes))
}

pub async fn generate_pdf_base64(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReportRequest>,
) -> Result<Json<PdfBase64Response>, AppError> {
    let artifact = render(&state, request, "base64").await?;

    Ok(Json(PdfBase64Response {
        success: true,
        pdf_base64: artifact.to_base64(),
        filename: artifact.filename,
    }))
}

pub async fn generate_pdf_url(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReportRequest>,
) -> Result<Json<PdfUrlResponse>, AppError> {
    let artifact = render(&state, request, "url").await?;
    let filename = artifact.filename.clone();
    let pdf_id = state.store.save(artifact.bytes, artifact.filename);

    let path = format!("/pdfs/{}", pdf_id);
    let pdf_url = match state.config.public_base_url.as_deref() {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
        None => path,
    };

    tracing::info!(pdf_id = %pdf_id, filename = %filename, "Report stored for download");

    Ok(Json(PdfUrlResponse {
        success: true,
        pdf_id,
        pdf_url,
        filename,
        expires_in_minutes: state.store.ttl_minutes(),
    }))
}

/// Runs the pipeline on the blocking pool and records the outcome.
async fn render(
    state: &AppState,
    request: ReportRequest,
    format: &'static str,
) -> Result<ReportArtifact, AppError> {
    let pipeline = state.pipeline.clone();
    let brand = state.brand.clone();

    let result = tokio::task::spawn_blocking(move || pipeline.generate(&request, &brand))
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Report task failed: {}", e)))?;

    match result {
        Ok(artifact) => {
            record_report_generated(format);
            Ok(artifact)
        }
        Err(err) => {
            record_report_failure(err.kind());
            tracing::warn!(error = %err, format, "Report generation failed");
            Err(err.into())
        }
    }
}

pub(crate) fn pdf_response(
    content_type: &'static str,
    disposition: &str,
    bytes: impl Into<axum::body::Body>,
) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition.to_string()),
        ],
        bytes.into(),
    )
        .into_response()
}
