use crate::dtos::{DeleteResponse, StoreStatusResponse};
use crate::handlers::reports::pdf_response;
use crate::models::{content_disposition, PDF_CONTENT_TYPE};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

pub async fn list_pdfs(State(state): State<AppState>) -> Json<StoreStatusResponse> {
    Json(StoreStatusResponse {
        count: state.store.len(),
        ttl_minutes: state.store.ttl_minutes(),
        max_items: state.store.max_items(),
    })
}

pub async fn get_pdf(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&pdf_id)?;
    let report = state.store.get(&id).ok_or_else(not_found)?;

    tracing::info!(pdf_id = %id, size = report.bytes.len(), "Serving stored report");
    Ok(pdf_response(
        PDF_CONTENT_TYPE,
        &content_disposition(&report.filename),
        report.bytes,
    ))
}

pub async fn delete_pdf(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_id(&pdf_id)?;
    if !state.store.delete(&id) {
        return Err(not_found());
    }

    tracing::info!(pdf_id = %id, "Stored report deleted");
    Ok(Json(DeleteResponse { success: true }))
}

// Malformed ids are indistinguishable from unknown ones
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("PDF not found or expired"))
}
