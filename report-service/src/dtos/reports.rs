use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct PdfBase64Response {
    pub success: bool,
    pub pdf_base64: String,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PdfUrlResponse {
    pub success: bool,
    pub pdf_id: Uuid,
    pub pdf_url: String,
    pub filename: String,
    pub expires_in_minutes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreStatusResponse {
    pub count: usize,
    pub ttl_minutes: u64,
    pub max_items: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}
