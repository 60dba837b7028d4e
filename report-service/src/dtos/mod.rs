pub mod reports;
pub mod service;

pub use reports::{DeleteResponse, PdfBase64Response, PdfUrlResponse, StoreStatusResponse};
pub use service::{HealthResponse, ServiceInfo};
