use base64::{engine::general_purpose, Engine as _};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A generated document ready to be returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

impl ReportArtifact {
    pub fn pdf(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: PDF_CONTENT_TYPE,
            filename: filename.into(),
        }
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn content_disposition(&self) -> String {
        content_disposition(&self.filename)
    }
}

/// `attachment` disposition header value for a download name.
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename.replace('"', ""))
}
