use service_core::error::AppError;
use thiserror::Error;

/// Failures of the report pipeline.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The request violates the assessment contract (client error).
    #[error("invalid report request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A chart or the document could not be produced (server error).
    #[error("rendering failed: {0}")]
    Render(String),
}

impl ReportError {
    pub fn render(message: impl Into<String>) -> Self {
        ReportError::Render(message.into())
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "validation",
            ReportError::Render(_) => "render",
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Validation(errors) => AppError::ValidationError(errors),
            ReportError::Render(message) => AppError::RenderError(anyhow::anyhow!(message)),
        }
    }
}
