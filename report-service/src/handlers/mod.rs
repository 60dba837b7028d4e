pub mod health;
pub mod pdfs;
pub mod reports;

pub use health::{health_check, metrics, service_info};
pub use pdfs::{delete_pdf, get_pdf, list_pdfs};
pub use reports::{generate_pdf, generate_pdf_base64, generate_pdf_url};
