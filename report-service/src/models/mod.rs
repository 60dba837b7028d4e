pub mod artifact;
pub mod assessment;
pub mod brand;

pub use artifact::{content_disposition, ReportArtifact, PDF_CONTENT_TYPE};
pub use assessment::{
    Narrative, ProficiencyLevel, Recipient, ReportRequest, SkillAssessment, SkillScore,
    DEFAULT_TITLE,
};
pub use brand::{BrandConfig, LogoImage, Palette, Rgb};
