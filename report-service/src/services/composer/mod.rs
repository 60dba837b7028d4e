//! Document composition.
//!
//! The pipeline describes a report as a flat list of [`LayoutBlock`]s; a
//! [`DocumentComposer`] turns that description into document bytes.

pub mod pdf;
pub mod text;

use crate::error::ReportError;
use crate::models::{LogoImage, Palette, ProficiencyLevel};
use crate::services::chart::ChartImage;
use chrono::NaiveDate;
use std::sync::Arc;

pub use pdf::PdfComposer;

/// Everything needed to lay out one report.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub title: String,
    pub author: String,
    pub subject: String,
    /// Recorded in the document metadata instead of the wall clock, so equal
    /// input produces equal bytes.
    pub creation_date: NaiveDate,
    /// Text repeated at the bottom of every page.
    pub footer: String,
    pub palette: Palette,
    pub blocks: Vec<LayoutBlock>,
}

#[derive(Debug, Clone)]
pub enum LayoutBlock {
    Header {
        title: String,
        subtitle: Option<String>,
        logo: Option<Arc<LogoImage>>,
    },
    Heading(String),
    Paragraph(String),
    KeyValues(Vec<(String, String)>),
    Chart {
        image: ChartImage,
        caption: Option<String>,
        width_mm: f32,
    },
    ScoreTable(Vec<ScoreRow>),
    /// Vertical gap in millimetres.
    Spacer(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub name: String,
    pub score: f64,
    pub level: ProficiencyLevel,
}

pub trait DocumentComposer: Send + Sync {
    fn compose(&self, layout: &DocumentLayout) -> Result<Vec<u8>, ReportError>;
}
