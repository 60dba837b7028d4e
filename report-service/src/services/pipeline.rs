//! Report pipeline: validation, charts, layout, document bytes.

use crate::config::ChartSettings;
use crate::error::ReportError;
use crate::models::{BrandConfig, ReportArtifact, ReportRequest};
use crate::services::chart::{format_score, ChartKind, ChartRenderer, RasterChartRenderer};
use crate::services::composer::{
    DocumentComposer, DocumentLayout, LayoutBlock, PdfComposer, ScoreRow,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

/// Radar charts get a square-ish slot; bar charts use the full text width.
const RADAR_WIDTH_MM: f32 = 150.0;
const BAR_WIDTH_MM: f32 = 174.0;
const SECTION_GAP_MM: f32 = 4.0;

pub struct ReportPipeline {
    charts: Arc<dyn ChartRenderer>,
    composer: Arc<dyn DocumentComposer>,
}

impl ReportPipeline {
    pub fn new(charts: Arc<dyn ChartRenderer>, composer: Arc<dyn DocumentComposer>) -> Self {
        Self { charts, composer }
    }

    /// Raster charts at the configured size, composed into PDF.
    pub fn from_settings(settings: &ChartSettings) -> Self {
        Self::new(
            Arc::new(RasterChartRenderer::new(settings.width_px, settings.height_px)),
            Arc::new(PdfComposer::new()),
        )
    }

    /// Charts drawn for an assessment of `skill_count` skills, in page order.
    pub fn chart_kinds(skill_count: usize) -> Vec<ChartKind> {
        [ChartKind::Radar, ChartKind::Bar]
            .into_iter()
            .filter(|kind| skill_count >= kind.min_skills())
            .collect()
    }

    pub fn generate(
        &self,
        request: &ReportRequest,
        brand: &BrandConfig,
    ) -> Result<ReportArtifact, ReportError> {
        self.generate_on(request, brand, Utc::now().date_naive())
    }

    /// Same as [`generate`](Self::generate) with an explicit "today", used
    /// when the request carries no assessment date.
    pub fn generate_on(
        &self,
        request: &ReportRequest,
        brand: &BrandConfig,
        today: NaiveDate,
    ) -> Result<ReportArtifact, ReportError> {
        let started = Instant::now();
        request.validate()?;

        let date = request.report_date(today);
        let layout = self.layout(request, brand, date)?;
        let bytes = self.composer.compose(&layout)?;
        let artifact = ReportArtifact::pdf(bytes, request.filename(date));

        let elapsed = started.elapsed();
        metrics::histogram!("report_render_duration_seconds").record(elapsed.as_secs_f64());
        tracing::info!(
            skills = request.assessment.skills.len(),
            bytes = artifact.bytes.len(),
            filename = %artifact.filename,
            elapsed_ms = elapsed.as_millis() as u64,
            "Report generated"
        );

        Ok(artifact)
    }

    fn layout(
        &self,
        request: &ReportRequest,
        brand: &BrandConfig,
        date: NaiveDate,
    ) -> Result<DocumentLayout, ReportError> {
        let skills = &request.assessment.skills;
        let mut blocks = vec![LayoutBlock::Header {
            title: request.title().to_string(),
            subtitle: Some(brand.name.clone()),
            logo: brand.logo.clone(),
        }];

        let mut details = Vec::new();
        if let Some(recipient) = &request.recipient {
            details.push(("Name".to_string(), recipient.name.trim().to_string()));
            if let Some(position) = recipient.position.as_deref().map(str::trim) {
                if !position.is_empty() {
                    details.push(("Position".to_string(), position.to_string()));
                }
            }
        }
        details.push(("Date".to_string(), date.format("%Y-%m-%d").to_string()));
        blocks.push(LayoutBlock::KeyValues(details));

        blocks.push(LayoutBlock::Heading("Overall result".to_string()));
        blocks.push(LayoutBlock::KeyValues(vec![
            ("Overall score".to_string(), format_score(request.overall_score())),
            ("Level".to_string(), request.overall_level().label().to_string()),
            ("Skills assessed".to_string(), skills.len().to_string()),
        ]));

        blocks.push(LayoutBlock::Heading("Skill overview".to_string()));
        for kind in Self::chart_kinds(skills.len()) {
            let image = self.charts.render(kind, skills, &brand.palette)?;
            let width_mm = match kind {
                ChartKind::Radar => RADAR_WIDTH_MM,
                ChartKind::Bar => BAR_WIDTH_MM,
            };
            blocks.push(LayoutBlock::Chart {
                image,
                caption: Some(kind.title().to_string()),
                width_mm,
            });
        }

        blocks.push(LayoutBlock::Spacer(SECTION_GAP_MM));
        blocks.push(LayoutBlock::Heading("Skill scores".to_string()));
        blocks.push(LayoutBlock::ScoreTable(
            skills
                .iter()
                .map(|skill| ScoreRow {
                    name: skill.name.trim().to_string(),
                    score: skill.score,
                    level: skill.level(),
                })
                .collect(),
        ));

        if let Some(narrative) = &request.narrative {
            blocks.push(LayoutBlock::Heading("Summary".to_string()));
            blocks.push(LayoutBlock::Paragraph(narrative.summary.trim().to_string()));
            blocks.push(LayoutBlock::Heading("Learning path".to_string()));
            blocks.push(LayoutBlock::Paragraph(narrative.learning_path.trim().to_string()));
        }

        let subject = match &request.recipient {
            Some(recipient) => format!("Skill assessment for {}", recipient.name.trim()),
            None => "Skill assessment".to_string(),
        };

        Ok(DocumentLayout {
            title: request.title().to_string(),
            author: brand.name.clone(),
            subject,
            creation_date: date,
            footer: brand.footer.clone(),
            palette: brand.palette.clone(),
            blocks,
        })
    }
}
