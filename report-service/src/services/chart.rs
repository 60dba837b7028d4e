//! Chart rendering.
//!
//! Charts are rasterized to RGB pixels. Text is not burned into the bitmap:
//! each chart carries label anchors so the document composer can set names
//! and scores as real, selectable text on top of the image.

use crate::error::ReportError;
use crate::models::{Palette, SkillScore};
use crate::services::canvas::Canvas;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Smallest canvas edge that still produces a readable chart.
pub const MIN_CHART_EDGE_PX: u32 = 100;

/// Largest canvas edge accepted from configuration.
pub const MAX_CHART_EDGE_PX: u32 = 4000;

/// Scores are plotted on a fixed 0..=100 scale.
const SCALE_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Radar,
    Bar,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Radar => "Skill profile",
            ChartKind::Bar => "Score by skill",
        }
    }

    /// Fewest skills the chart can represent.
    pub fn min_skills(&self) -> usize {
        match self {
            ChartKind::Radar => 3,
            ChartKind::Bar => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAlign {
    Left,
    Center,
    Right,
}

/// Text to overlay on a chart. `x` and `y` are fractions of the image size
/// measured from the top-left corner; `y` is the vertical center of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub align: LabelAlign,
    pub bold: bool,
}

#[derive(Clone, PartialEq)]
pub struct ChartImage {
    pub kind: ChartKind,
    pub width: u32,
    pub height: u32,
    /// RGB8, row-major, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
    pub labels: Vec<ChartLabel>,
}

impl std::fmt::Debug for ChartImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartImage")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("labels", &self.labels.len())
            .finish()
    }
}

impl ChartImage {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Turns scores into a chart image.
pub trait ChartRenderer: Send + Sync {
    fn render(
        &self,
        kind: ChartKind,
        skills: &[SkillScore],
        palette: &Palette,
    ) -> Result<ChartImage, ReportError>;
}

/// Software renderer that draws into an in-memory bitmap.
#[derive(Debug, Clone, Copy)]
pub struct RasterChartRenderer {
    width: u32,
    height: u32,
}

impl Default for RasterChartRenderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl RasterChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn check(&self, kind: ChartKind, skills: &[SkillScore]) -> Result<(), ReportError> {
        if self.width < MIN_CHART_EDGE_PX || self.height < MIN_CHART_EDGE_PX {
            return Err(ReportError::render(format!(
                "chart canvas {}x{} is smaller than {}px",
                self.width, self.height, MIN_CHART_EDGE_PX
            )));
        }
        if skills.len() < kind.min_skills() {
            return Err(ReportError::render(format!(
                "{:?} chart needs at least {} skills, got {}",
                kind,
                kind.min_skills(),
                skills.len()
            )));
        }
        if let Some(skill) = skills.iter().find(|s| !s.score.is_finite()) {
            return Err(ReportError::render(format!(
                "score for '{}' is not a finite number",
                skill.name
            )));
        }
        Ok(())
    }

    fn radar(&self, skills: &[SkillScore], palette: &Palette) -> ChartImage {
        let (w, h) = (self.width as f32, self.height as f32);
        let mut canvas = Canvas::new(self.width, self.height, palette.background);

        let center = (w / 2.0, h / 2.0);
        let radius = w.min(h) * 0.34;
        let stroke = (w.min(h) / 300.0).max(1.0);
        let axes = skills.len();

        // First axis points straight up, then clockwise
        let angle = |i: usize| -FRAC_PI_2 + TAU * i as f32 / axes as f32;
        let point = |i: usize, r: f32| {
            let a = angle(i);
            (center.0 + r * a.cos(), center.1 + r * a.sin())
        };

        for ring in 1..=5 {
            let r = radius * ring as f32 / 5.0;
            let outline: Vec<_> = (0..axes).map(|i| point(i, r)).collect();
            canvas.stroke_polygon(&outline, stroke, palette.grid);
        }
        for i in 0..axes {
            canvas.draw_line(center, point(i, radius), stroke, palette.grid);
        }

        let shape: Vec<_> = skills
            .iter()
            .enumerate()
            .map(|(i, s)| point(i, radius * clamp_score(s.score) / SCALE_MAX))
            .collect();
        canvas.fill_polygon(&shape, palette.secondary, 0.35);
        canvas.stroke_polygon(&shape, stroke * 2.0, palette.primary);
        for (skill, &(x, y)) in skills.iter().zip(&shape) {
            canvas.fill_circle(x, y, stroke * 3.0, palette.level_color(skill.level()));
        }

        let labels = skills
            .iter()
            .enumerate()
            .map(|(i, skill)| {
                let (x, y) = point(i, radius * 1.14);
                let cos = angle(i).cos();
                let align = if cos > 0.2 {
                    LabelAlign::Left
                } else if cos < -0.2 {
                    LabelAlign::Right
                } else {
                    LabelAlign::Center
                };
                ChartLabel {
                    text: skill.name.trim().to_string(),
                    x: x / w,
                    y: y / h,
                    align,
                    bold: false,
                }
            })
            .collect();

        ChartImage {
            kind: ChartKind::Radar,
            width: self.width,
            height: self.height,
            pixels: canvas.into_raw(),
            labels,
        }
    }

    fn bar(&self, skills: &[SkillScore], palette: &Palette) -> ChartImage {
        let (w, h) = (self.width as f32, self.height as f32);
        let mut canvas = Canvas::new(self.width, self.height, palette.background);

        let (left, right) = (w * 0.38, w * 0.88);
        let (top, bottom) = (h * 0.05, h * 0.95);
        let row = (bottom - top) / skills.len() as f32;
        let bar_height = (row * 0.56).min(h * 0.12);
        let stroke = (w.min(h) / 400.0).max(1.0);

        for tick in 0..=4 {
            let x = left + (right - left) * tick as f32 / 4.0;
            canvas.draw_line((x, top), (x, bottom), stroke, palette.grid);
        }

        let mut labels = Vec::with_capacity(skills.len() * 2);
        for (i, skill) in skills.iter().enumerate() {
            let mid = top + row * (i as f32 + 0.5);
            let (y0, y1) = (mid - bar_height / 2.0, mid + bar_height / 2.0);
            let length = (right - left) * clamp_score(skill.score) / SCALE_MAX;

            canvas.fill_rect(left, y0, right, y1, palette.grid.over(palette.background, 0.45));
            canvas.fill_rect(left, y0, left + length, y1, palette.level_color(skill.level()));

            labels.push(ChartLabel {
                text: skill.name.trim().to_string(),
                x: 0.36,
                y: mid / h,
                align: LabelAlign::Right,
                bold: false,
            });
            labels.push(ChartLabel {
                text: format_score(skill.score),
                x: 0.90,
                y: mid / h,
                align: LabelAlign::Left,
                bold: true,
            });
        }

        ChartImage {
            kind: ChartKind::Bar,
            width: self.width,
            height: self.height,
            pixels: canvas.into_raw(),
            labels,
        }
    }
}

impl ChartRenderer for RasterChartRenderer {
    fn render(
        &self,
        kind: ChartKind,
        skills: &[SkillScore],
        palette: &Palette,
    ) -> Result<ChartImage, ReportError> {
        self.check(kind, skills)?;

        let image = match kind {
            ChartKind::Radar => self.radar(skills, palette),
            ChartKind::Bar => self.bar(skills, palette),
        };

        tracing::debug!(
            kind = ?kind,
            skills = skills.len(),
            width = image.width,
            height = image.height,
            "Chart rendered"
        );
        Ok(image)
    }
}

fn clamp_score(score: f64) -> f32 {
    (score as f32).clamp(0.0, SCALE_MAX)
}

/// Scores print without a fraction when they are whole numbers.
pub fn format_score(score: f64) -> String {
    if (score - score.round()).abs() < 0.05 {
        format!("{:.0}", score)
    } else {
        format!("{:.1}", score)
    }
}
