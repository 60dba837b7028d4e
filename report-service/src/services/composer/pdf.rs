//! PDF output built directly on `lopdf`.
//!
//! Reports are set on A4 in the built-in Helvetica faces, so no font files are
//! needed at runtime. Blocks flow top to bottom and break onto new pages;
//! every page gets the brand footer and a "Page n of N" counter once the
//! total is known. The writer never consults the clock or a random source,
//! which keeps output byte-identical for identical layouts.

use super::text::{encode_win_ansi, text_width, truncate_to_width, wrap_text, Font};
use super::{DocumentComposer, DocumentLayout, LayoutBlock, ScoreRow};
use crate::error::ReportError;
use crate::models::{LogoImage, Palette, Rgb};
use crate::services::chart::{format_score, ChartImage, LabelAlign};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

pub const PAGE_WIDTH: f32 = 595.276;
pub const PAGE_HEIGHT: f32 = 841.89;

const MARGIN: f32 = 18.0 * PT_PER_MM;
const PT_PER_MM: f32 = 72.0 / 25.4;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const BODY_LEADING: f32 = 14.0;
const LABEL_SIZE: f32 = 8.0;
const CAPTION_SIZE: f32 = 9.0;
const FOOTER_SIZE: f32 = 8.0;
const TABLE_ROW: f32 = 20.0;

pub fn mm(value: f32) -> f32 {
    value * PT_PER_MM
}

/// Composes reports as PDF 1.5 documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfComposer;

impl PdfComposer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentComposer for PdfComposer {
    fn compose(&self, layout: &DocumentLayout) -> Result<Vec<u8>, ReportError> {
        let mut writer = PageWriter::new(&layout.palette);
        for block in &layout.blocks {
            writer.block(block);
        }
        let (mut pages, images) = writer.finish();

        let total = pages.len();
        for (index, ops) in pages.iter_mut().enumerate() {
            footer(ops, &layout.palette, &layout.footer, index + 1, total);
        }

        let bytes = assemble(layout, pages, images)?;
        tracing::debug!(pages = total, bytes = bytes.len(), "PDF composed");
        Ok(bytes)
    }
}

/// Raster data waiting to be written as an image XObject.
struct PendingImage<'a> {
    name: String,
    width: u32,
    height: u32,
    pixels: &'a [u8],
}

/// Flowing layout state. `y` is the top of the free area in PDF user space
/// (origin bottom-left).
struct PageWriter<'a> {
    palette: &'a Palette,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
    images: Vec<PendingImage<'a>>,
}

impl<'a> PageWriter<'a> {
    fn new(palette: &'a Palette) -> Self {
        Self {
            palette,
            pages: Vec::new(),
            ops: Vec::new(),
            y: Self::top(),
            images: Vec::new(),
        }
    }

    fn top() -> f32 {
        PAGE_HEIGHT - MARGIN
    }

    fn bottom() -> f32 {
        MARGIN
    }

    fn left() -> f32 {
        MARGIN
    }

    fn right() -> f32 {
        PAGE_WIDTH - MARGIN
    }

    fn content_width() -> f32 {
        Self::right() - Self::left()
    }

    fn at_top(&self) -> bool {
        self.y >= Self::top()
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = Self::top();
    }

    /// Starts a new page unless `height` still fits on this one.
    fn ensure(&mut self, height: f32) {
        if self.y - height < Self::bottom() && !self.at_top() {
            self.new_page();
        }
    }

    fn add_image(&mut self, width: u32, height: u32, pixels: &'a [u8]) -> String {
        let name = format!("Im{}", self.images.len() + 1);
        self.images.push(PendingImage {
            name: name.clone(),
            width,
            height,
            pixels,
        });
        name
    }

    fn finish(mut self) -> (Vec<Vec<Operation>>, Vec<PendingImage<'a>>) {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        (self.pages, self.images)
    }

    fn block(&mut self, block: &'a LayoutBlock) {
        match block {
            LayoutBlock::Header {
                title,
                subtitle,
                logo,
            } => self.header(title, subtitle.as_deref(), logo.as_deref()),
            LayoutBlock::Heading(text) => self.heading(text),
            LayoutBlock::Paragraph(text) => self.paragraph(text),
            LayoutBlock::KeyValues(pairs) => self.key_values(pairs),
            LayoutBlock::Chart {
                image,
                caption,
                width_mm,
            } => self.chart(image, caption.as_deref(), *width_mm),
            LayoutBlock::ScoreTable(rows) => self.score_table(rows),
            LayoutBlock::Spacer(gap_mm) => {
                self.y -= mm(*gap_mm);
                if self.y < Self::bottom() {
                    self.new_page();
                }
            }
        }
    }

    fn header(&mut self, title: &str, subtitle: Option<&str>, logo: Option<&'a LogoImage>) {
        let palette = self.palette;
        self.ensure(mm(30.0));
        let top = self.y;
        let mut text_right = Self::right();
        let mut logo_height = 0.0;

        if let Some(logo) = logo {
            let aspect = logo.aspect_ratio();
            let width = (mm(16.0) * aspect).min(mm(50.0));
            let height = width / aspect;
            let x = Self::right() - width;
            let name = self.add_image(logo.width, logo.height, &logo.pixels);
            image(&mut self.ops, &name, x, top - height, width, height);
            text_right = x - mm(6.0);
            logo_height = height;
        }

        let mut baseline = top - TITLE_SIZE;
        for line in wrap_text(title, Font::Bold, TITLE_SIZE, text_right - Self::left()) {
            text(&mut self.ops, Font::Bold, TITLE_SIZE, Self::left(), baseline, palette.primary, &line);
            baseline -= TITLE_SIZE * 1.2;
        }
        if let Some(subtitle) = subtitle {
            baseline -= 2.0;
            let line = truncate_to_width(subtitle, Font::Regular, 11.0, text_right - Self::left());
            text(&mut self.ops, Font::Regular, 11.0, Self::left(), baseline, palette.muted, &line);
            baseline -= 11.0;
        }

        let text_bottom = baseline + TITLE_SIZE * 0.2;
        self.y = text_bottom.min(top - logo_height) - mm(3.0);
        rule(&mut self.ops, Self::left(), Self::right(), self.y, 1.5, palette.primary);
        self.y -= mm(6.0);
    }

    fn heading(&mut self, heading: &str) {
        // Keep the heading together with the first lines that follow it
        self.ensure(HEADING_SIZE + 6.0 + 3.0 * BODY_LEADING);
        if !self.at_top() {
            self.y -= mm(3.0);
        }
        let line = truncate_to_width(heading, Font::Bold, HEADING_SIZE, Self::content_width());
        let baseline = self.y - HEADING_SIZE;
        text(&mut self.ops, Font::Bold, HEADING_SIZE, Self::left(), baseline, self.palette.primary, &line);
        self.y = baseline - 8.0;
    }

    fn paragraph(&mut self, body: &str) {
        for line in wrap_text(body, Font::Regular, BODY_SIZE, Self::content_width()) {
            self.ensure(BODY_LEADING);
            let baseline = self.y - BODY_SIZE;
            if !line.is_empty() {
                text(&mut self.ops, Font::Regular, BODY_SIZE, Self::left(), baseline, self.palette.text, &line);
            }
            self.y -= BODY_LEADING;
        }
        self.y -= mm(2.0);
    }

    fn key_values(&mut self, pairs: &[(String, String)]) {
        let key_width = mm(42.0);
        let value_width = Self::content_width() - key_width;

        for (key, value) in pairs {
            let lines = wrap_text(value, Font::Regular, BODY_SIZE, value_width);
            let height = lines.len().max(1) as f32 * BODY_LEADING;
            self.ensure(height);

            let baseline = self.y - BODY_SIZE;
            let key = truncate_to_width(key, Font::Bold, BODY_SIZE, key_width - mm(2.0));
            text(&mut self.ops, Font::Bold, BODY_SIZE, Self::left(), baseline, self.palette.muted, &key);
            for (i, line) in lines.iter().enumerate() {
                let line_baseline = baseline - i as f32 * BODY_LEADING;
                text(
                    &mut self.ops,
                    Font::Regular,
                    BODY_SIZE,
                    Self::left() + key_width,
                    line_baseline,
                    self.palette.text,
                    line,
                );
            }
            self.y -= height;
        }
        self.y -= mm(2.0);
    }

    fn chart(&mut self, chart: &'a ChartImage, caption: Option<&str>, width_mm: f32) {
        let palette = self.palette;
        let aspect = chart.aspect_ratio();
        let caption_height = if caption.is_some() { CAPTION_SIZE + 8.0 } else { 0.0 };

        let mut width = mm(width_mm).min(Self::content_width());
        let mut height = width / aspect;
        let max_height = Self::top() - Self::bottom() - caption_height;
        if height > max_height {
            height = max_height;
            width = height * aspect;
        }
        self.ensure(height + caption_height);

        let x = Self::left() + (Self::content_width() - width) / 2.0;
        let top = self.y;
        let name = self.add_image(chart.width, chart.height, &chart.pixels);
        image(&mut self.ops, &name, x, top - height, width, height);

        for label in &chart.labels {
            let font = if label.bold { Font::Bold } else { Font::Regular };
            let line = truncate_to_width(&label.text, font, LABEL_SIZE, width * 0.34);
            let line_width = text_width(&line, font, LABEL_SIZE);
            let anchor = x + label.x * width;
            let start = match label.align {
                LabelAlign::Left => anchor,
                LabelAlign::Center => anchor - line_width / 2.0,
                LabelAlign::Right => anchor - line_width,
            };
            let start = start.clamp(Self::left(), (Self::right() - line_width).max(Self::left()));
            let baseline = top - label.y * height - LABEL_SIZE * 0.35;
            text(&mut self.ops, font, LABEL_SIZE, start, baseline, palette.text, &line);
        }

        self.y = top - height;
        if let Some(caption) = caption {
            let line = truncate_to_width(caption, Font::Regular, CAPTION_SIZE, Self::content_width());
            let line_width = text_width(&line, Font::Regular, CAPTION_SIZE);
            let start = Self::left() + (Self::content_width() - line_width) / 2.0;
            text(&mut self.ops, Font::Regular, CAPTION_SIZE, start, self.y - CAPTION_SIZE - 4.0, palette.muted, &line);
            self.y -= caption_height;
        }
        self.y -= mm(3.0);
    }

    fn table_columns() -> [f32; 3] {
        let level = mm(35.0);
        let score = mm(25.0);
        [Self::content_width() - score - level, score, level]
    }

    fn table_header(&mut self) {
        let [name_w, score_w, _] = Self::table_columns();
        let top = self.y;
        fill_rect(&mut self.ops, Self::left(), top - TABLE_ROW, Self::content_width(), TABLE_ROW, self.palette.primary);

        let baseline = top - TABLE_ROW / 2.0 - BODY_SIZE * 0.35;
        let x = Self::left() + mm(2.0);
        text(&mut self.ops, Font::Bold, BODY_SIZE, x, baseline, Rgb::WHITE, "Skill");
        text(&mut self.ops, Font::Bold, BODY_SIZE, x + name_w, baseline, Rgb::WHITE, "Score");
        text(&mut self.ops, Font::Bold, BODY_SIZE, x + name_w + score_w, baseline, Rgb::WHITE, "Level");
        self.y -= TABLE_ROW;
    }

    fn score_table(&mut self, rows: &[ScoreRow]) {
        let palette = self.palette;
        let [name_w, score_w, _] = Self::table_columns();
        let x = Self::left() + mm(2.0);

        self.ensure(TABLE_ROW * 2.0);
        self.table_header();

        for (i, row) in rows.iter().enumerate() {
            if self.y - TABLE_ROW < Self::bottom() {
                self.new_page();
                self.table_header();
            }
            let top = self.y;
            if i % 2 == 1 {
                let stripe = palette.grid.over(palette.background, 0.35);
                fill_rect(&mut self.ops, Self::left(), top - TABLE_ROW, Self::content_width(), TABLE_ROW, stripe);
            }

            let baseline = top - TABLE_ROW / 2.0 - BODY_SIZE * 0.35;
            let name = truncate_to_width(row.name.trim(), Font::Regular, BODY_SIZE, name_w - mm(4.0));
            text(&mut self.ops, Font::Regular, BODY_SIZE, x, baseline, palette.text, &name);
            text(&mut self.ops, Font::Regular, BODY_SIZE, x + name_w, baseline, palette.text, &format_score(row.score));
            text(
                &mut self.ops,
                Font::Bold,
                BODY_SIZE,
                x + name_w + score_w,
                baseline,
                palette.level_color(row.level),
                row.level.label(),
            );
            self.y -= TABLE_ROW;
        }

        rule(&mut self.ops, Self::left(), Self::right(), self.y, 0.75, palette.grid);
        self.y -= mm(3.0);
    }
}

fn footer(ops: &mut Vec<Operation>, palette: &Palette, footer: &str, page: usize, total: usize) {
    let left = MARGIN;
    let right = PAGE_WIDTH - MARGIN;
    let baseline = MARGIN - mm(7.0);

    rule(ops, left, right, MARGIN - mm(3.0), 0.5, palette.grid);

    let counter = format!("Page {} of {}", page, total);
    let counter_width = text_width(&counter, Font::Regular, FOOTER_SIZE);
    text(ops, Font::Regular, FOOTER_SIZE, right - counter_width, baseline, palette.muted, &counter);

    if !footer.trim().is_empty() {
        let line = truncate_to_width(footer.trim(), Font::Regular, FOOTER_SIZE, right - left - counter_width - mm(6.0));
        text(ops, Font::Regular, FOOTER_SIZE, left, baseline, palette.muted, &line);
    }
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color.to_unit().iter().map(|&c| c.into()).collect()
}

fn text(ops: &mut Vec<Operation>, font: Font, size: f32, x: f32, baseline: f32, color: Rgb, value: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("rg", color_operands(color)));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.resource().as_bytes().to_vec()), size.into()],
    ));
    ops.push(Operation::new("Td", vec![x.into(), baseline.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(value))]));
    ops.push(Operation::new("ET", vec![]));
}

fn fill_rect(ops: &mut Vec<Operation>, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
    ops.push(Operation::new("rg", color_operands(color)));
    ops.push(Operation::new(
        "re",
        vec![x.into(), y.into(), width.into(), height.into()],
    ));
    ops.push(Operation::new("f", vec![]));
}

fn rule(ops: &mut Vec<Operation>, x0: f32, x1: f32, y: f32, width: f32, color: Rgb) {
    ops.push(Operation::new("RG", color_operands(color)));
    ops.push(Operation::new("w", vec![width.into()]));
    ops.push(Operation::new("m", vec![x0.into(), y.into()]));
    ops.push(Operation::new("l", vec![x1.into(), y.into()]));
    ops.push(Operation::new("S", vec![]));
}

fn image(ops: &mut Vec<Operation>, name: &str, x: f32, y: f32, width: f32, height: f32) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![width.into(), 0f32.into(), 0f32.into(), height.into(), x.into(), y.into()],
    ));
    ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
    ops.push(Operation::new("Q", vec![]));
}

fn assemble(
    layout: &DocumentLayout,
    pages: Vec<Vec<Operation>>,
    images: Vec<PendingImage<'_>>,
) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in [Font::Regular, Font::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource(), font_id);
    }

    let mut xobjects = Dictionary::new();
    for pending in images {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => pending.width as i64,
                "Height" => pending.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            pending.pixels.to_vec(),
        );
        let image_id = doc.add_object(stream);
        xobjects.set(pending.name, image_id);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
        "XObject" => xobjects,
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| ReportError::render(format!("failed to encode page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::from(0f32),
                Object::from(0f32),
                Object::from(PAGE_WIDTH),
                Object::from(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let creation_date = layout.creation_date.format("D:%Y%m%d000000Z").to_string();
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&layout.title)),
        "Author" => Object::string_literal(encode_win_ansi(&layout.author)),
        "Subject" => Object::string_literal(encode_win_ansi(&layout.subject)),
        "Creator" => Object::string_literal(crate::SERVICE_NAME),
        "Producer" => Object::string_literal(crate::SERVICE_NAME),
        "CreationDate" => Object::string_literal(creation_date),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ReportError::render(format!("failed to write PDF: {}", e)))?;
    Ok(bytes)
}
