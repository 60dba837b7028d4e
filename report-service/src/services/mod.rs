pub mod canvas;
pub mod chart;
pub mod composer;
pub mod metrics;
pub mod pipeline;
pub mod store;

pub use chart::{ChartImage, ChartKind, ChartRenderer, RasterChartRenderer};
pub use composer::{DocumentComposer, DocumentLayout, LayoutBlock, PdfComposer};
pub use pipeline::ReportPipeline;
pub use store::{ReportStore, StoredReport};
