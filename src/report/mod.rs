//! Report rendering: one record in, an on-screen preview or a PDF out.
//!
//! Both targets are built from the same `ReportContent`, assembled from the
//! normalized record, the style profile and a single clock reading.

pub mod content;
pub mod layout;
pub mod pdf;
pub mod preview;
pub mod sections;
pub mod style;

use chrono::NaiveDateTime;

use crate::clock::{ReportClock, SystemClock};
use crate::error::RenderError;
use crate::normalize::NormalizedRecord;
use crate::record::RawRecord;

pub use content::{Block, KeyValue, ReportContent, Section};
pub use layout::DocumentLayout;
pub use pdf::{DocumentBackend, DocumentMeta, PrintPdfBackend};
pub use preview::ReportPreview;
pub use sections::{SectionKind, SECTION_ORDER};
pub use style::{HexColor, RiskDisplay, StyleProfile};

/// Builds the on-screen preview. Never fails and never touches a backend.
pub fn render_preview(record: &RawRecord, style: &StyleProfile, clock: &dyn ReportClock) -> ReportPreview {
    let normalized = NormalizedRecord::from_raw(record);
    ReportContent::assemble(&normalized, style, clock.now())
}

/// Builds the PDF bytes through the given backend.
pub fn render_document(
    record: &RawRecord,
    style: &StyleProfile,
    clock: &dyn ReportClock,
    backend: &dyn DocumentBackend,
) -> Result<Vec<u8>, RenderError> {
    let generated_at = clock.now();
    let content = ReportContent::assemble(&NormalizedRecord::from_raw(record), style, generated_at);
    document_from_content(&content, style, generated_at, backend)
}

/// `render_document` with the printpdf backend.
pub fn render_pdf(
    record: &RawRecord,
    style: &StyleProfile,
    clock: &dyn ReportClock,
) -> Result<Vec<u8>, RenderError> {
    render_document(record, style, clock, &PrintPdfBackend)
}

fn document_from_content(
    content: &ReportContent,
    style: &StyleProfile,
    generated_at: NaiveDateTime,
    backend: &dyn DocumentBackend,
) -> Result<Vec<u8>, RenderError> {
    let layout = layout::compose(content, style);
    let meta = DocumentMeta::for_layout(&layout, generated_at)?;
    let bytes = backend.render(&layout, &meta)?;
    tracing::info!(
        profile = %style.name,
        pages = layout.page_count(),
        size_bytes = bytes.len(),
        "Report PDF rendered"
    );
    Ok(bytes)
}

/// Holds a style profile, clock and backend for repeated renders.
pub struct ReportRenderer {
    style: StyleProfile,
    clock: Box<dyn ReportClock>,
    backend: Box<dyn DocumentBackend>,
}

impl ReportRenderer {
    pub fn new(style: StyleProfile) -> Self {
        Self {
            style,
            clock: Box::new(SystemClock),
            backend: Box::new(PrintPdfBackend),
        }
    }

    pub fn with_clock(mut self, clock: impl ReportClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_backend(mut self, backend: impl DocumentBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    pub fn style(&self) -> &StyleProfile {
        &self.style
    }

    pub fn preview(&self, record: &RawRecord) -> ReportPreview {
        render_preview(record, &self.style, self.clock.as_ref())
    }

    pub fn pdf(&self, record: &RawRecord) -> Result<Vec<u8>, RenderError> {
        render_document(record, &self.style, self.clock.as_ref(), self.backend.as_ref())
    }

    /// Preview and PDF from one clock reading, so both show the same
    /// generation time.
    pub fn render_both(&self, record: &RawRecord) -> (ReportPreview, Result<Vec<u8>, RenderError>) {
        let generated_at = self.clock.now();
        let content = ReportContent::assemble(&NormalizedRecord::from_raw(record), &self.style, generated_at);
        let pdf = document_from_content(&content, &self.style, generated_at, self.backend.as_ref());
        (content, pdf)
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(StyleProfile::default())
    }
}
