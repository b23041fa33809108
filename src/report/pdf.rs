//! PDF document backend.
//!
//! The renderer hands a finished `DocumentLayout` to a `DocumentBackend`.
//! `PrintPdfBackend` replays it with `printpdf` built-in Helvetica fonts.
//! Output is byte-identical for the same layout and timestamp: every date is
//! pinned to the render time and the trailer `/ID` is rewritten with an id
//! derived from the layout. Text is limited to what WinAnsiEncoding can
//! carry; anything else fails the render instead of vanishing from the page.

use std::io::BufWriter;

use chrono::NaiveDateTime;
use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, IndirectFontRef, Line, Mm, PdfConformance,
    PdfDocument, PdfLayerReference, Point, Rgb,
};
use sha2::{Digest, Sha256};

use super::layout::{DocumentLayout, DrawOp, FontFace};
use super::style::HexColor;
use crate::error::RenderError;

/// Document-level metadata written alongside the pages.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMeta {
    pub title: String,
    pub created_at: NaiveDateTime,
    pub document_id: String,
}

impl DocumentMeta {
    /// Metadata whose id is a digest of the layout itself.
    pub fn for_layout(layout: &DocumentLayout, created_at: NaiveDateTime) -> Result<Self, RenderError> {
        let bytes = serde_json::to_vec(layout)
            .map_err(|e| RenderError::Metadata(format!("layout digest: {e}")))?;
        let digest = format!("{:x}", Sha256::digest(&bytes));
        Ok(Self {
            title: layout.title.clone(),
            created_at,
            document_id: digest[..32].to_string(),
        })
    }
}

/// Produces document bytes from a layout. Failures abort the render.
pub trait DocumentBackend: Send + Sync {
    fn render(&self, layout: &DocumentLayout, meta: &DocumentMeta) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrintPdfBackend;

impl DocumentBackend for PrintPdfBackend {
    fn render(&self, layout: &DocumentLayout, meta: &DocumentMeta) -> Result<Vec<u8>, RenderError> {
        validate(layout)?;

        let stamp = time::OffsetDateTime::from_unix_timestamp(meta.created_at.and_utc().timestamp())
            .map_err(|e| RenderError::Metadata(format!("timestamp out of range: {e}")))?;

        let width = Mm(layout.width_mm);
        let height = Mm(layout.height_mm);
        let (doc, first_page, first_layer) = PdfDocument::new(&meta.title, width, height, "Layer 1");
        let doc = doc
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            }))
            .with_creation_date(stamp)
            .with_mod_date(stamp)
            .with_metadata_date(stamp);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?;

        for (index, page) in layout.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (p, l) = doc.add_page(width, height, "Layer 1");
                doc.get_page(p).get_layer(l)
            };
            for op in &page.ops {
                draw(&layer, op, &regular, &bold);
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| RenderError::Save(e.to_string()))?;
        let mut bytes = buf
            .into_inner()
            .map_err(|e| RenderError::Buffer(e.to_string()))?;
        pin_trailer_id(&mut bytes, &meta.document_id)?;

        tracing::debug!(
            pages = layout.pages.len(),
            size_bytes = bytes.len(),
            document_id = %meta.document_id,
            "PDF document written"
        );
        Ok(bytes)
    }
}

fn color(c: HexColor) -> Color {
    let (r, g, b) = c.to_unit_rgb();
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn draw(layer: &PdfLayerReference, op: &DrawOp, regular: &IndirectFontRef, bold: &IndirectFontRef) {
    match op {
        DrawOp::Text { text, x, y, size, face, color: c } => {
            let font = match face {
                FontFace::Regular => regular,
                FontFace::Bold => bold,
            };
            layer.set_fill_color(color(*c));
            layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), font);
        }
        DrawOp::Rule { x1, x2, y, thickness, color: c } => {
            layer.set_outline_color(color(*c));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(*y)), false),
                    (Point::new(Mm(*x2), Mm(*y)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Frame { x, y, width, height, thickness, color: c } => {
            layer.set_outline_color(color(*c));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x), Mm(*y)), false),
                    (Point::new(Mm(*x + *width), Mm(*y)), false),
                    (Point::new(Mm(*x + *width), Mm(*y + *height)), false),
                    (Point::new(Mm(*x), Mm(*y + *height)), false),
                ],
                is_closed: true,
            });
        }
    }
}

/// printpdf fills both trailer `/ID` entries with random strings on every
/// save. Overwrite each in place with the document id; lengths match, so the
/// xref offsets stay valid.
fn pin_trailer_id(bytes: &mut [u8], document_id: &str) -> Result<(), RenderError> {
    let missing = || RenderError::Metadata("trailer /ID array not found".into());
    let pos = bytes
        .windows(3)
        .rposition(|w| w == b"/ID")
        .ok_or_else(missing)?;
    let skip_ws = |bytes: &[u8], mut i: usize| {
        while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
            i += 1;
        }
        i
    };

    let mut i = skip_ws(bytes, pos + 3);
    if bytes.get(i) != Some(&b'[') {
        return Err(missing());
    }
    let id = document_id.as_bytes();
    for _ in 0..2 {
        i = skip_ws(bytes, i + 1);
        if bytes.get(i) != Some(&b'(') {
            return Err(missing());
        }
        let slot = i + 1..i + 1 + id.len();
        if bytes.get(slot.end) != Some(&b')') {
            return Err(RenderError::Metadata(
                "trailer /ID entry length differs from document id".into(),
            ));
        }
        i = slot.end;
        bytes[slot].copy_from_slice(id);
    }
    Ok(())
}

/// Whether builtin Helvetica (WinAnsiEncoding) has a code for `c`.
fn win_ansi_encodable(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}')
        || matches!(
            c,
            '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
                | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ'
                | 'ž' | 'Ÿ'
        )
}

/// Rejects layouts the content stream cannot represent.
fn validate(layout: &DocumentLayout) -> Result<(), RenderError> {
    if layout.pages.is_empty() {
        return Err(RenderError::MalformedContent {
            page: 0,
            reason: "layout has no pages".into(),
        });
    }
    for (index, page) in layout.pages.iter().enumerate() {
        let page_no = index + 1;
        for op in &page.ops {
            let coords = match op {
                DrawOp::Text { x, y, size, .. } => vec![*x, *y, *size],
                DrawOp::Rule { x1, x2, y, thickness, .. } => vec![*x1, *x2, *y, *thickness],
                DrawOp::Frame { x, y, width, height, thickness, .. } => {
                    vec![*x, *y, *width, *height, *thickness]
                }
            };
            if coords.iter().any(|v| !v.is_finite()) {
                return Err(RenderError::MalformedContent {
                    page: page_no,
                    reason: "non-finite coordinate".into(),
                });
            }
            if let DrawOp::Text { text, .. } = op {
                if let Some(c) = text.chars().find(|c| c.is_control()) {
                    return Err(RenderError::MalformedContent {
                        page: page_no,
                        reason: format!("control character U+{:04X} in text run", c as u32),
                    });
                }
                if let Some(c) = text.chars().find(|c| !win_ansi_encodable(*c)) {
                    return Err(RenderError::MalformedContent {
                        page: page_no,
                        reason: format!("character U+{:04X} ({c}) has no WinAnsi code", c as u32),
                    });
                }
            }
        }
    }
    Ok(())
}
