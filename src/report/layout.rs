//! Page layout for the PDF rendering.
//!
//! Turns `ReportContent` into positioned draw operations on A4 pages with
//! 10 mm margins. Content that does not fit flows onto a new page. The
//! layout is backend-independent; `pdf.rs` only replays it.

use serde::Serialize;

use super::content::{Block, KeyValue, ReportContent, Section};
use super::sections::SectionKind;
use super::style::{palette, HexColor, StyleProfile};
use crate::normalize::RiskLevel;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;

const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph advance, in ems.
const AVG_GLYPH_EM: f32 = 0.5;
const AVG_BOLD_GLYPH_EM: f32 = 0.55;

const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const BULLET_INDENT_MM: f32 = 5.0;
const BADGE_SIZE_MM: f32 = 12.0;

// Key/value grid: label, value, label, value (2.5 cm / 5 cm columns).
const KV_LABEL_WIDTH_MM: f32 = 25.0;
const KV_VALUE_WIDTH_MM: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontFace {
    Regular,
    Bold,
}

/// One positioned drawing instruction. Coordinates are millimetres from the
/// bottom-left corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        face: FontFace,
        color: HexColor,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
        color: HexColor,
    },
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
        color: HexColor,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutPage {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLayout {
    pub title: String,
    pub width_mm: f32,
    pub height_mm: f32,
    pub pages: Vec<LayoutPage>,
}

impl DocumentLayout {
    /// All text runs, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| &p.ops).filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Lays out the report content for the given style.
pub fn compose(content: &ReportContent, style: &StyleProfile) -> DocumentLayout {
    let mut composer = Composer::new(style);
    for section in &content.sections {
        composer.section(section);
    }
    composer.finish(&content.title)
}

struct TextStyle {
    size: f32,
    leading: f32,
    face: FontFace,
    color: HexColor,
}

impl TextStyle {
    const fn new(size: f32, leading: f32, face: FontFace, color: HexColor) -> Self {
        Self { size, leading, face, color }
    }
}

const SUBTITLE: TextStyle = TextStyle::new(10.0, 12.0, FontFace::Regular, palette::MUTED);
const SECTION: TextStyle = TextStyle::new(14.0, 17.0, FontFace::Bold, palette::BODY);
const SUBSECTION: TextStyle = TextStyle::new(12.0, 14.0, FontFace::Bold, palette::SUBSECTION);
const BODY: TextStyle = TextStyle::new(10.0, 14.0, FontFace::Regular, palette::BODY);
const BODY_BOLD: TextStyle = TextStyle::new(10.0, 14.0, FontFace::Bold, palette::BODY);
const LABEL: TextStyle = TextStyle::new(10.0, 14.0, FontFace::Regular, palette::MUTED);
const FOOTER: TextStyle = TextStyle::new(9.0, 11.0, FontFace::Regular, palette::FOOTER);

struct Composer<'a> {
    style: &'a StyleProfile,
    finished: Vec<LayoutPage>,
    current: LayoutPage,
    y: f32,
}

impl<'a> Composer<'a> {
    fn new(style: &'a StyleProfile) -> Self {
        Self {
            style,
            finished: Vec::new(),
            current: LayoutPage::default(),
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn finish(mut self, title: &str) -> DocumentLayout {
        self.finished.push(self.current);
        DocumentLayout {
            title: title.to_string(),
            width_mm: PAGE_WIDTH_MM,
            height_mm: PAGE_HEIGHT_MM,
            pages: self.finished,
        }
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.finished.push(page);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    /// Starts a new page unless `height_mm` still fits above the margin.
    fn ensure(&mut self, height_mm: f32) {
        let at_top = self.y >= PAGE_HEIGHT_MM - MARGIN_MM;
        if self.y - height_mm < MARGIN_MM && !at_top {
            self.new_page();
        }
    }

    fn space(&mut self, pt: f32) {
        self.y = (self.y - pt * PT_TO_MM).max(MARGIN_MM);
    }

    fn push(&mut self, op: DrawOp) {
        self.current.ops.push(op);
    }

    fn line(&mut self, text: &str, x: f32, ts: &TextStyle) {
        self.ensure(ts.leading * PT_TO_MM);
        self.y -= ts.leading * PT_TO_MM;
        self.text_at(text, x, self.y, ts.size, ts.face, ts.color);
    }

    fn text_at(&mut self, text: &str, x: f32, y: f32, size: f32, face: FontFace, color: HexColor) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            size,
            face,
            color,
        });
    }

    fn wrapped(&mut self, text: &str, x: f32, width: f32, ts: &TextStyle) {
        for line in wrap_text(text, max_chars(width, ts.size, ts.face)) {
            self.line(&line, x, ts);
        }
    }

    fn rule(&mut self) {
        self.space(12.0);
        self.ensure(1.0);
        self.push(DrawOp::Rule {
            x1: MARGIN_MM,
            x2: PAGE_WIDTH_MM - MARGIN_MM,
            y: self.y,
            thickness: 1.0,
            color: palette::RULE,
        });
        self.space(8.0);
    }

    fn section(&mut self, section: &Section) {
        if section.kind.ruled_above() {
            self.rule();
        }
        for block in &section.blocks {
            self.block(section.kind, block);
        }
    }

    fn block(&mut self, kind: SectionKind, block: &Block) {
        match block {
            Block::Heading { level: 1, text } => self.title(text),
            Block::Heading { level: 2, text } => {
                self.space(16.0);
                self.wrapped(text, MARGIN_MM, CONTENT_WIDTH_MM, &SECTION);
                self.space(8.0);
            }
            Block::Heading { text, .. } => {
                self.space(12.0);
                self.wrapped(text, MARGIN_MM, CONTENT_WIDTH_MM, &SUBSECTION);
                self.space(6.0);
            }
            Block::Caption { text } if kind == SectionKind::Footer => self.footer(text),
            Block::Caption { text } => {
                self.wrapped(text, MARGIN_MM, CONTENT_WIDTH_MM, &SUBTITLE);
                self.space(12.0);
            }
            Block::KeyValues { pairs } => self.key_values(pairs),
            Block::BulletList { items } => {
                for item in items {
                    self.bullet(item);
                }
            }
            Block::Paragraph { text } => {
                self.wrapped(text, MARGIN_MM, CONTENT_WIDTH_MM, &BODY);
                self.space(8.0);
            }
            Block::RiskBadge { level } => self.risk_badge(*level),
        }
    }

    fn title(&mut self, text: &str) {
        let accent = self.style.accent_color;
        let title = TextStyle::new(18.0, 22.0, FontFace::Bold, accent);
        let mut x = MARGIN_MM;

        if self.style.branded_header {
            self.ensure(BADGE_SIZE_MM);
            let top = self.y;
            self.push(DrawOp::Frame {
                x: MARGIN_MM,
                y: top - BADGE_SIZE_MM,
                width: BADGE_SIZE_MM,
                height: BADGE_SIZE_MM,
                thickness: 1.5,
                color: accent,
            });
            self.text_at("PDF", MARGIN_MM + 2.4, top - 7.4, 10.0, FontFace::Bold, accent);
            x += BADGE_SIZE_MM + 4.0;
        }

        let width = PAGE_WIDTH_MM - MARGIN_MM - x;
        self.wrapped(text, x, width, &title);
        self.space(6.0);
    }

    /// Label/value pairs, two pairs per row.
    fn key_values(&mut self, pairs: &[KeyValue]) {
        for row in pairs.chunks(2) {
            let cells: Vec<(Vec<String>, Vec<String>)> = row
                .iter()
                .map(|kv| {
                    (
                        wrap_text(&one_line(&kv.key), max_chars(KV_LABEL_WIDTH_MM, LABEL.size, LABEL.face)),
                        wrap_text(
                            &one_line(&kv.value),
                            max_chars(KV_VALUE_WIDTH_MM, BODY_BOLD.size, BODY_BOLD.face),
                        ),
                    )
                })
                .collect();
            let lines = cells
                .iter()
                .map(|(k, v)| k.len().max(v.len()))
                .max()
                .unwrap_or(1);

            let line_mm = BODY.leading * PT_TO_MM;
            self.ensure(line_mm * lines as f32);
            for i in 0..lines {
                self.y -= line_mm;
                let y = self.y;
                for (col, (key, value)) in cells.iter().enumerate() {
                    let x = MARGIN_MM + col as f32 * (KV_LABEL_WIDTH_MM + KV_VALUE_WIDTH_MM);
                    if let Some(k) = key.get(i) {
                        self.text_at(k, x, y, LABEL.size, LABEL.face, LABEL.color);
                    }
                    if let Some(v) = value.get(i) {
                        let vx = x + KV_LABEL_WIDTH_MM;
                        self.text_at(v, vx, y, BODY_BOLD.size, BODY_BOLD.face, BODY_BOLD.color);
                    }
                }
            }
            self.space(4.0);
        }
    }

    /// "- Key: value" with a bold key and a hanging indent.
    fn bullet(&mut self, item: &KeyValue) {
        let lead = format!("- {}:", one_line(&item.key));
        let lead_width = text_width(&lead, BODY_BOLD.size, FontFace::Bold) + 1.5;
        let rest_width = CONTENT_WIDTH_MM - BULLET_INDENT_MM;
        let first_width = (CONTENT_WIDTH_MM - lead_width).max(10.0);
        let lines = wrap_lines(
            &item.value,
            max_chars(first_width, BODY.size, BODY.face),
            max_chars(rest_width, BODY.size, BODY.face),
        );

        for (i, line) in lines.iter().enumerate() {
            self.ensure(BODY.leading * PT_TO_MM);
            self.y -= BODY.leading * PT_TO_MM;
            let y = self.y;
            if i == 0 {
                self.text_at(&lead, MARGIN_MM, y, BODY_BOLD.size, BODY_BOLD.face, BODY_BOLD.color);
                self.text_at(line, MARGIN_MM + lead_width, y, BODY.size, BODY.face, BODY.color);
            } else {
                self.text_at(line, MARGIN_MM + BULLET_INDENT_MM, y, BODY.size, BODY.face, BODY.color);
            }
        }
        self.space(8.0);
    }

    fn risk_badge(&mut self, level: RiskLevel) {
        let color = HexColor::parse(level.color_hex()).unwrap_or(palette::BODY);
        let height = 9.0;
        self.space(4.0);
        self.ensure(height);
        let top = self.y;
        self.push(DrawOp::Frame {
            x: MARGIN_MM,
            y: top - height,
            width: CONTENT_WIDTH_MM,
            height,
            thickness: 1.0,
            color,
        });
        let label = format!("Overall risk: {level}");
        self.text_at(&label, MARGIN_MM + 3.0, top - 6.0, 11.0, FontFace::Bold, color);
        self.y = top - height;
        self.space(8.0);
    }

    fn footer(&mut self, text: &str) {
        self.space(20.0);
        for line in wrap_text(text, max_chars(CONTENT_WIDTH_MM, FOOTER.size, FOOTER.face)) {
            let x = (PAGE_WIDTH_MM - MARGIN_MM - text_width(&line, FOOTER.size, FOOTER.face))
                .max(MARGIN_MM);
            self.line(&line, x, &FOOTER);
        }
    }
}

/// Collapses all whitespace runs (newlines included) to single spaces.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn glyph_em(face: FontFace) -> f32 {
    match face {
        FontFace::Regular => AVG_GLYPH_EM,
        FontFace::Bold => AVG_BOLD_GLYPH_EM,
    }
}

/// Approximate rendered width of `text`, in millimetres.
fn text_width(text: &str, size: f32, face: FontFace) -> f32 {
    text.chars().count() as f32 * size * glyph_em(face) * PT_TO_MM
}

/// How many average glyphs fit in `width_mm`.
fn max_chars(width_mm: f32, size: f32, face: FontFace) -> usize {
    ((width_mm / (size * glyph_em(face) * PT_TO_MM)).floor() as usize).max(1)
}

/// Word-wrap helper for PDF text rendering.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    wrap_lines(text, max_chars, max_chars)
}

/// Word wrap where the first line may be shorter than the rest.
fn wrap_lines(text: &str, first_max: usize, rest_max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let limit = if lines.is_empty() { first_max } else { rest_max };
        let current_len = current.chars().count();
        if current_len + word.chars().count() + 1 > limit && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedRecord;
    use crate::record::{fields, RawRecord};
    use chrono::NaiveDate;

    fn layout_for(record: &RawRecord, style: &StyleProfile) -> DocumentLayout {
        let at = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let content = ReportContent::assemble(&NormalizedRecord::from_raw(record), style, at);
        compose(&content, style)
    }

    fn all_ops(layout: &DocumentLayout) -> Vec<&DrawOp> {
        layout.pages.iter().flat_map(|p| &p.ops).collect()
    }

    #[test]
    fn short_report_fits_one_a4_page() {
        let layout = layout_for(
            &RawRecord::new().with(fields::CLIENT_NAME, "Jane Doe"),
            &StyleProfile::standard(),
        );
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.width_mm, 210.0);
        assert_eq!(layout.height_mm, 297.0);
        assert_eq!(layout.title, "CLIENT BACKGROUND REPORT");
    }

    #[test]
    fn all_ops_stay_inside_margins() {
        let long = "word ".repeat(2_000);
        let record = RawRecord::new()
            .with(fields::CLIENT_NAME, "Jane Doe")
            .with(fields::HOUSING_SUMMARY, long.as_str())
            .with(fields::MMH_SUMMARY, long.as_str());
        let layout = layout_for(&record, &StyleProfile::branded());

        assert!(layout.page_count() > 1);
        for op in all_ops(&layout) {
            match op {
                DrawOp::Text { x, y, .. } => {
                    assert!(*y >= MARGIN_MM - 0.01 && *y <= PAGE_HEIGHT_MM - MARGIN_MM);
                    assert!(*x >= MARGIN_MM - 0.01 && *x < PAGE_WIDTH_MM - MARGIN_MM);
                }
                DrawOp::Rule { y, .. } => assert!(*y >= MARGIN_MM - 0.01),
                DrawOp::Frame { y, .. } => assert!(*y >= MARGIN_MM - 0.01),
            }
        }
    }

    #[test]
    fn footer_is_last_text_and_right_aligned() {
        let layout = layout_for(&RawRecord::new(), &StyleProfile::standard());
        let last = all_ops(&layout)
            .into_iter()
            .rev()
            .find(|op| matches!(op, DrawOp::Text { .. }))
            .unwrap();
        match last {
            DrawOp::Text { text, x, .. } => {
                assert_eq!(text, "Generated by Plunket AI Model.");
                assert!(*x > PAGE_WIDTH_MM / 2.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn title_uses_accent_color() {
        let style = StyleProfile::branded();
        let layout = layout_for(&RawRecord::new(), &style);
        let title = all_ops(&layout)
            .into_iter()
            .find(|op| matches!(op, DrawOp::Text { text, .. } if text == &style.title))
            .unwrap();
        match title {
            DrawOp::Text { color, face, x, .. } => {
                assert_eq!(*color, style.accent_color);
                assert_eq!(*face, FontFace::Bold);
                assert!(*x > MARGIN_MM, "title should sit right of the badge");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn branded_header_draws_badge_frame() {
        let branded = layout_for(&RawRecord::new(), &StyleProfile::branded());
        let standard = layout_for(&RawRecord::new(), &StyleProfile::standard());
        assert!(branded.texts().any(|t| t == "PDF"));
        assert!(!standard.texts().any(|t| t == "PDF"));
    }

    #[test]
    fn risk_badge_colored_by_level() {
        let record = RawRecord::new()
            .with(fields::HOUSING_RISK, "y")
            .with(fields::IMPAIRMENT_RISK, 1_i64);
        let layout = layout_for(&record, &StyleProfile::standard());
        let badge = all_ops(&layout)
            .into_iter()
            .find(|op| matches!(op, DrawOp::Text { text, .. } if text == "Overall risk: HIGH RISK"))
            .unwrap();
        match badge {
            DrawOp::Text { color, .. } => assert_eq!(color.to_string(), "#C41E3A"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn multiline_values_collapse_whitespace() {
        let record = RawRecord::new().with(fields::CLIENT_NAME, "Jane\n  Doe");
        let layout = layout_for(&record, &StyleProfile::standard());
        assert!(layout.texts().any(|t| t == "Jane Doe"));
    }

    #[test]
    fn sections_render_in_order() {
        let layout = layout_for(&RawRecord::new(), &StyleProfile::standard());
        let texts: Vec<&str> = layout.texts().collect();
        let pos = |needle: &str| texts.iter().position(|t| *t == needle).unwrap();
        assert!(pos("Client:") < pos("RISK ASSESSMENT"));
        assert!(pos("RISK ASSESSMENT") < pos("DISCUSSION TOPICS"));
        assert!(pos("DISCUSSION TOPICS") < pos("SUMMARIES"));
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a long sentence that should be wrapped at around forty characters or so.";
        let lines = wrap_text(text, 40);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 40);
        }
    }

    #[test]
    fn test_wrap_text_short() {
        let lines = wrap_text("Short", 40);
        assert_eq!(lines, vec!["Short".to_string()]);
    }

    #[test]
    fn test_wrap_text_empty() {
        let lines = wrap_text("", 40);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn wrap_lines_hanging_first_line() {
        let lines = wrap_lines("aa bb cc dd ee", 5, 100);
        assert_eq!(lines, vec!["aa bb".to_string(), "cc dd ee".to_string()]);
    }
}
