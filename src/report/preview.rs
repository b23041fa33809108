//! On-screen preview: the content model plus a Markdown rendering of it.

use super::content::{Block, KeyValue, ReportContent};

/// The preview handed to a UI layer; it renders the blocks natively.
pub type ReportPreview = ReportContent;

impl ReportContent {
    /// Markdown rendering of the preview.
    pub fn to_markdown(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.branded_header {
            parts.push("`PDF`".to_string());
        }
        for section in &self.sections {
            if section.kind.ruled_above() {
                parts.push("---".to_string());
            }
            parts.extend(section.blocks.iter().map(block_markdown));
        }
        let mut out = parts.join("\n\n");
        out.push('\n');
        out
    }
}

fn block_markdown(block: &Block) -> String {
    match block {
        Block::Heading { level: 1, text } => format!("## {text}"),
        Block::Heading { level: 2, text } => format!("### {text}"),
        Block::Heading { text, .. } => format!("**{text}**"),
        Block::Caption { text } => format!("_{text}_"),
        Block::KeyValues { pairs } => pairs
            .iter()
            .map(|KeyValue { key, value }| format!("**{key}** {value}"))
            .collect::<Vec<_>>()
            .join(" | "),
        Block::BulletList { items } => items
            .iter()
            .map(|KeyValue { key, value }| format!("- **{key}:** {value}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Paragraph { text } => text.clone(),
        Block::RiskBadge { level } => format!("**Overall risk:** {level}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedRecord;
    use crate::record::{fields, RawRecord};
    use crate::report::style::StyleProfile;
    use chrono::NaiveDate;

    fn preview(style: &StyleProfile) -> ReportPreview {
        let record = RawRecord::new()
            .with(fields::CLIENT_NAME, "Jane Doe")
            .with(fields::NURSE_NAME, "Sam Lee")
            .with(fields::HOUSING_RISK, "yes")
            .with(fields::TOPICS_MMH, "sleep, support network");
        let at = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        ReportContent::assemble(&NormalizedRecord::from_raw(&record), style, at)
    }

    #[test]
    fn markdown_contains_sections_in_order() {
        let md = preview(&StyleProfile::standard()).to_markdown();
        let title = md.find("## CLIENT BACKGROUND REPORT").unwrap();
        let risk = md.find("### RISK ASSESSMENT").unwrap();
        let topics = md.find("### DISCUSSION TOPICS").unwrap();
        let summaries = md.find("### SUMMARIES").unwrap();
        let footer = md.find("_Generated by Plunket AI Model._").unwrap();
        assert!(title < risk && risk < topics && topics < summaries && summaries < footer);
    }

    #[test]
    fn markdown_identity_line() {
        let md = preview(&StyleProfile::standard()).to_markdown();
        assert!(md.contains("**Client:** Jane Doe | **Nurse:** Sam Lee | **Date:** Not available"));
        assert!(md.contains("- **Mental/Maternal Health:** sleep, support network"));
        assert!(md.contains("**Overall risk:** MODERATE RISK"));
    }

    #[test]
    fn markdown_verbatim_flags() {
        let md = preview(&StyleProfile::raw_flags()).to_markdown();
        assert!(md.contains("### RISK FLAGS"));
        assert!(md.contains("- **Housing:** yes"));
        assert!(md.contains("- **MMH:** Not available"));
        assert!(!md.contains("Overall risk"));
    }

    #[test]
    fn markdown_branded_badge() {
        assert!(preview(&StyleProfile::branded()).to_markdown().starts_with("`PDF`"));
        assert!(!preview(&StyleProfile::standard()).to_markdown().starts_with("`PDF`"));
    }
}
