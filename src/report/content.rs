//! Report content shared by both renderings.
//!
//! `ReportContent` is assembled once per render from a `NormalizedRecord`.
//! The preview is this model as-is; the PDF layout is composed from it, so
//! both show the same values in the same order.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::sections::{SectionKind, SECTION_ORDER};
use super::style::{RiskDisplay, StyleProfile};
use crate::normalize::{flag_label, NormalizedRecord, RiskCategory, RiskLevel};

/// Display format of the generation timestamp.
pub const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Typed display block, rendered natively by each target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Level 1 is the report title, 2 a section heading, 3 a sub-heading.
    Heading { level: u8, text: String },
    Caption { text: String },
    KeyValues { pairs: Vec<KeyValue> },
    BulletList { items: Vec<KeyValue> },
    Paragraph { text: String },
    RiskBadge { level: RiskLevel },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContent {
    pub title: String,
    pub generated_at: String,
    pub branded_header: bool,
    pub sections: Vec<Section>,
}

impl ReportContent {
    pub fn assemble(
        record: &NormalizedRecord,
        style: &StyleProfile,
        generated_at: NaiveDateTime,
    ) -> Self {
        let generated_at = generated_at.format(GENERATED_FORMAT).to_string();
        let sections = SECTION_ORDER
            .iter()
            .map(|&kind| Section {
                kind,
                blocks: section_blocks(kind, record, style, &generated_at),
            })
            .collect();

        Self {
            title: style.title.clone(),
            generated_at,
            branded_header: style.branded_header,
            sections,
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Every piece of text in display order, labels included.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        for block in self.sections.iter().flat_map(|s| &s.blocks) {
            match block {
                Block::Heading { text, .. } | Block::Caption { text } | Block::Paragraph { text } => {
                    out.push(text.clone())
                }
                Block::KeyValues { pairs: items } | Block::BulletList { items } => {
                    for kv in items {
                        out.push(kv.key.clone());
                        out.push(kv.value.clone());
                    }
                }
                Block::RiskBadge { level } => out.push(level.as_str().to_string()),
            }
        }
        out
    }
}

fn section_blocks(
    kind: SectionKind,
    record: &NormalizedRecord,
    style: &StyleProfile,
    generated_at: &str,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    let heading = match (kind, style.risk_display) {
        (SectionKind::RiskAssessment, RiskDisplay::Verbatim) => Some("RISK FLAGS"),
        _ => kind.heading(),
    };
    if let Some(text) = heading {
        blocks.push(Block::Heading { level: 2, text: text.into() });
    }

    match kind {
        SectionKind::Header => {
            blocks.push(Block::Heading { level: 1, text: style.title.clone() });
            blocks.push(Block::Caption { text: style.subtitle.clone() });
            blocks.push(Block::KeyValues {
                pairs: vec![KeyValue::new("Generated:", generated_at)],
            });
        }
        SectionKind::ClientIdentity => {
            blocks.push(Block::KeyValues {
                pairs: vec![
                    KeyValue::new("Client:", &record.client_name),
                    KeyValue::new("Nurse:", &record.nurse_name),
                    KeyValue::new("Date:", &record.assessment_date),
                    KeyValue::new("Client ID:", &record.client_id),
                    KeyValue::new("Contact ID:", &record.contact_id),
                ],
            });
        }
        SectionKind::RiskAssessment => match style.risk_display {
            RiskDisplay::Categorical => {
                blocks.push(Block::RiskBadge { level: record.risk_level });
                blocks.push(Block::BulletList {
                    items: record
                        .categories
                        .iter()
                        .map(|c| KeyValue::new(c.category.label(), flag_label(c.flag)))
                        .collect(),
                });
            }
            RiskDisplay::Verbatim => {
                blocks.push(Block::BulletList {
                    items: record
                        .categories
                        .iter()
                        .map(|c| KeyValue::new(c.category.short_label(), &c.raw_flag))
                        .collect(),
                });
            }
        },
        SectionKind::DiscussionTopics => {
            blocks.push(Block::BulletList {
                items: record
                    .categories
                    .iter()
                    .map(|c| KeyValue::new(c.category.label(), &c.topics))
                    .collect(),
            });
        }
        SectionKind::Summaries => {
            for category in RiskCategory::ALL {
                blocks.push(Block::Heading {
                    level: 3,
                    text: category.summary_heading().into(),
                });
                blocks.push(Block::Paragraph {
                    text: record.category(category).summary.clone(),
                });
            }
        }
        SectionKind::Footer => {
            blocks.push(Block::Caption { text: style.footer.clone() });
        }
    }
    blocks
}
