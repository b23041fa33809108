use serde::{Deserialize, Serialize};

/// Report sections. Every report contains all of them, in `SECTION_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    ClientIdentity,
    RiskAssessment,
    DiscussionTopics,
    Summaries,
    Footer,
}

pub const SECTION_ORDER: [SectionKind; 6] = [
    SectionKind::Header,
    SectionKind::ClientIdentity,
    SectionKind::RiskAssessment,
    SectionKind::DiscussionTopics,
    SectionKind::Summaries,
    SectionKind::Footer,
];

impl SectionKind {
    /// Section heading, if the section carries one.
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Self::Header | Self::ClientIdentity | Self::Footer => None,
            Self::RiskAssessment => Some("RISK ASSESSMENT"),
            Self::DiscussionTopics => Some("DISCUSSION TOPICS"),
            Self::Summaries => Some("SUMMARIES"),
        }
    }

    /// Whether a divider rule separates this section from the previous one.
    pub fn ruled_above(&self) -> bool {
        !matches!(self, Self::Header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_starts_with_header_and_ends_with_footer() {
        assert_eq!(SECTION_ORDER.first(), Some(&SectionKind::Header));
        assert_eq!(SECTION_ORDER.last(), Some(&SectionKind::Footer));
    }

    #[test]
    fn order_has_no_duplicates() {
        let unique: std::collections::HashSet<_> = SECTION_ORDER.iter().collect();
        assert_eq!(unique.len(), SECTION_ORDER.len());
    }

    #[test]
    fn headings() {
        assert_eq!(SectionKind::Summaries.heading(), Some("SUMMARIES"));
        assert_eq!(SectionKind::ClientIdentity.heading(), None);
    }
}
