//! Field normalization: raw cells to canonical display values.
//!
//! Everything here is total. Missing data becomes a placeholder or an
//! `Unknown` flag, and unrecognized flag encodings fall back to `Clear`.

use serde::{Deserialize, Serialize};

use crate::record::{fields, FieldValue, RawRecord};

/// Placeholder for null, NaN or absent fields.
pub const NOT_AVAILABLE: &str = "Not available";

/// Per-flag label when the flag was never recorded.
pub const NOT_ASSESSED: &str = "Not assessed";

const TRUE_TOKENS: &[&str] = &["true", "t", "1", "yes", "y"];
const FALSE_TOKENS: &[&str] = &["false", "f", "0", "no", "n", ""];

/// Tri-state risk indicator for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    Raised,
    Clear,
    Unknown,
}

impl RiskFlag {
    /// Aggregation view: `Unknown` counts as not risky.
    pub fn is_raised(self) -> bool {
        matches!(self, Self::Raised)
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Raised => Some(true),
            Self::Clear => Some(false),
            Self::Unknown => None,
        }
    }
}

impl From<bool> for RiskFlag {
    fn from(v: bool) -> Self {
        if v {
            Self::Raised
        } else {
            Self::Clear
        }
    }
}

/// Aggregate classification from the number of raised flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW RISK")]
    Low,
    #[serde(rename = "MODERATE RISK")]
    Moderate,
    #[serde(rename = "HIGH RISK")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW RISK",
            Self::Moderate => "MODERATE RISK",
            Self::High => "HIGH RISK",
        }
    }

    /// Accent colour used when the level is displayed.
    pub fn color_hex(&self) -> &'static str {
        match self {
            Self::High => "#C41E3A",
            Self::Moderate => "#FF8C00",
            Self::Low => "#228B22",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapses any raw flag encoding into a `RiskFlag`.
pub fn normalize_flag(value: &FieldValue) -> RiskFlag {
    match value {
        FieldValue::Null => RiskFlag::Unknown,
        FieldValue::Float(v) if v.is_nan() => RiskFlag::Unknown,
        FieldValue::Bool(b) => RiskFlag::from(*b),
        FieldValue::Int(i) => RiskFlag::from(*i != 0),
        FieldValue::Float(v) => RiskFlag::from(*v != 0.0),
        FieldValue::Text(s) => {
            let token = s.trim().to_lowercase();
            if TRUE_TOKENS.contains(&token.as_str()) {
                RiskFlag::Raised
            } else if FALSE_TOKENS.contains(&token.as_str()) {
                RiskFlag::Clear
            } else {
                tracing::debug!(value = %s, "Unrecognized risk flag encoding, treating as clear");
                RiskFlag::Clear
            }
        }
        FieldValue::Date(_) | FieldValue::Timestamp(_) => {
            tracing::debug!("Date value in risk flag field, treating as clear");
            RiskFlag::Clear
        }
    }
}

/// 0 raised flags → LOW, 1 → MODERATE, 2 or more → HIGH.
pub fn classify_risk(flags: [RiskFlag; 3]) -> RiskLevel {
    match flags.iter().filter(|f| f.is_raised()).count() {
        0 => RiskLevel::Low,
        1 => RiskLevel::Moderate,
        _ => RiskLevel::High,
    }
}

/// Per-category display label. Unlike aggregation, `Unknown` is shown as
/// "Not assessed" rather than folded into "LOW RISK".
pub fn flag_label(flag: RiskFlag) -> &'static str {
    match flag {
        RiskFlag::Raised => "HIGH RISK",
        RiskFlag::Clear => "LOW RISK",
        RiskFlag::Unknown => NOT_ASSESSED,
    }
}

/// Null-safe stringification.
pub fn safe_string(value: &FieldValue) -> String {
    match value {
        v if v.is_missing() => NOT_AVAILABLE.to_string(),
        FieldValue::Bool(true) => "True".to_string(),
        FieldValue::Bool(false) => "False".to_string(),
        FieldValue::Int(i) => i.to_string(),
        // Debug keeps the decimal point on whole floats ("1.0").
        FieldValue::Float(v) => format!("{v:?}"),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        FieldValue::Timestamp(ts) => ts.format("%Y-%m-%d").to_string(),
        FieldValue::Null => NOT_AVAILABLE.to_string(),
    }
}

/// Assessment date display: real dates as `YYYY-MM-DD`, text cut to its
/// first ten characters.
pub fn format_date(value: &FieldValue) -> String {
    match value {
        v if v.is_missing() => NOT_AVAILABLE.to_string(),
        FieldValue::Date(_) | FieldValue::Timestamp(_) => safe_string(value),
        other => safe_string(other).chars().take(10).collect(),
    }
}

/// The three risk categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Housing,
    Impairment,
    MentalMaternalHealth,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [
        RiskCategory::Housing,
        RiskCategory::Impairment,
        RiskCategory::MentalMaternalHealth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Impairment => "Impairment",
            Self::MentalMaternalHealth => "Mental/Maternal Health",
        }
    }

    /// Shorter label used where the raw flag values are listed.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::MentalMaternalHealth => "MMH",
            other => other.label(),
        }
    }

    pub fn summary_heading(&self) -> &'static str {
        match self {
            Self::Housing => "Housing Situation:",
            Self::Impairment => "Impairment Status:",
            Self::MentalMaternalHealth => "Mental/Maternal Health:",
        }
    }

    fn flag_field(&self) -> &'static str {
        match self {
            Self::Housing => fields::HOUSING_RISK,
            Self::Impairment => fields::IMPAIRMENT_RISK,
            Self::MentalMaternalHealth => fields::MMH_RISK,
        }
    }

    fn topics_field(&self) -> &'static str {
        match self {
            Self::Housing => fields::TOPICS_HOUSE,
            Self::Impairment => fields::TOPICS_IMPAIRMENT,
            Self::MentalMaternalHealth => fields::TOPICS_MMH,
        }
    }

    fn summary_field(&self) -> &'static str {
        match self {
            Self::Housing => fields::HOUSING_SUMMARY,
            Self::Impairment => fields::IMPAIRMENT_SUMMARY,
            Self::MentalMaternalHealth => fields::MMH_SUMMARY,
        }
    }
}

/// Normalized view of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: RiskCategory,
    pub flag: RiskFlag,
    /// The stored flag value as text, unvalidated.
    pub raw_flag: String,
    pub topics: String,
    pub summary: String,
}

/// A record after null-safe stringification and derived-field computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub client_id: String,
    pub contact_id: String,
    pub client_name: String,
    pub nurse_name: String,
    pub assessment_date: String,
    pub categories: [CategoryDetail; 3],
    pub risk_level: RiskLevel,
}

impl NormalizedRecord {
    pub fn from_raw(record: &RawRecord) -> Self {
        let categories = RiskCategory::ALL.map(|category| CategoryDetail {
            category,
            flag: normalize_flag(record.get(category.flag_field())),
            raw_flag: safe_string(record.get(category.flag_field())),
            topics: safe_string(record.get(category.topics_field())),
            summary: safe_string(record.get(category.summary_field())),
        });
        let risk_level = classify_risk(categories.each_ref().map(|c| c.flag));

        Self {
            client_id: safe_string(record.get(fields::CLIENT_ID)),
            contact_id: safe_string(record.get(fields::CONTACT_ID)),
            client_name: safe_string(record.get(fields::CLIENT_NAME)),
            nurse_name: safe_string(record.get(fields::NURSE_NAME)),
            assessment_date: format_date(record.get(fields::CREATED_ON)),
            categories,
            risk_level,
        }
    }

    pub fn flags(&self) -> [RiskFlag; 3] {
        self.categories.each_ref().map(|c| c.flag)
    }

    pub fn category(&self, category: RiskCategory) -> &CategoryDetail {
        // Fixed order: Housing, Impairment, MentalMaternalHealth.
        let index = RiskCategory::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default();
        &self.categories[index]
    }
}
