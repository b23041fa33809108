//! Style profiles: cosmetic variants of the same report.
//!
//! A profile never changes section order or field values, only colours,
//! titles, the branded header graphic and how risk flags are shown.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// `#RRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse(value: &str) -> Result<Self, ReportError> {
        let invalid = || ReportError::InvalidColor { value: value.to_string() };
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels scaled to the 0.0 to 1.0 range.
    pub fn to_unit_rgb(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Fixed body palette shared by all profiles.
pub mod palette {
    use super::HexColor;

    pub const BODY: HexColor = HexColor::new(0x33, 0x33, 0x33);
    pub const MUTED: HexColor = HexColor::new(0x66, 0x66, 0x66);
    pub const SUBSECTION: HexColor = HexColor::new(0x44, 0x44, 0x44);
    pub const RULE: HexColor = HexColor::new(0xDD, 0xDD, 0xDD);
    pub const FOOTER: HexColor = HexColor::new(0x99, 0x99, 0x99);
}

/// How the risk section presents the three flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDisplay {
    /// Overall risk level plus a normalized label per category.
    Categorical,
    /// The stored flag values as text, unvalidated.
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub accent_color: HexColor,
    #[serde(default)]
    pub branded_header: bool,
    pub risk_display: RiskDisplay,
    pub footer: String,
}

pub const PRESET_NAMES: &[&str] = &["standard", "branded", "raw-flags"];

impl StyleProfile {
    /// Categorical risk block, crimson accent.
    pub fn standard() -> Self {
        Self {
            name: "standard".into(),
            title: "CLIENT BACKGROUND REPORT".into(),
            subtitle: "Based on Plunket AI Model Analysis".into(),
            accent_color: HexColor::new(0xC4, 0x1E, 0x3A),
            branded_header: false,
            risk_display: RiskDisplay::Categorical,
            footer: "Generated by Plunket AI Model.".into(),
        }
    }

    /// Categorical risk block under a branded "PDF" badge, pink accent.
    pub fn branded() -> Self {
        Self {
            name: "branded".into(),
            title: "Client Background Report".into(),
            accent_color: HexColor::new(0xE9, 0x1E, 0x63),
            branded_header: true,
            ..Self::standard()
        }
    }

    /// Raw stored flag values instead of normalized labels.
    pub fn raw_flags() -> Self {
        Self {
            name: "raw-flags".into(),
            risk_display: RiskDisplay::Verbatim,
            ..Self::standard()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::standard()),
            "branded" => Some(Self::branded()),
            "raw-flags" => Some(Self::raw_flags()),
            _ => None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a JSON profile file.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Preset name, or else a path to a JSON profile.
    pub fn resolve(name_or_path: &str) -> Result<Self, ReportError> {
        if let Some(profile) = Self::preset(name_or_path) {
            return Ok(profile);
        }
        let path = Path::new(name_or_path);
        if path.is_file() {
            return Self::load(path);
        }
        Err(ReportError::UnknownProfile(name_or_path.to_string()))
    }
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parse_and_display() {
        let c = HexColor::parse("#c41e3a").unwrap();
        assert_eq!(c, HexColor::new(0xC4, 0x1E, 0x3A));
        assert_eq!(c.to_string(), "#C41E3A");
    }

    #[test]
    fn hex_color_rejects_bad_input() {
        for bad in ["C41E3A", "#C41E3", "#GGGGGG", "", "#C41E3A00"] {
            assert!(HexColor::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn unit_rgb_bounds() {
        let (r, g, b) = HexColor::new(255, 0, 0).to_unit_rgb();
        assert_eq!((r, g, b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn presets_resolve_by_name() {
        for name in PRESET_NAMES {
            let profile = StyleProfile::preset(name).unwrap();
            assert_eq!(profile.name, *name);
        }
        assert!(StyleProfile::preset("neon").is_none());
    }

    #[test]
    fn presets_differ_only_cosmetically() {
        let standard = StyleProfile::standard();
        let branded = StyleProfile::branded();
        let raw = StyleProfile::raw_flags();
        assert!(branded.branded_header && !standard.branded_header);
        assert_eq!(raw.risk_display, RiskDisplay::Verbatim);
        assert_eq!(standard.risk_display, RiskDisplay::Categorical);
        assert_eq!(standard.footer, raw.footer);
    }

    #[test]
    fn profile_json_roundtrip() {
        let json = r##"{
            "name": "clinic",
            "title": "CASE REPORT",
            "subtitle": "Internal",
            "accent_color": "#2563EB",
            "risk_display": "verbatim",
            "footer": "Clinic use only."
        }"##;
        let profile = StyleProfile::from_json_str(json).unwrap();
        assert_eq!(profile.accent_color, HexColor::new(0x25, 0x63, 0xEB));
        assert!(!profile.branded_header);

        let back = serde_json::to_string(&profile).unwrap();
        assert!(back.contains("\"#2563EB\""));
    }

    #[test]
    fn profile_json_rejects_bad_color() {
        let json = r#"{"name":"x","title":"t","subtitle":"s","accent_color":"blue",
                       "risk_display":"categorical","footer":"f"}"#;
        assert!(StyleProfile::from_json_str(json).is_err());
    }

    #[test]
    fn resolve_unknown_profile() {
        match StyleProfile::resolve("definitely-not-a-profile") {
            Err(ReportError::UnknownProfile(name)) => assert_eq!(name, "definitely-not-a-profile"),
            other => panic!("expected UnknownProfile, got {other:?}"),
        }
    }

    #[test]
    fn resolve_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        let profile = StyleProfile::branded();
        std::fs::write(&path, serde_json::to_string(&profile).unwrap()).unwrap();

        let loaded = StyleProfile::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded, profile);
    }
}
