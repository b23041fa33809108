//! Input contract from the query layer.
//!
//! A record is one flat row of the client measures table: field name to a
//! scalar of whatever type the warehouse returned, with any field possibly
//! absent. Nothing here fails on missing data; absent keys read as `Null`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ReportError;
use crate::normalize::{format_date, safe_string};

// ─── Field names ──────────────────────────────────────────────────────────────

pub mod fields {
    pub const CLIENT_ID: &str = "koo_clientid";
    pub const CONTACT_ID: &str = "koo_contactid";
    pub const CLIENT_NAME: &str = "client_name";
    pub const NURSE_NAME: &str = "nurse_name";
    pub const CREATED_ON: &str = "createdon";
    pub const RESPONSE_HOUSE: &str = "response_house";
    pub const RESPONSE_IMPAIRMENT: &str = "response_impa";
    pub const RESPONSE_MMH: &str = "response_mmh";
    pub const HOUSING_SUMMARY: &str = "housing_summary";
    pub const IMPAIRMENT_SUMMARY: &str = "impairments_summary";
    pub const MMH_SUMMARY: &str = "mmh_summary";
    pub const TOPICS_HOUSE: &str = "topic_tags_house";
    pub const TOPICS_IMPAIRMENT: &str = "topic_tags_impairment";
    pub const TOPICS_MMH: &str = "topic_tags_mmh";
    pub const HOUSING_RISK: &str = "housing_risk_flag";
    pub const IMPAIRMENT_RISK: &str = "impairment_risk_flag";
    pub const MMH_RISK: &str = "mmh_risk_flag";
}

/// Declared column type in the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
}

/// Columns of the client measures table, in select order.
pub const SCHEMA: &[(&str, FieldKind)] = &[
    (fields::CLIENT_ID, FieldKind::Text),
    (fields::CONTACT_ID, FieldKind::Text),
    (fields::CLIENT_NAME, FieldKind::Text),
    (fields::NURSE_NAME, FieldKind::Text),
    (fields::CREATED_ON, FieldKind::Date),
    (fields::RESPONSE_HOUSE, FieldKind::Text),
    (fields::RESPONSE_IMPAIRMENT, FieldKind::Text),
    (fields::RESPONSE_MMH, FieldKind::Text),
    (fields::HOUSING_SUMMARY, FieldKind::Text),
    (fields::IMPAIRMENT_SUMMARY, FieldKind::Text),
    (fields::MMH_SUMMARY, FieldKind::Text),
    (fields::TOPICS_HOUSE, FieldKind::Text),
    (fields::TOPICS_IMPAIRMENT, FieldKind::Text),
    (fields::TOPICS_MMH, FieldKind::Text),
    (fields::HOUSING_RISK, FieldKind::Text),
    (fields::IMPAIRMENT_RISK, FieldKind::Text),
    (fields::MMH_RISK, FieldKind::Text),
];

/// Looks up the declared kind of a column. Unknown columns are text.
pub fn field_kind(name: &str) -> FieldKind {
    SCHEMA
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
        .unwrap_or(FieldKind::Text)
}

// ─── Values ───────────────────────────────────────────────────────────────────

/// One scalar cell as returned by the query layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

static NULL: FieldValue = FieldValue::Null;

impl FieldValue {
    /// Null, or a float NaN (pandas' missing-value marker).
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }

    /// Re-types a text cell according to the column's declared kind.
    fn coerce(self, kind: FieldKind) -> Self {
        match (kind, self) {
            (FieldKind::Date, Self::Text(s)) => parse_date_text(&s).unwrap_or(Self::Text(s)),
            (_, value) => value,
        }
    }
}

fn parse_date_text(s: &str) -> Option<FieldValue> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(FieldValue::Date(date));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.fZ"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .map(FieldValue::Timestamp)
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) if f.is_nan() => serializer.serialize_none(),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            Self::Timestamp(ts) => {
                serializer.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

// ─── Records ──────────────────────────────────────────────────────────────────

/// One row fetched by the query layer. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Returns the field, or `Null` when absent.
    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&NULL)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses one JSON object, applying the table's declared column kinds.
    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    fn from_json_value(value: Value) -> Result<Self, ReportError> {
        match value {
            Value::Object(map) => {
                let fields = map
                    .into_iter()
                    .map(|(name, v)| {
                        let kind = field_kind(&name);
                        let value = FieldValue::from_json(v).coerce(kind);
                        (name, value)
                    })
                    .collect();
                Ok(Self { fields })
            }
            other => Err(ReportError::RecordShape(json_type_name(&other).into())),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Search results handed over by the query layer. The caller picks a row
/// explicitly; nothing is remembered between calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordSet {
    records: Vec<RawRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Accepts either a single JSON object or an array of objects.
    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        let value: Value = serde_json::from_str(json)?;
        let records = match value {
            Value::Array(items) => items
                .into_iter()
                .map(RawRecord::from_json_value)
                .collect::<Result<Vec<_>, _>>()?,
            object @ Value::Object(_) => vec![RawRecord::from_json_value(object)?],
            other => return Err(ReportError::RecordShape(json_type_name(&other).into())),
        };
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Resolves the selected row.
    pub fn select(&self, index: usize) -> Result<&RawRecord, ReportError> {
        self.records.get(index).ok_or(ReportError::RowOutOfRange {
            index,
            count: self.records.len(),
        })
    }

    /// One summary row per record, for the results table.
    pub fn summaries(&self) -> Vec<RecordSummary> {
        self.records.iter().map(RecordSummary::from_record).collect()
    }
}

/// Row of the search-results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub client_name: String,
    pub nurse_name: String,
    pub date: String,
    pub housing_risk: String,
    pub impairment_risk: String,
    pub mmh_risk: String,
}

impl RecordSummary {
    pub fn from_record(record: &RawRecord) -> Self {
        let created = record.get(fields::CREATED_ON);
        // The results table uses a shorter placeholder than the report.
        let date = if created.is_missing() {
            "N/A".to_string()
        } else {
            format_date(created)
        };
        Self {
            client_name: safe_string(record.get(fields::CLIENT_NAME)),
            nurse_name: safe_string(record.get(fields::NURSE_NAME)),
            date,
            housing_risk: safe_string(record.get(fields::HOUSING_RISK)),
            impairment_risk: safe_string(record.get(fields::IMPAIRMENT_RISK)),
            mmh_risk: safe_string(record.get(fields::MMH_RISK)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_field_reads_null() {
        let record = RawRecord::new().with(fields::CLIENT_NAME, "Jane Doe");
        assert_eq!(record.get(fields::NURSE_NAME), &FieldValue::Null);
        assert!(!record.contains(fields::NURSE_NAME));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn nan_is_missing() {
        assert!(FieldValue::Float(f64::NAN).is_missing());
        assert!(FieldValue::Null.is_missing());
        assert!(!FieldValue::Float(0.0).is_missing());
        assert!(!FieldValue::Text(String::new()).is_missing());
    }

    #[test]
    fn option_into_field_value() {
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(true)), FieldValue::Bool(true));
    }

    #[test]
    fn json_object_decodes_typed_values() {
        let record = RawRecord::from_json_str(
            r#"{
                "client_name": "Jane Doe",
                "housing_risk_flag": true,
                "impairment_risk_flag": 0,
                "mmh_risk_flag": 1.5,
                "nurse_name": null,
                "createdon": "2024-03-01"
            }"#,
        )
        .unwrap();

        assert_eq!(record.get(fields::CLIENT_NAME), &FieldValue::Text("Jane Doe".into()));
        assert_eq!(record.get(fields::HOUSING_RISK), &FieldValue::Bool(true));
        assert_eq!(record.get(fields::IMPAIRMENT_RISK), &FieldValue::Int(0));
        assert_eq!(record.get(fields::MMH_RISK), &FieldValue::Float(1.5));
        assert_eq!(record.get(fields::NURSE_NAME), &FieldValue::Null);
        assert_eq!(
            record.get(fields::CREATED_ON),
            &FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn date_column_accepts_timestamps() {
        let record =
            RawRecord::from_json_str(r#"{"createdon": "2024-03-01T09:30:00"}"#).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(record.get(fields::CREATED_ON), &FieldValue::Timestamp(expected));
    }

    #[test]
    fn date_column_keeps_unparseable_text() {
        let record = RawRecord::from_json_str(r#"{"createdon": "March 1st"}"#).unwrap();
        assert_eq!(record.get(fields::CREATED_ON), &FieldValue::Text("March 1st".into()));
    }

    #[test]
    fn text_columns_are_not_coerced() {
        let record = RawRecord::from_json_str(r#"{"housing_summary": "2024-03-01"}"#).unwrap();
        assert_eq!(
            record.get(fields::HOUSING_SUMMARY),
            &FieldValue::Text("2024-03-01".into())
        );
    }

    #[test]
    fn non_object_record_rejected() {
        let err = RawRecord::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ReportError::RecordShape(_)));
    }

    #[test]
    fn record_set_from_array_and_object() {
        let set = RecordSet::from_json_str(r#"[{"client_name": "A"}, {"client_name": "B"}]"#)
            .unwrap();
        assert_eq!(set.len(), 2);

        let single = RecordSet::from_json_str(r#"{"client_name": "A"}"#).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn select_out_of_range() {
        let set = RecordSet::new(vec![RawRecord::new()]);
        assert!(set.select(0).is_ok());
        match set.select(3) {
            Err(ReportError::RowOutOfRange { index, count }) => {
                assert_eq!(index, 3);
                assert_eq!(count, 1);
            }
            other => panic!("expected RowOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn summary_row_uses_short_placeholder_for_date() {
        let summary = RecordSummary::from_record(
            &RawRecord::new()
                .with(fields::CLIENT_NAME, "Jane Doe")
                .with(fields::HOUSING_RISK, "Yes"),
        );
        assert_eq!(summary.client_name, "Jane Doe");
        assert_eq!(summary.nurse_name, "Not available");
        assert_eq!(summary.date, "N/A");
        assert_eq!(summary.housing_risk, "Yes");
        assert_eq!(summary.mmh_risk, "Not available");
    }

    #[test]
    fn summary_row_truncates_text_dates() {
        let summary = RecordSummary::from_record(
            &RawRecord::new().with(fields::CREATED_ON, "2024-03-01 garbage"),
        );
        assert_eq!(summary.date, "2024-03-01");
    }

    #[test]
    fn field_value_serializes_dates_as_strings() {
        let record = RawRecord::new()
            .with(fields::CREATED_ON, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .with(fields::MMH_RISK, f64::NAN);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""createdon":"2024-03-01""#));
        assert!(json.contains(r#""mmh_risk_flag":null"#));
    }
}
