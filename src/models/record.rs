//! Catalog record model.
//!
//! Records are stored as loosely-typed documents: a map of named attributes
//! plus the legacy `FIELD9` checkout marker. Known attributes are read through
//! absent-safe accessors so that missing or oddly-typed values degrade to
//! defaults instead of failing deserialization.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Attribute holding the record title.
pub const TITLE_FIELD: &str = "titre_avec_lien_vers_le_catalogue";
/// Attribute holding the author name.
pub const AUTHOR_FIELD: &str = "auteur";
/// Attribute holding the document type.
pub const TYPE_FIELD: &str = "type_de_document";
/// Attribute holding the number of pending reservations.
pub const RESERVATIONS_FIELD: &str = "nombre_de_reservations";
/// Attribute holding the popularity rank.
pub const RANK_FIELD: &str = "rang";

static NUMERIC_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("valid numeric pattern"));

/// Store-assigned record identifier (24 hexadecimal characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "65a1f0c2e4b0a1b2c3d4e5f6")]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RecordId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        if s.len() == 24 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(AppError::Validation(format!("Invalid id: {:?}", s)))
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Exports may carry the id as extended JSON: {"$oid": "..."}
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(String),
            Extended {
                #[serde(rename = "$oid")]
                oid: String,
            },
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Plain(s) => s,
            Raw::Extended { oid } => oid,
        };
        raw.parse().map_err(de::Error::custom)
    }
}

/// Availability of a record, decoded from the `FIELD9` marker.
///
/// On the wire the marker is a plain string: empty when the record is on the
/// shelf, the checkout instant otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Available,
    /// Checked out; holds the marker text as stored.
    CheckedOut(String),
}

impl CheckoutState {
    /// Checkout marker for the current instant.
    pub fn checked_out_now() -> Self {
        Self::checked_out_at(Utc::now())
    }

    pub fn checked_out_at(at: DateTime<Utc>) -> Self {
        CheckoutState::CheckedOut(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Decode a raw marker; empty and missing markers mean available.
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some(m) if !m.is_empty() => CheckoutState::CheckedOut(m.to_string()),
            _ => CheckoutState::Available,
        }
    }

    pub fn marker(&self) -> &str {
        match self {
            CheckoutState::Available => "",
            CheckoutState::CheckedOut(m) => m,
        }
    }

    pub fn is_checked_out(&self) -> bool {
        matches!(self, CheckoutState::CheckedOut(_))
    }

    /// Checkout instant, when the marker is a valid timestamp.
    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            CheckoutState::Available => None,
            CheckoutState::CheckedOut(m) => DateTime::parse_from_rfc3339(m)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
        }
    }
}

impl Serialize for CheckoutState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.marker())
    }
}

impl<'de> Deserialize<'de> for CheckoutState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let marker = Option::<String>::deserialize(deserializer)?;
        Ok(CheckoutState::from_marker(marker.as_deref()))
    }
}

/// Named attributes of a record, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordFields(pub Map<String, Value>);

impl RecordFields {
    /// Text value of an attribute. Null and missing yield `None`; scalars
    /// other than strings are rendered as text.
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    pub fn title(&self) -> Option<Cow<'_, str>> {
        self.text(TITLE_FIELD)
    }

    pub fn author(&self) -> Option<Cow<'_, str>> {
        self.text(AUTHOR_FIELD)
    }

    pub fn document_type(&self) -> Option<Cow<'_, str>> {
        self.text(TYPE_FIELD)
    }

    pub fn rank(&self) -> Option<Cow<'_, str>> {
        self.text(RANK_FIELD)
    }

    /// Reservation count coerced to an integer (missing or non-numeric is 0).
    pub fn reservations(&self) -> i64 {
        coerce_reservations(self.0.get(RESERVATIONS_FIELD))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }
}

/// Integer coercion applied to reservation counts.
///
/// Numbers are truncated, numeric strings are parsed then truncated, booleans
/// count as 1/0 and everything else counts as 0.
pub fn coerce_reservations(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            if NUMERIC_TEXT.is_match(s) {
                s.parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0)
            } else {
                0
            }
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// One catalog entry as exchanged with clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: RecordFields,
    /// Checkout marker: empty when available, ISO-8601 instant otherwise
    #[serde(rename = "FIELD9", default)]
    #[schema(value_type = String)]
    pub checkout: CheckoutState,
}

impl Record {
    pub fn new(id: RecordId, fields: RecordFields) -> Self {
        Self {
            id,
            fields,
            checkout: CheckoutState::Available,
        }
    }

    pub fn is_checked_out(&self) -> bool {
        self.checkout.is_checked_out()
    }
}

/// Attributes that can be grouped or listed distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Title,
    Author,
    DocumentType,
}

impl RecordField {
    pub fn key(self) -> &'static str {
        match self {
            RecordField::Title => TITLE_FIELD,
            RecordField::Author => AUTHOR_FIELD,
            RecordField::DocumentType => TYPE_FIELD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_validation() {
        assert!("65a1f0c2e4b0a1b2c3d4e5f6".parse::<RecordId>().is_ok());
        assert!("65A1F0C2E4B0A1B2C3D4E5F6".parse::<RecordId>().is_ok());
        assert!("not-an-id".parse::<RecordId>().is_err());
        assert!("65a1f0c2e4b0a1b2c3d4e5fz".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_record_id_extended_json() {
        let id: RecordId = serde_json::from_value(json!({"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"})).unwrap();
        assert_eq!(id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_checkout_marker_decoding() {
        let record: Record = serde_json::from_value(json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "fields": {"auteur": "Saint-Exupéry"},
            "FIELD9": null
        }))
        .unwrap();
        assert_eq!(record.checkout, CheckoutState::Available);

        let record: Record = serde_json::from_value(json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "FIELD9": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();
        assert!(record.is_checked_out());
        assert!(record.checkout.since().is_some());
    }

    #[test]
    fn test_checkout_marker_wire_format() {
        let mut record = Record::new(
            "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap(),
            RecordFields::default(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["FIELD9"], "");

        let at = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap().with_timezone(&Utc);
        record.checkout = CheckoutState::checked_out_at(at);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["FIELD9"], "2024-03-01T10:00:00.000Z");
    }

    #[test]
    fn test_coerce_reservations() {
        assert_eq!(coerce_reservations(None), 0);
        assert_eq!(coerce_reservations(Some(&Value::Null)), 0);
        assert_eq!(coerce_reservations(Some(&json!(5))), 5);
        assert_eq!(coerce_reservations(Some(&json!(2.9))), 2);
        assert_eq!(coerce_reservations(Some(&json!(" 12 "))), 12);
        assert_eq!(coerce_reservations(Some(&json!("3.5"))), 3);
        assert_eq!(coerce_reservations(Some(&json!("beaucoup"))), 0);
        assert_eq!(coerce_reservations(Some(&json!(true))), 1);
    }

    #[test]
    fn test_field_text_is_absent_safe() {
        let fields: RecordFields = serde_json::from_value(json!({
            "titre_avec_lien_vers_le_catalogue": "Le Petit Prince",
            "auteur": null,
            "rang": 4
        }))
        .unwrap();
        assert_eq!(fields.title().as_deref(), Some("Le Petit Prince"));
        assert_eq!(fields.author(), None);
        assert_eq!(fields.document_type(), None);
        assert_eq!(fields.rank().as_deref(), Some("4"));
    }
}
