//! Firestore REST DTOs.
//!
//! Documents carry their fields as typed values, e.g.
//! `{"title": {"stringValue": "Hi"}, "sent": {"booleanValue": true}}`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Typed Firestore value (one key per value kind).
///
/// Field maps decode leniently: a value of a kind this enum does not know,
/// or one that does not fit its variant, becomes `Unrecognized` instead of
/// failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(IntegerRepr),
    DoubleValue(DoubleRepr),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
    #[serde(skip)]
    Unrecognized(serde_json::Value),
}

/// int64 values are string-encoded on the wire, some emitters send numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegerRepr {
    Text(String),
    Number(i64),
}

/// Non-finite doubles are written as `"NaN"`, `"Infinity"` or `"-Infinity"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DoubleRepr {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, deserialize_with = "lenient_values")]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, deserialize_with = "lenient_fields")]
    pub fields: HashMap<String, FirestoreValue>,
}

fn lenient_fields<'de, D>(deserializer: D) -> Result<HashMap<String, FirestoreValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| (name, FirestoreValue::from_json(value)))
        .collect())
}

fn lenient_values<'de, D>(deserializer: D) -> Result<Vec<FirestoreValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(FirestoreValue::from_json).collect())
}

impl FirestoreValue {
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(Self::Unrecognized(value))
    }

    /// Loose truthiness, matching how the stored `sent` flag has always been read.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::NullValue(()) => false,
            Self::BooleanValue(b) => *b,
            Self::IntegerValue(IntegerRepr::Number(n)) => *n != 0,
            Self::IntegerValue(IntegerRepr::Text(s)) => !matches!(s.trim().parse::<i64>(), Ok(0)),
            Self::DoubleValue(DoubleRepr::Number(d)) => *d != 0.0 && !d.is_nan(),
            Self::DoubleValue(DoubleRepr::Text(s)) => s
                .trim()
                .parse::<f64>()
                .is_ok_and(|d| d != 0.0 && !d.is_nan()),
            Self::StringValue(s) => !s.is_empty(),
            Self::TimestampValue(_)
            | Self::BytesValue(_)
            | Self::ReferenceValue(_)
            | Self::GeoPointValue(_)
            | Self::ArrayValue(_)
            | Self::MapValue(_)
            | Self::Unrecognized(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(s) => Some(s),
            _ => None,
        }
    }
}

/// Firestore document resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_fields")]
    pub fields: HashMap<String, FirestoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Document change event delivered to the trigger endpoint.
///
/// For a creation `oldValue` is absent or an empty document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEvent {
    #[serde(default)]
    pub old_value: Option<FirestoreDocument>,
    pub value: FirestoreDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<serde_json::Value>,
}

impl DocumentEvent {
    pub fn is_create(&self) -> bool {
        self.old_value
            .as_ref()
            .is_none_or(|old| old.name.is_empty())
    }
}

/// Body of a `PATCH` document request; only masked fields are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub fields: HashMap<String, FirestoreValue>,
}
