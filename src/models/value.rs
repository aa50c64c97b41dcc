//! Canonical attribute values.
//!
//! Defines [`CanonicalValue`], the wire-format-independent representation of
//! an OTLP attribute value, and the attribute list types shared by every
//! signal. Integers are carried as decimal strings so the full 64-bit range
//! survives JSON boundaries; bytes are carried as lowercase hex.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A single attribute value, independent of wire format.
///
/// The serde representation matches the OTLP JSON `AnyValue` shape: an
/// object with exactly one of the variant fields set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanonicalValue {
    /// A UTF-8 string.
    #[serde(rename = "stringValue")]
    String(String),

    /// A boolean.
    #[serde(rename = "boolValue")]
    Bool(bool),

    /// A 64-bit integer as a decimal string.
    ///
    /// Kept textual end-to-end: values beyond 2^53 would lose precision in
    /// any floating-point representation.
    #[serde(rename = "intValue", deserialize_with = "de_int_string")]
    Int(String),

    /// A double-precision float.
    #[serde(rename = "doubleValue")]
    Double(f64),

    /// Raw bytes as a lowercase hex string.
    #[serde(rename = "bytesValue")]
    Bytes(String),

    /// An ordered list of values.
    #[serde(rename = "arrayValue")]
    Array(ValueList),

    /// A nested key/value list.
    #[serde(rename = "kvlistValue")]
    KvList(KeyValueList),
}

/// The payload of an array value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueList {
    /// The element values, in order.
    #[serde(default)]
    pub values: Vec<CanonicalValue>,
}

/// The payload of a nested key/value list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyValueList {
    /// The entries, in order.
    #[serde(default)]
    pub values: Vec<KeyValuePair>,
}

/// One attribute entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValuePair {
    /// The attribute key.
    pub key: String,
    /// The attribute value; an unset wire variant becomes `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CanonicalValue>,
}

/// Accepts OTLP JSON `intValue` as either a string or a bare number.
fn de_int_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntRepr {
        Text(String),
        Number(i64),
    }

    Ok(match IntRepr::deserialize(deserializer)? {
        IntRepr::Text(s) => s,
        IntRepr::Number(n) => n.to_string(),
    })
}

impl CanonicalValue {
    /// Creates an integer value from a native 64-bit integer.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Int(value.to_string())
    }

    /// Returns the string payload if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for array and kvlist values.
    #[must_use]
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Array(_) | Self::KvList(_))
    }

    /// Renders this value as the storage map-column text.
    ///
    /// Scalars render as their bare text (`"true"`, `"123"`, `"3.14"`, hex
    /// for bytes); complex values render as their JSON text. The coercion
    /// layer reverses the scalar renderings on the read path.
    #[must_use]
    pub fn storage_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Int(s) => s.clone(),
            Self::Double(d) => {
                let mut text = d.to_string();
                // Keep doubles recognizable as numerals on the way back in.
                if !text.contains('.') && !text.contains('e') && d.is_finite() {
                    text.push_str(".0");
                }
                text
            }
            Self::Bytes(h) => h.clone(),
            Self::Array(_) | Self::KvList(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }

    /// Renders this value as a discovery value string, or `None` for
    /// complex values, which the discovery index skips.
    #[must_use]
    pub fn discovery_text(&self) -> Option<String> {
        if self.is_complex() {
            None
        } else {
            Some(self.storage_text())
        }
    }
}

/// An attribute list with unique keys.
///
/// Wire payloads may repeat a key; [`AttributeList::from_pairs`] keeps the
/// last occurrence, matching OTLP merge semantics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeList(pub Vec<KeyValuePair>);

impl AttributeList {
    /// Builds an attribute list from raw pairs, deduplicating keys
    /// (last occurrence wins) and dropping entries with unset values.
    #[must_use]
    pub fn from_pairs(pairs: Vec<KeyValuePair>) -> Self {
        let mut merged: BTreeMap<String, CanonicalValue> = BTreeMap::new();
        for pair in pairs {
            if let Some(value) = pair.value {
                merged.insert(pair.key, value);
            }
        }
        Self(
            merged
                .into_iter()
                .map(|(key, value)| KeyValuePair {
                    key,
                    value: Some(value),
                })
                .collect(),
        )
    }

    /// Returns true if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        self.0
            .iter()
            .find(|pair| pair.key == key)
            .and_then(|pair| pair.value.as_ref())
    }

    /// Renders the list as the storage map-column form.
    #[must_use]
    pub fn storage_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|pair| {
                pair.value
                    .as_ref()
                    .map(|value| (pair.key.clone(), value.storage_text()))
            })
            .collect()
    }

    /// Iterates over `(key, value)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalValue)> {
        self.0
            .iter()
            .filter_map(|pair| pair.value.as_ref().map(|value| (pair.key.as_str(), value)))
    }
}

/// The entity that produced a batch of telemetry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDesc {
    /// Resource attributes (`service.name` and friends).
    #[serde(default)]
    pub attributes: AttributeList,

    /// Count of attributes dropped before export.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dropped_attributes_count: u32,
}

impl ResourceDesc {
    /// Returns the `service.name` attribute if present and a string.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.attributes.get("service.name").and_then(CanonicalValue::as_str)
    }
}

/// The instrumentation scope that produced a batch of telemetry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeDesc {
    /// The scope name (library or module).
    #[serde(default)]
    pub name: String,

    /// The scope version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Scope attributes.
    #[serde(default)]
    pub attributes: AttributeList,

    /// Count of attributes dropped before export.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dropped_attributes_count: u32,
}

fn is_zero(count: &u32) -> bool {
    *count == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_value_serializes_as_string() {
        let value = CanonicalValue::Int("9223372036854775807".to_string());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"intValue":"9223372036854775807"}"#);
    }

    #[test]
    fn test_int_value_accepts_bare_number() {
        let value: CanonicalValue = serde_json::from_str(r#"{"intValue":42}"#).unwrap();
        assert_eq!(value, CanonicalValue::Int("42".to_string()));
    }

    #[test]
    fn test_storage_text_scalars() {
        assert_eq!(CanonicalValue::Bool(true).storage_text(), "true");
        assert_eq!(CanonicalValue::int(-7).storage_text(), "-7");
        assert_eq!(CanonicalValue::Double(3.14).storage_text(), "3.14");
        assert_eq!(CanonicalValue::Double(2.0).storage_text(), "2");
        assert_eq!(
            CanonicalValue::String("plain".to_string()).storage_text(),
            "plain"
        );
    }

    #[test]
    fn test_discovery_text_skips_complex() {
        let array = CanonicalValue::Array(ValueList {
            values: vec![CanonicalValue::int(1)],
        });
        assert_eq!(array.discovery_text(), None);
        assert_eq!(
            CanonicalValue::Bool(false).discovery_text(),
            Some("false".to_string())
        );
    }

    #[test]
    fn test_attribute_list_dedupes_last_wins() {
        let list = AttributeList::from_pairs(vec![
            KeyValuePair {
                key: "env".to_string(),
                value: Some(CanonicalValue::String("staging".to_string())),
            },
            KeyValuePair {
                key: "env".to_string(),
                value: Some(CanonicalValue::String("prod".to_string())),
            },
            KeyValuePair {
                key: "unset".to_string(),
                value: None,
            },
        ]);

        assert_eq!(list.len(), 1);
        assert_eq!(
            list.get("env"),
            Some(&CanonicalValue::String("prod".to_string()))
        );
    }

    #[test]
    fn test_resource_service_name() {
        let resource = ResourceDesc {
            attributes: AttributeList::from_pairs(vec![KeyValuePair {
                key: "service.name".to_string(),
                value: Some(CanonicalValue::String("checkout".to_string())),
            }]),
            dropped_attributes_count: 0,
        };
        assert_eq!(resource.service_name(), Some("checkout"));

        let empty = ResourceDesc::default();
        assert_eq!(empty.service_name(), None);
    }

    #[test]
    fn test_nested_value_round_trip() {
        let value = CanonicalValue::KvList(KeyValueList {
            values: vec![KeyValuePair {
                key: "inner".to_string(),
                value: Some(CanonicalValue::Array(ValueList {
                    values: vec![
                        CanonicalValue::int(1),
                        CanonicalValue::String("two".to_string()),
                    ],
                })),
            }],
        });

        let json = serde_json::to_string(&value).unwrap();
        let back: CanonicalValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
