//! Row coercion layer.
//!
//! Pure, total translation between stored column text and typed values.
//! Attribute map columns hold stringified scalars, so the read path must
//! recover the original types (`"true"` was a bool, `"90210"` was a
//! number, `"Infinity"` was a string that merely looks numeric). Timestamp
//! conversion is exact integer arithmetic end-to-end; floating point never
//! touches a nanosecond value here.
//!
//! None of these functions fail on well-typed input. A failure means a
//! stored row violates the expected shape, which is schema drift or a
//! write-path defect, surfaced as [`EngineError::StorageRowParse`].

use crate::error::EngineError;
use crate::models::value::{AttributeList, CanonicalValue, KeyValuePair};
use std::collections::BTreeMap;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Coerces one stored attribute text back to a typed JSON value.
///
/// `"true"`/`"false"` become booleans; anything that parses as a strict
/// JSON numeral becomes a number; everything else stays the original
/// string. `"Infinity"`, `"NaN"`, `"0x10"`, and padded numerals are not
/// clean JSON numerals and stay strings.
#[must_use]
pub fn coerce_attribute_value(raw: &str) -> serde_json::Value {
    match raw {
        "true" => return serde_json::Value::Bool(true),
        "false" => return serde_json::Value::Bool(false),
        _ => {}
    }

    // serde_json tolerates surrounding whitespace; a padded numeral is not
    // a clean one, so reject it up front.
    if !raw.is_empty() && raw.trim() == raw {
        if let Ok(number) = serde_json::from_str::<serde_json::Number>(raw) {
            return serde_json::Value::Number(number);
        }
    }

    serde_json::Value::String(raw.to_string())
}

/// Coerces a stored attribute map element-wise.
///
/// Returns `None` for an empty map: an absent attribute set is represented
/// as absent, never as `{}`.
#[must_use]
pub fn coerce_attributes(
    raw: &BTreeMap<String, String>,
) -> Option<BTreeMap<String, serde_json::Value>> {
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.iter()
            .map(|(key, value)| (key.clone(), coerce_attribute_value(value)))
            .collect(),
    )
}

/// Coerces an array of stored attribute maps element-wise.
///
/// Each element follows [`coerce_attributes`] semantics; an empty input
/// array is absent.
#[must_use]
pub fn coerce_attributes_array(
    raw: &[BTreeMap<String, String>],
) -> Option<Vec<Option<BTreeMap<String, serde_json::Value>>>> {
    if raw.is_empty() {
        return None;
    }
    Some(raw.iter().map(coerce_attributes).collect())
}

/// Coerces a stored 64-bit counter array that may hold numbers or decimal
/// strings, dropping unparseable entries. Absent if nothing survives.
#[must_use]
pub fn coerce_u64_array(raw: &[serde_json::Value]) -> Option<Vec<String>> {
    let parsed: Vec<String> = raw
        .iter()
        .filter_map(|value| match value {
            serde_json::Value::Number(n) => n.as_u64().map(|v| v.to_string()),
            serde_json::Value::String(s) => s.parse::<u64>().ok().map(|v| v.to_string()),
            _ => None,
        })
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// Converts a typed JSON value from the coercion layer into the matching
/// canonical value. Integral numbers become decimal-string ints; anything
/// fractional becomes a double.
#[must_use]
pub fn coerced_to_canonical(value: &serde_json::Value) -> CanonicalValue {
    match value {
        serde_json::Value::Bool(b) => CanonicalValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CanonicalValue::Int(i.to_string())
            } else if let Some(u) = n.as_u64() {
                CanonicalValue::Int(u.to_string())
            } else {
                CanonicalValue::Double(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => CanonicalValue::String(s.clone()),
        other => CanonicalValue::String(other.to_string()),
    }
}

/// Coerces a stored attribute map into a canonical attribute list, or
/// `None` when the map is empty.
#[must_use]
pub fn coerce_to_attribute_list(raw: &BTreeMap<String, String>) -> Option<AttributeList> {
    coerce_attributes(raw).map(|typed| {
        AttributeList::from_pairs(
            typed
                .iter()
                .map(|(key, value)| KeyValuePair {
                    key: key.clone(),
                    value: Some(coerced_to_canonical(value)),
                })
                .collect(),
        )
    })
}

/// Converts decimal nanoseconds to the storage-native timestamp text
/// `YYYY-MM-DD hh:mm:ss.nnnnnnnnn`.
///
/// # Errors
///
/// Returns [`EngineError::StorageRowParse`] if the input is not a decimal
/// integer or the seconds component exceeds the calendar range.
pub fn nanos_to_native(nanos: &str) -> Result<String, EngineError> {
    let total: i128 = nanos
        .parse()
        .map_err(|_| EngineError::StorageRowParse(format!("invalid nanosecond value: {nanos}")))?;

    let seconds = total.div_euclid(NANOS_PER_SECOND);
    let fraction = total.rem_euclid(NANOS_PER_SECOND);

    let seconds = i64::try_from(seconds).map_err(|_| {
        EngineError::StorageRowParse(format!("timestamp out of range: {nanos}"))
    })?;
    let datetime = chrono::DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        EngineError::StorageRowParse(format!("timestamp out of range: {nanos}"))
    })?;

    Ok(format!(
        "{}.{:09}",
        datetime.format("%Y-%m-%d %H:%M:%S"),
        fraction
    ))
}

/// Converts storage-native timestamp text back to decimal nanoseconds.
///
/// Accepts a fractional part of up to nine digits (right-padded with
/// zeros), so `...00:00:00.5` means half a second.
///
/// # Errors
///
/// Returns [`EngineError::StorageRowParse`] if the text is not a valid
/// native timestamp.
pub fn native_to_nanos(native: &str) -> Result<String, EngineError> {
    let bad_row =
        || EngineError::StorageRowParse(format!("invalid native timestamp: {native}"));

    let (datetime_text, fraction_text) = match native.split_once('.') {
        Some((head, frac)) => (head, frac),
        None => (native, ""),
    };

    let datetime = chrono::NaiveDateTime::parse_from_str(datetime_text, "%Y-%m-%d %H:%M:%S")
        .map_err(|_| bad_row())?;
    let seconds = i128::from(datetime.and_utc().timestamp());

    if fraction_text.len() > 9 || !fraction_text.chars().all(|c| c.is_ascii_digit()) {
        return Err(bad_row());
    }
    let fraction: i128 = if fraction_text.is_empty() {
        0
    } else {
        let padded = format!("{fraction_text:0<9}");
        padded.parse().map_err(|_| bad_row())?
    };

    Ok((seconds * NANOS_PER_SECOND + fraction).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_booleans() {
        assert_eq!(coerce_attribute_value("true"), json!(true));
        assert_eq!(coerce_attribute_value("false"), json!(false));
        // Not the lowercase literals.
        assert_eq!(coerce_attribute_value("True"), json!("True"));
        assert_eq!(coerce_attribute_value("FALSE"), json!("FALSE"));
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_attribute_value("123"), json!(123));
        assert_eq!(coerce_attribute_value("3.14"), json!(3.14));
        assert_eq!(coerce_attribute_value("-42"), json!(-42));
        // Looks like a zip code, is a numeral.
        assert_eq!(coerce_attribute_value("90210"), json!(90_210));
        // Full 64-bit range survives.
        assert_eq!(
            coerce_attribute_value("18446744073709551615"),
            json!(18_446_744_073_709_551_615_u64)
        );
    }

    #[test]
    fn test_coerce_non_numerals_stay_strings() {
        assert_eq!(coerce_attribute_value("Infinity"), json!("Infinity"));
        assert_eq!(coerce_attribute_value("NaN"), json!("NaN"));
        assert_eq!(coerce_attribute_value(""), json!(""));
        assert_eq!(coerce_attribute_value("0x10"), json!("0x10"));
        assert_eq!(coerce_attribute_value("01"), json!("01"));
        assert_eq!(coerce_attribute_value("+1"), json!("+1"));
        assert_eq!(coerce_attribute_value(" 1"), json!(" 1"));
        assert_eq!(coerce_attribute_value("1 "), json!("1 "));
    }

    #[test]
    fn test_coerce_attributes_absent_never_empty() {
        assert_eq!(coerce_attributes(&BTreeMap::new()), None);

        let mut raw = BTreeMap::new();
        raw.insert("port".to_string(), "8080".to_string());
        let typed = coerce_attributes(&raw).unwrap();
        assert_eq!(typed.get("port"), Some(&json!(8080)));
    }

    #[test]
    fn test_coerce_attributes_array() {
        assert_eq!(coerce_attributes_array(&[]), None);

        let mut first = BTreeMap::new();
        first.insert("ok".to_string(), "true".to_string());
        let coerced = coerce_attributes_array(&[first, BTreeMap::new()]).unwrap();
        assert_eq!(coerced.len(), 2);
        assert_eq!(coerced[0].as_ref().unwrap().get("ok"), Some(&json!(true)));
        assert_eq!(coerced[1], None);
    }

    #[test]
    fn test_coerce_u64_array_drops_garbage() {
        let raw = vec![json!(1), json!("2"), json!("nope"), json!(-3), json!(4.5)];
        assert_eq!(
            coerce_u64_array(&raw),
            Some(vec!["1".to_string(), "2".to_string()])
        );
        assert_eq!(coerce_u64_array(&[json!("x")]), None);
        assert_eq!(coerce_u64_array(&[]), None);
    }

    #[test]
    fn test_coerced_to_canonical() {
        assert_eq!(
            coerced_to_canonical(&json!(true)),
            CanonicalValue::Bool(true)
        );
        assert_eq!(
            coerced_to_canonical(&json!(90_210)),
            CanonicalValue::Int("90210".to_string())
        );
        assert_eq!(
            coerced_to_canonical(&json!(3.14)),
            CanonicalValue::Double(3.14)
        );
        assert_eq!(
            coerced_to_canonical(&json!("Infinity")),
            CanonicalValue::String("Infinity".to_string())
        );
    }

    #[test]
    fn test_nanos_to_native_epoch() {
        assert_eq!(
            nanos_to_native("0").unwrap(),
            "1970-01-01 00:00:00.000000000"
        );
    }

    #[test]
    fn test_nanos_to_native_with_fraction() {
        assert_eq!(
            nanos_to_native("1704067200123456789").unwrap(),
            "2024-01-01 00:00:00.123456789"
        );
    }

    #[test]
    fn test_nanos_to_native_maximal_fraction() {
        assert_eq!(
            nanos_to_native("999999999").unwrap(),
            "1970-01-01 00:00:00.999999999"
        );
    }

    #[test]
    fn test_nanos_to_native_pre_epoch() {
        assert_eq!(
            nanos_to_native("-1").unwrap(),
            "1969-12-31 23:59:59.999999999"
        );
    }

    #[test]
    fn test_native_round_trip() {
        for nanos in [
            "0",
            "999999999",
            "1000000000",
            "1704067200123456789",
            "-1",
            "-1000000001",
            "9223372036854775807",
        ] {
            let native = nanos_to_native(nanos).unwrap();
            assert_eq!(native_to_nanos(&native).unwrap(), nanos, "via {native}");
        }
    }

    #[test]
    fn test_native_to_nanos_short_fraction_pads_right() {
        assert_eq!(
            native_to_nanos("1970-01-01 00:00:00.5").unwrap(),
            "500000000"
        );
    }

    #[test]
    fn test_malformed_rows_are_defects() {
        assert!(matches!(
            nanos_to_native("soon"),
            Err(EngineError::StorageRowParse(_))
        ));
        assert!(matches!(
            native_to_nanos("not a timestamp"),
            Err(EngineError::StorageRowParse(_))
        ));
        assert!(matches!(
            native_to_nanos("1970-01-01 00:00:00.12345678901"),
            Err(EngineError::StorageRowParse(_))
        ));
    }
}
