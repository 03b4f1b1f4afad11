//! Conversion between Firestore typed values and plain JSON.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). Documents
//! leave the storefront as plain JSON, with timestamps rendered the way the
//! SDK renders them (see [`Timestamp`]).

use serde_json::{Map, Number, Value, json};
use shopfront_core::Timestamp;

use crate::provider::ProviderError;

/// Convert a plain JSON value into a Firestore typed value.
///
/// Objects shaped like a serialized [`Timestamp`] are written back as
/// timestamps.
#[must_use]
pub fn to_firestore(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => n.as_i64().map_or_else(
            || json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
            |i| json!({ "integerValue": i.to_string() }),
        ),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore).collect::<Vec<_>>() }
        }),
        Value::Object(map) => Timestamp::from_json(value).map_or_else(
            || json!({ "mapValue": { "fields": fields_to_firestore(map) } }),
            |ts| json!({ "timestampValue": ts.to_rfc3339() }),
        ),
    }
}

/// Convert a JSON object into a Firestore `fields` map.
#[must_use]
pub fn fields_to_firestore(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), to_firestore(v)))
        .collect()
}

/// Convert a Firestore typed value into plain JSON.
///
/// # Errors
///
/// Returns `ProviderError::Unexpected` if the value is not a recognized
/// typed value.
pub fn from_firestore(value: &Value) -> Result<Value, ProviderError> {
    let object = value
        .as_object()
        .filter(|o| o.len() == 1)
        .ok_or_else(|| unexpected("typed value must be a single-key object", value))?;
    let Some((kind, inner)) = object.iter().next() else {
        return Err(unexpected("empty typed value", value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| unexpected("booleanValue", inner)),
        "integerValue" => parse_integer(inner),
        "doubleValue" => parse_double(inner),
        "timestampValue" => inner
            .as_str()
            .and_then(|s| Timestamp::parse_rfc3339(s).ok())
            .map(|ts| ts.to_json())
            .ok_or_else(|| unexpected("timestampValue", inner)),
        "stringValue" | "bytesValue" | "referenceValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_owned()))
            .ok_or_else(|| unexpected(kind, inner)),
        "geoPointValue" => Ok(json!({
            "_latitude": inner.get("latitude").and_then(Value::as_f64).unwrap_or_default(),
            "_longitude": inner.get("longitude").and_then(Value::as_f64).unwrap_or_default(),
        })),
        "arrayValue" => {
            // An empty array has no `values` key at all.
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(from_firestore)
                    .collect::<Result<Vec<_>, _>>()?,
                Some(other) => return Err(unexpected("arrayValue.values", other)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => fields_from_firestore(inner.get("fields")).map(Value::Object),
        other => Err(unexpected(&format!("unknown value type '{other}'"), value)),
    }
}

/// Convert an optional Firestore `fields` map into a JSON object.
///
/// # Errors
///
/// Returns `ProviderError::Unexpected` if any field is malformed.
pub fn fields_from_firestore(fields: Option<&Value>) -> Result<Map<String, Value>, ProviderError> {
    match fields {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| from_firestore(v).map(|v| (k.clone(), v)))
            .collect(),
        Some(other) => Err(unexpected("fields must be an object", other)),
    }
}

fn parse_integer(inner: &Value) -> Result<Value, ProviderError> {
    // int64 values travel as decimal strings.
    let parsed = match inner {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed
        .map(|i| Value::Number(i.into()))
        .ok_or_else(|| unexpected("integerValue", inner))
}

fn parse_double(inner: &Value) -> Result<Value, ProviderError> {
    let parsed = match inner {
        Value::Number(n) => n.as_f64(),
        // NaN and the infinities arrive as strings and have no JSON form.
        Value::String(_) => return Ok(Value::Null),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| unexpected("doubleValue", inner))
}

fn unexpected(what: &str, value: &Value) -> ProviderError {
    ProviderError::Unexpected(format!("{what}: {value}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_to_firestore() {
        assert_eq!(to_firestore(&json!(null)), json!({"nullValue": null}));
        assert_eq!(to_firestore(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(to_firestore(&json!(42)), json!({"integerValue": "42"}));
        assert_eq!(to_firestore(&json!(1.5)), json!({"doubleValue": 1.5}));
        assert_eq!(to_firestore(&json!("mug")), json!({"stringValue": "mug"}));
    }

    #[test]
    fn test_nested_to_firestore() {
        let value = json!({"tags": ["a"], "dims": {"w": 2}});
        assert_eq!(
            to_firestore(&value),
            json!({"mapValue": {"fields": {
                "tags": {"arrayValue": {"values": [{"stringValue": "a"}]}},
                "dims": {"mapValue": {"fields": {"w": {"integerValue": "2"}}}},
            }}})
        );
    }

    #[test]
    fn test_timestamp_to_firestore() {
        let ts = Timestamp::new(1_714_564_800, 0).unwrap();
        assert_eq!(
            to_firestore(&ts.to_json()),
            json!({"timestampValue": "2024-05-01T12:00:00Z"})
        );
    }

    #[test]
    fn test_product_document_from_firestore() {
        let fields = json!({
            "name": {"stringValue": "Ceramic Mug"},
            "price": {"doubleValue": 12.5},
            "stock": {"integerValue": "7"},
            "featured": {"booleanValue": false},
            "createdAt": {"timestampValue": "2024-05-01T12:00:00.250Z"},
            "images": {"arrayValue": {"values": [{"stringValue": "mug.png"}]}},
            "variants": {"arrayValue": {}},
            "dims": {"mapValue": {"fields": {"h": {"integerValue": "10"}}}},
            "discontinued": {"nullValue": null},
        });

        let map = fields_from_firestore(Some(&fields)).unwrap();
        assert_eq!(
            Value::Object(map),
            json!({
                "name": "Ceramic Mug",
                "price": 12.5,
                "stock": 7,
                "featured": false,
                "createdAt": {"_seconds": 1_714_564_800, "_nanoseconds": 250_000_000},
                "images": ["mug.png"],
                "variants": [],
                "dims": {"h": 10},
                "discontinued": null,
            })
        );
    }

    #[test]
    fn test_empty_map_value() {
        assert_eq!(from_firestore(&json!({"mapValue": {}})).unwrap(), json!({}));
        assert!(fields_from_firestore(None).unwrap().is_empty());
    }

    #[test]
    fn test_geo_point() {
        let value = json!({"geoPointValue": {"latitude": 51.5, "longitude": -0.1}});
        assert_eq!(
            from_firestore(&value).unwrap(),
            json!({"_latitude": 51.5, "_longitude": -0.1})
        );
    }

    #[test]
    fn test_non_finite_double_becomes_null() {
        assert_eq!(from_firestore(&json!({"doubleValue": "NaN"})).unwrap(), json!(null));
    }

    #[test]
    fn test_malformed_values() {
        assert!(from_firestore(&json!("bare")).is_err());
        assert!(from_firestore(&json!({"integerValue": "forty"})).is_err());
        assert!(from_firestore(&json!({"mysteryValue": 1})).is_err());
        assert!(from_firestore(&json!({"stringValue": "a", "integerValue": "1"})).is_err());
    }

    #[test]
    fn test_written_fields_read_back_unchanged() {
        let original = json!({
            "username": "alice",
            "createdAt": {"_seconds": 1_700_000_000, "_nanoseconds": 5},
        });
        let Value::Object(map) = &original else {
            unreachable!()
        };
        let encoded = Value::Object(fields_to_firestore(map));
        let decoded = fields_from_firestore(Some(&encoded)).unwrap();
        assert_eq!(Value::Object(decoded), original);
    }
}
