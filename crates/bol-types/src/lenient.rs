//! Lenient deserializers for language-model output
//!
//! Extraction models are asked for a strict schema but routinely return
//! `"100"` where a number is expected, `1000` where a string is expected,
//! `null` for absent values and `""` for unknown ones. These helpers are
//! wired in with `#[serde(default, deserialize_with = "...")]` so that a
//! single odd value does not reject the whole document.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a scalar JSON value as text.
///
/// Arrays of scalars are joined with `", "`; objects are rejected.
fn value_to_text(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(items) => {
            let parts = items
                .into_iter()
                .map(value_to_text)
                .collect::<Result<Vec<_>, _>>()?;
            let joined = parts.into_iter().flatten().collect::<Vec<_>>().join(", ");
            Ok(Some(joined))
        }
        Value::Object(_) => Err("expected text, found an object".to_string()),
    }
}

/// Required text field: `null` becomes the empty string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_text(value)
        .map(Option::unwrap_or_default)
        .map_err(D::Error::custom)
}

/// Optional text field: `null`, `""` and whitespace-only text become `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = value_to_text(value).map_err(D::Error::custom)?;
    Ok(text.filter(|s| !s.trim().is_empty()))
}

/// Parse the leading integer out of free text such as `"120 cartons"`.
fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse::<u64>().ok().map(saturate)
}

fn saturate(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(saturate)
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u32)),
        Value::String(s) => leading_integer(s),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Count field: numbers, numeric strings and `null` (as zero).
pub fn u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u32(&value).unwrap_or(0))
}

/// Optional count field.
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u32(&value))
}

/// Flag field: booleans, `"yes"`/`"true"`/`"y"`, non-zero numbers.
pub fn bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    })
}

/// Sequence field: `null` becomes an empty vector.
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional enum-like field parsed through `FromStr`; unrecognised text is `None`.
pub fn opt_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let value = Value::deserialize(deserializer)?;
    let text = value_to_text(value).map_err(D::Error::custom)?;
    Ok(text.and_then(|s| s.trim().parse().ok()))
}

/// Optional nested object: `null`, `""` and non-object scalars become `None`.
pub fn opt_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string")]
        text: String,
        #[serde(default, deserialize_with = "opt_string")]
        maybe: Option<String>,
        #[serde(default, deserialize_with = "u32")]
        count: u32,
        #[serde(default, deserialize_with = "bool")]
        flag: bool,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numbers_become_text() {
        let p = probe(r#"{"text": 1000, "maybe": 12.5}"#);
        assert_eq!(p.text, "1000");
        assert_eq!(p.maybe.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_blank_optional_text_is_none() {
        let p = probe(r#"{"maybe": "   "}"#);
        assert!(p.maybe.is_none());
        let p = probe(r#"{"maybe": null, "text": null}"#);
        assert!(p.maybe.is_none());
        assert_eq!(p.text, "");
    }

    #[test]
    fn test_text_arrays_are_joined() {
        let p = probe(r#"{"text": ["FRAGILE", "KEEP DRY"]}"#);
        assert_eq!(p.text, "FRAGILE, KEEP DRY");
    }

    #[test]
    fn test_counts_accept_strings() {
        assert_eq!(probe(r#"{"count": "120 cartons"}"#).count, 120);
        assert_eq!(probe(r#"{"count": "1,250"}"#).count, 1250);
        assert_eq!(probe(r#"{"count": 7.6}"#).count, 8);
        assert_eq!(probe(r#"{"count": null}"#).count, 0);
        assert_eq!(probe(r#"{"count": "none"}"#).count, 0);
    }

    #[test]
    fn test_flags() {
        assert!(probe(r#"{"flag": "Yes"}"#).flag);
        assert!(probe(r#"{"flag": 1}"#).flag);
        assert!(!probe(r#"{"flag": "no"}"#).flag);
        assert!(!probe(r#"{}"#).flag);
    }

    proptest::proptest! {
        #[test]
        fn prop_any_string_survives_as_text(s in ".{0,40}") {
            let json = serde_json::json!({ "count": s, "text": s }).to_string();
            let p: Probe = serde_json::from_str(&json).unwrap();
            proptest::prop_assert_eq!(p.text, s);
        }
    }

    #[test]
    fn test_objects_are_not_text() {
        let result: Result<Probe, _> = serde_json::from_str(r#"{"text": {"a": 1}}"#);
        assert!(result.is_err());
    }
}
