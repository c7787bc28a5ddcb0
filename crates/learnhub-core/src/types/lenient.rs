//! Deserializers that accept both native JSON values and the string
//! encodings produced by multipart form submissions.
//!
//! A multipart form can only carry text, so clients send `"1"` for a
//! boolean, `"5"` for a number, and `"[\"...\"]"` for a list. The same
//! payload types are also posted as plain JSON bodies. Every helper here
//! first reads a [`serde_json::Value`] and then interprets it.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Optional boolean: `true`, `1`, `"1"`, `"true"`, `"on"`, `"yes"` and their negatives.
pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(D::Error::custom(format!("invalid boolean: {n}"))),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "on" | "yes" => Ok(Some(true)),
            "0" | "false" | "off" | "no" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
        },
        other => Err(D::Error::custom(format!("invalid boolean: {other}"))),
    }
}

/// Optional integer given as a number or a numeric string.
pub fn opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid integer: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer: {s}"))),
        other => Err(D::Error::custom(format!("invalid integer: {other}"))),
    }
}

/// Optional string where an empty or whitespace-only value counts as absent.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("invalid string: {other}"))),
    }
}

/// Optional string that keeps blank values, so a field sent empty can be
/// told apart from an absent one. Only `null` counts as absent.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("invalid string: {other}"))),
    }
}

/// Clearable UUID. Use together with `#[serde(default)]`: an absent key
/// stays `None`, `null` or `""` becomes `Some(None)` and a UUID becomes
/// `Some(Some(id))`.
pub fn patch_uuid<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(None)),
        Value::String(s) if s.trim().is_empty() => Ok(Some(None)),
        Value::String(s) => Uuid::parse_str(s.trim())
            .map(|id| Some(Some(id)))
            .map_err(|_| D::Error::custom(format!("invalid UUID: {s}"))),
        other => Err(D::Error::custom(format!("invalid UUID: {other}"))),
    }
}

/// Optional UUID given as a string; an empty string counts as absent.
pub fn opt_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid UUID: {s}"))),
        other => Err(D::Error::custom(format!("invalid UUID: {other}"))),
    }
}

/// List of UUIDs whose presence matters.
///
/// Use together with `#[serde(default)]`: an absent key stays `None`,
/// while a present key (even `null` or `""`) becomes `Some`, possibly
/// empty. Accepts a JSON array, a JSON-encoded array inside a string, or
/// a comma-separated string.
pub fn uuid_list<'de, D>(deserializer: D) -> Result<Option<Vec<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_uuid_list(value).map(Some).map_err(D::Error::custom)
}

fn parse_uuid_list(value: Value) -> Result<Vec<Uuid>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => {
                    Uuid::parse_str(s.trim()).map_err(|_| format!("invalid UUID: {s}"))
                }
                other => Err(format!("invalid UUID: {other}")),
            })
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(Vec::new())
            } else if trimmed.starts_with('[') {
                let inner: Value =
                    serde_json::from_str(trimmed).map_err(|e| format!("invalid list: {e}"))?;
                parse_uuid_list(inner)
            } else {
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| Uuid::parse_str(part).map_err(|_| format!("invalid UUID: {part}")))
                    .collect()
            }
        }
        other => Err(format!("invalid list: {other}")),
    }
}

/// A structured value that may arrive natively or JSON-encoded inside a string.
pub fn embedded<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => serde_json::from_str(&s).map(Some).map_err(D::Error::custom),
        other => serde_json::from_value(other).map(Some).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "opt_bool")]
        active: Option<bool>,
        #[serde(default, deserialize_with = "opt_i32")]
        n_days: Option<i32>,
        #[serde(default, deserialize_with = "opt_string")]
        dest: Option<String>,
        #[serde(default, deserialize_with = "uuid_list")]
        ids: Option<Vec<Uuid>>,
        #[serde(default, deserialize_with = "embedded")]
        tags: Option<Vec<String>>,
    }

    #[test]
    fn test_native_json() {
        let id = Uuid::new_v4();
        let probe: Probe = serde_json::from_value(json!({
            "active": true,
            "n_days": 3,
            "dest": "https://hooks.example.com",
            "ids": [id.to_string()],
            "tags": ["a", "b"],
        }))
        .unwrap();
        assert_eq!(probe.active, Some(true));
        assert_eq!(probe.n_days, Some(3));
        assert_eq!(probe.ids, Some(vec![id]));
        assert_eq!(probe.tags, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_multipart_strings() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let probe: Probe = serde_json::from_value(json!({
            "active": "0",
            "n_days": "12",
            "dest": "",
            "ids": format!("[\"{a}\", \"{b}\"]"),
            "tags": "[\"x\"]",
        }))
        .unwrap();
        assert_eq!(probe.active, Some(false));
        assert_eq!(probe.n_days, Some(12));
        assert_eq!(probe.dest, None);
        assert_eq!(probe.ids, Some(vec![a, b]));
        assert_eq!(probe.tags, Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_uuid_list_presence() {
        let absent: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.ids, None);

        let empty: Probe = serde_json::from_value(json!({ "ids": [] })).unwrap();
        assert_eq!(empty.ids, Some(vec![]));

        let null: Probe = serde_json::from_value(json!({ "ids": null })).unwrap();
        assert_eq!(null.ids, Some(vec![]));
    }

    #[test]
    fn test_comma_separated_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let probe: Probe = serde_json::from_value(json!({ "ids": format!("{a}, {b}") })).unwrap();
        assert_eq!(probe.ids, Some(vec![a, b]));
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "opt_text")]
        title: Option<String>,
        #[serde(default, deserialize_with = "patch_uuid")]
        email_id: Option<Option<Uuid>>,
    }

    #[test]
    fn test_blank_is_kept_apart_from_absent() {
        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.title, None);
        assert_eq!(absent.email_id, None);

        let blank: Patch = serde_json::from_value(json!({ "title": "", "email_id": "" })).unwrap();
        assert_eq!(blank.title.as_deref(), Some(""));
        assert_eq!(blank.email_id, Some(None));

        let id = Uuid::new_v4();
        let set: Patch = serde_json::from_value(json!({ "title": null, "email_id": id.to_string() })).unwrap();
        assert_eq!(set.title, None);
        assert_eq!(set.email_id, Some(Some(id)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_value::<Probe>(json!({ "n_days": "abc" })).is_err());
        assert!(serde_json::from_value::<Probe>(json!({ "active": "maybe" })).is_err());
        assert!(serde_json::from_value::<Probe>(json!({ "ids": ["nope"] })).is_err());
    }
}
