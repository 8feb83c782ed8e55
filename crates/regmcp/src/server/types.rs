//! Request/response types for MCP tools.

use regkit::{ErrorKind, RegError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::registry::search::DEFAULT_SEARCH_DEPTH;

/// Deserialize an optional depth that accepts JSON numbers or numeric strings ("3").
fn deserialize_optional_depth<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    let val: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match val {
        None => Ok(None),
        Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected integer depth")),
        Some(serde_json::Value::String(s)) => {
            s.trim().parse::<i64>().map(Some).map_err(de::Error::custom)
        }
        _ => Err(de::Error::custom("expected number or numeric string")),
    }
}

/// Request naming a single registry key.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyPathRequest {
    /// Full registry key path, e.g. "HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft". Short hive
    /// names (HKLM, HKCU, HKCR, HKU, HKCC) are accepted.
    pub key_path: String,
}

/// Request naming a value under a registry key.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValueRequest {
    /// Full registry key path, e.g. "HKEY_CURRENT_USER\\Software\\TestApp".
    pub key_path: String,
    /// Value name. Use an empty string for the key's default value.
    pub value_name: String,
}

/// Request for a bounded search under a root key.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Full path of the key to search under.
    pub root_key_path: String,
    /// Case-insensitive substring to look for. An empty pattern matches everything.
    pub search_pattern: String,
    /// Maximum depth below the root (default 2). Clamped to 1..=5 for key searches and
    /// 1..=3 for value searches. Accepts a number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_optional_depth")]
    pub max_depth: Option<i64>,
}

impl SearchRequest {
    pub fn depth(&self) -> i64 {
        self.max_depth.unwrap_or(DEFAULT_SEARCH_DEPTH)
    }
}

/// Body of an error tool result.
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
}

impl From<&RegError> for ErrorPayload {
    fn from(err: &RegError) -> Self {
        ErrorPayload {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_value_request() {
        let json = r#"{"keyPath": "HKCU\\Software\\TestApp", "valueName": "Name"}"#;
        let req: ValueRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key_path, r"HKCU\Software\TestApp");
        assert_eq!(req.value_name, "Name");
    }

    #[test]
    fn test_value_name_required() {
        let json = r#"{"keyPath": "HKCU\\Software"}"#;
        assert!(serde_json::from_str::<ValueRequest>(json).is_err());
    }

    #[test]
    fn test_search_depth_default() {
        let json = r#"{"rootKeyPath": "HKCU\\Software", "searchPattern": "app"}"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.max_depth, None);
        assert_eq!(req.depth(), 2);
    }

    #[test]
    fn test_search_depth_number() {
        let json = r#"{"rootKeyPath": "HKCU", "searchPattern": "", "maxDepth": 4}"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.depth(), 4);
    }

    #[test]
    fn test_search_depth_numeric_string() {
        let json = r#"{"rootKeyPath": "HKCU", "searchPattern": "", "maxDepth": " 3 "}"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.depth(), 3);
    }

    #[test]
    fn test_search_depth_null_and_negative() {
        let json = r#"{"rootKeyPath": "HKCU", "searchPattern": "", "maxDepth": null}"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.depth(), 2);

        let json = r#"{"rootKeyPath": "HKCU", "searchPattern": "", "maxDepth": -4}"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.depth(), -4);
    }

    #[test]
    fn test_search_depth_rejects_garbage() {
        let json = r#"{"rootKeyPath": "HKCU", "searchPattern": "", "maxDepth": "deep"}"#;
        assert!(serde_json::from_str::<SearchRequest>(json).is_err());

        let json = r#"{"rootKeyPath": "HKCU", "searchPattern": "", "maxDepth": [2]}"#;
        assert!(serde_json::from_str::<SearchRequest>(json).is_err());
    }

    #[test]
    fn test_error_payload_shape() {
        let err = RegError::KeyNotFound(r"HKCU\Software\Missing".into());
        let json = serde_json::to_value(ErrorPayload::from(&err)).unwrap();
        assert_eq!(json["kind"], "not_found");
        assert_eq!(json["error"], r"Registry key 'HKCU\Software\Missing' not found");
    }
}
