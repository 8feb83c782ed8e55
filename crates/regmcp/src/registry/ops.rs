//! Single-call registry operations: value read, enumeration, and type query.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regkit::{hex_display, RegError, RegResult, RegValue, RegistryAccess, RegistryKey, RegistryPath, ValueKind};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Rendered in place of a value that was listed by its key but gone when read.
pub const VANISHED_VALUE: &str = "(null)";

/// Payload of a value read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueReport {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: ReportedData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportedData {
    Text(String),
    Lines(Vec<String>),
}

impl ValueReport {
    pub fn from_value(value: &RegValue) -> Self {
        if let Some(data) = value.raw_bytes() {
            return ValueReport {
                kind: "binary".to_string(),
                value: ReportedData::Text(BASE64.encode(data)),
                display_value: Some(hex_display(data)),
            };
        }
        match value {
            RegValue::MultiString(items) => ValueReport {
                kind: "multi-string".to_string(),
                value: ReportedData::Lines(items.clone()),
                display_value: None,
            },
            other => ValueReport {
                kind: other.kind().name().to_string(),
                value: ReportedData::Text(other.render_text()),
                display_value: None,
            },
        }
    }
}

/// Value name to rendered data, kept in the order names were first inserted.
///
/// Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap {
    entries: Vec<(String, String)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name`, replacing the data in place if it is already present.
    pub fn insert(&mut self, name: String, data: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = data,
            None => self.entries.push((name, data)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, data) in self.iter() {
            map.serialize_entry(name, data)?;
        }
        map.end()
    }
}

#[cfg(test)]
impl ValueMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(existing, _)| *existing == name).map(|(_, data)| data)
    }
}

/// Resolve `key_path` and open it, failing if the key does not exist.
pub(crate) fn open_path<'r>(
    registry: &'r dyn RegistryAccess,
    key_path: &str,
) -> RegResult<(RegistryPath, Box<dyn RegistryKey + 'r>)> {
    let path = RegistryPath::parse(key_path).ok_or_else(|| RegError::InvalidPath(key_path.to_string()))?;
    let key = registry
        .open_key(path.hive, &path.sub_key)?
        .ok_or_else(|| RegError::KeyNotFound(key_path.to_string()))?;
    Ok((path, key))
}

fn read_existing(key: &dyn RegistryKey, key_path: &str, value_name: &str) -> RegResult<RegValue> {
    key.read_value(value_name)?
        .ok_or_else(|| RegError::value_not_found(key_path, value_name))
}

/// Read one value. An empty `value_name` reads the key's default value.
pub fn get_value(registry: &dyn RegistryAccess, key_path: &str, value_name: &str) -> RegResult<ValueReport> {
    let (_, key) = open_path(registry, key_path)?;
    let value = read_existing(key.as_ref(), key_path, value_name)?;
    Ok(ValueReport::from_value(&value))
}

pub fn get_sub_keys(registry: &dyn RegistryAccess, key_path: &str) -> RegResult<Vec<String>> {
    let (_, key) = open_path(registry, key_path)?;
    key.subkey_names()
}

/// All values of a key, rendered as text.
pub fn get_values(registry: &dyn RegistryAccess, key_path: &str) -> RegResult<ValueMap> {
    let (_, key) = open_path(registry, key_path)?;
    let mut values = ValueMap::new();
    for name in key.value_names()? {
        let data = match key.read_value(&name)? {
            Some(value) => value.render_text(),
            None => VANISHED_VALUE.to_string(),
        };
        values.insert(name, data);
    }
    Ok(values)
}

pub fn get_value_type(registry: &dyn RegistryAccess, key_path: &str, value_name: &str) -> RegResult<ValueKind> {
    let (_, key) = open_path(registry, key_path)?;
    Ok(read_existing(key.as_ref(), key_path, value_name)?.kind())
}
