//! In-memory registry snapshot.
//!
//! A snapshot is a tree of keys and typed values that can be built in code or
//! loaded from a JSON file keyed by hive name:
//!
//! ```json
//! {
//!   "HKCU": {
//!     "keys": {
//!       "Software": {
//!         "keys": {
//!           "TestApp": {
//!             "values": { "Name": { "type": "String", "data": "Widget" } },
//!             "keys": { "Settings": {} }
//!           }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! A key with `"denied": true` refuses to open, which is how permission failures
//! are modelled.

use crate::access::{RegistryAccess, RegistryKey};
use crate::error::{RegError, RegResult};
use crate::path::{Hive, RegistryPath, SEPARATOR};
use crate::value::RegValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// One key in a snapshot tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotKey {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, SnapshotKey>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, RegValue>,
    /// Opening this key fails with an access-denied error.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub denied: bool,
}

impl SnapshotKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, name: impl Into<String>, key: SnapshotKey) -> Self {
        self.keys.insert(name.into(), key);
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: RegValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn deny(mut self) -> Self {
        self.denied = true;
        self
    }

    fn child(&self, name: &str) -> Option<&SnapshotKey> {
        self.keys
            .iter()
            .find(|(k, _)| k.to_lowercase() == name.to_lowercase())
            .map(|(_, v)| v)
    }

    fn value(&self, name: &str) -> Option<&RegValue> {
        self.values
            .iter()
            .find(|(k, _)| k.to_lowercase() == name.to_lowercase())
            .map(|(_, v)| v)
    }
}

/// A registry backed by in-memory snapshot trees, one per hive.
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    hives: HashMap<Hive, SnapshotKey>,
    open_handles: AtomicUsize,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hive(mut self, hive: Hive, root: SnapshotKey) -> Self {
        self.hives.insert(hive, root);
        self
    }

    /// Parse a snapshot document keyed by hive name (long or short form).
    pub fn from_json_str(json: &str) -> RegResult<Self> {
        let raw: BTreeMap<String, SnapshotKey> =
            serde_json::from_str(json).map_err(|e| RegError::Snapshot(e.to_string()))?;

        let mut registry = SnapshotRegistry::new();
        for (name, root) in raw {
            let hive = Hive::from_name(&name)
                .ok_or_else(|| RegError::Snapshot(format!("unknown hive '{}'", name)))?;
            registry.hives.insert(hive, root);
        }
        Ok(registry)
    }

    /// Load a snapshot document from disk.
    pub fn load(path: impl AsRef<Path>) -> RegResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RegError::Snapshot(format!("{}: {}", path.display(), e)))?;
        let registry = Self::from_json_str(&text)?;
        debug!("snapshot: loaded {} hives from {}", registry.hives.len(), path.display());
        Ok(registry)
    }

    /// Number of keys currently open through this registry.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    fn find(&self, hive: Hive, sub_key: &str) -> Option<&SnapshotKey> {
        let mut current = self.hives.get(&hive)?;
        for component in sub_key.split(SEPARATOR) {
            if component.is_empty() {
                continue;
            }
            current = current.child(component)?;
        }
        Some(current)
    }
}

impl RegistryAccess for SnapshotRegistry {
    fn open_key(&self, hive: Hive, sub_key: &str) -> RegResult<Option<Box<dyn RegistryKey + '_>>> {
        let Some(node) = self.find(hive, sub_key) else {
            return Ok(None);
        };
        if node.denied {
            return Err(RegError::AccessDenied(
                RegistryPath::new(hive, sub_key).full_path(),
            ));
        }

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Box::new(SnapshotHandle {
            node,
            open_handles: &self.open_handles,
        })))
    }

    fn backend_name(&self) -> &str {
        "snapshot"
    }
}

/// An open snapshot key; decrements the open-handle count on drop.
struct SnapshotHandle<'a> {
    node: &'a SnapshotKey,
    open_handles: &'a AtomicUsize,
}

impl RegistryKey for SnapshotHandle<'_> {
    fn subkey_names(&self) -> RegResult<Vec<String>> {
        Ok(self.node.keys.keys().cloned().collect())
    }

    fn value_names(&self) -> RegResult<Vec<String>> {
        Ok(self.node.values.keys().cloned().collect())
    }

    fn read_value(&self, name: &str) -> RegResult<Option<RegValue>> {
        Ok(self.node.value(name).cloned())
    }
}

impl Drop for SnapshotHandle<'_> {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_registry() -> SnapshotRegistry {
        let test_app = SnapshotKey::new()
            .with_value("Name", RegValue::String("Widget".into()))
            .with_key("Settings", SnapshotKey::new());
        let software = SnapshotKey::new()
            .with_key("TestApp", test_app)
            .with_key("Locked", SnapshotKey::new().deny());
        SnapshotRegistry::new().with_hive(Hive::CurrentUser, SnapshotKey::new().with_key("Software", software))
    }

    #[test]
    fn test_open_case_insensitive() {
        let reg = test_registry();
        let key = reg.open_key(Hive::CurrentUser, r"software\TESTAPP").unwrap().unwrap();
        assert_eq!(key.subkey_names().unwrap(), vec!["Settings"]);
        assert_eq!(key.value_names().unwrap(), vec!["Name"]);
        assert_eq!(key.read_value("name").unwrap(), Some(RegValue::String("Widget".into())));
        assert_eq!(key.read_value("Missing").unwrap(), None);
    }

    #[test]
    fn test_open_hive_root_and_missing() {
        let reg = test_registry();
        assert!(reg.open_key(Hive::CurrentUser, "").unwrap().is_some());
        assert!(reg.open_key(Hive::CurrentUser, r"Software\Nope").unwrap().is_none());
        assert!(reg.open_key(Hive::LocalMachine, "").unwrap().is_none());
    }

    #[test]
    fn test_denied_key() {
        let reg = test_registry();
        let err = reg.open_key(Hive::CurrentUser, r"Software\Locked").err().unwrap();
        assert!(matches!(err, RegError::AccessDenied(ref p) if p == r"HKEY_CURRENT_USER\Software\Locked"));
        assert_eq!(reg.open_handles(), 0);
    }

    #[test]
    fn test_handles_released_on_drop() {
        let reg = test_registry();
        {
            let _a = reg.open_key(Hive::CurrentUser, "Software").unwrap().unwrap();
            let _b = reg.open_key(Hive::CurrentUser, r"Software\TestApp").unwrap().unwrap();
            assert_eq!(reg.open_handles(), 2);
        }
        assert_eq!(reg.open_handles(), 0);
    }

    #[test]
    fn test_from_json_with_aliases() {
        let json = r#"{
            "HKCU": { "keys": { "Software": { "keys": { "TestApp": {
                "values": { "Name": { "type": "String", "data": "Widget" } }
            } } } } },
            "hkey_local_machine": { "keys": { "SAM": { "denied": true } } }
        }"#;
        let reg = SnapshotRegistry::from_json_str(json).unwrap();
        let key = reg.open_key(Hive::CurrentUser, r"Software\TestApp").unwrap().unwrap();
        assert_eq!(key.read_value("Name").unwrap(), Some(RegValue::String("Widget".into())));
        drop(key);
        assert!(reg.open_key(Hive::LocalMachine, "SAM").is_err());
    }

    #[test]
    fn test_unknown_hive_rejected() {
        let err = SnapshotRegistry::from_json_str(r#"{ "HKEY_DYN_DATA": {} }"#).err().unwrap();
        assert!(err.to_string().contains("HKEY_DYN_DATA"));
    }

    #[test]
    fn test_load_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(br#"{ "HKCC": { "keys": { "System": {} } } }"#).unwrap();
        tmp.flush().unwrap();
        let reg = SnapshotRegistry::load(tmp.path()).unwrap();
        assert!(reg.open_key(Hive::CurrentConfig, "System").unwrap().is_some());
        assert_eq!(reg.backend_name(), "snapshot");
    }

    #[test]
    fn test_load_missing_file() {
        let err = SnapshotRegistry::load("/nonexistent/regmcp-snapshot.json").err().unwrap();
        assert!(matches!(err, RegError::Snapshot(_)));
    }
}
