//! The seam between registry operations and whatever stores the registry.
//!
//! The live Windows backend and the in-memory snapshot both implement these
//! traits, so every operation can be exercised without touching the OS.

use crate::error::RegResult;
use crate::path::Hive;
use crate::value::RegValue;

/// A source of registry keys (the live OS registry or a snapshot).
pub trait RegistryAccess: Send + Sync {
    /// Open `sub_key` under `hive` for reading.
    ///
    /// Returns `Ok(None)` when the key does not exist. An empty `sub_key` opens
    /// the hive root. The returned handle is released when dropped.
    fn open_key(&self, hive: Hive, sub_key: &str) -> RegResult<Option<Box<dyn RegistryKey + '_>>>;

    /// Short human-readable backend name for logs.
    fn backend_name(&self) -> &str;
}

/// An open registry key.
pub trait RegistryKey {
    /// Names of the direct subkeys, in enumeration order.
    fn subkey_names(&self) -> RegResult<Vec<String>>;

    /// Names of the values held by this key. The default value has an empty name.
    fn value_names(&self) -> RegResult<Vec<String>>;

    /// Read one value; `Ok(None)` if it does not exist.
    fn read_value(&self, name: &str) -> RegResult<Option<RegValue>>;
}
