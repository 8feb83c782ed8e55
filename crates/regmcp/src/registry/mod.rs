//! Registry operations and backend selection.
//!
//! `ops` holds the single-call lookups, `search` the bounded tree searches. Both
//! work against any [`RegistryAccess`]: the live Win32 registry on Windows, or an
//! offline snapshot loaded from disk.

pub mod ops;
pub mod search;
#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fixtures;

use anyhow::Context;
use regkit::{RegistryAccess, SnapshotRegistry};
use std::path::Path;
use std::sync::Arc;

/// Pick the registry backend: the snapshot at `snapshot` if given, else the live registry.
pub fn open_backend(snapshot: Option<&Path>) -> anyhow::Result<Arc<dyn RegistryAccess>> {
    if let Some(path) = snapshot {
        let registry = SnapshotRegistry::load(path)
            .with_context(|| format!("Failed to load registry snapshot {}", path.display()))?;
        return Ok(Arc::new(registry));
    }
    live_backend()
}

#[cfg(windows)]
fn live_backend() -> anyhow::Result<Arc<dyn RegistryAccess>> {
    Ok(Arc::new(win32::Win32Registry::new()))
}

#[cfg(not(windows))]
fn live_backend() -> anyhow::Result<Arc<dyn RegistryAccess>> {
    anyhow::bail!(
        "The live registry is only available on Windows. Pass --snapshot <FILE> to serve a registry snapshot."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regkit::Hive;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_snapshot_backend() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(br#"{ "HKLM": { "keys": { "Software": {} } } }"#).unwrap();
        tmp.flush().unwrap();

        let backend = open_backend(Some(tmp.path())).unwrap();
        assert_eq!(backend.backend_name(), "snapshot");
        assert!(backend.open_key(Hive::LocalMachine, "Software").unwrap().is_some());
    }

    #[test]
    fn test_open_snapshot_backend_bad_file() {
        let err = open_backend(Some(Path::new("/nonexistent/regmcp.json"))).err().unwrap();
        assert!(err.to_string().contains("Failed to load registry snapshot"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_live_backend_requires_windows() {
        let err = open_backend(None).err().unwrap();
        assert!(err.to_string().contains("--snapshot"));
    }
}
