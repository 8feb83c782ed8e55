//! Shared registry fixtures for tests.

use regkit::{Hive, RegResult, RegValue, RegistryAccess, RegistryKey, SnapshotKey, SnapshotRegistry};

/// `HKEY_CURRENT_USER\Software\TestApp` with value `Name="Widget"` and subkey
/// `Settings`, next to an inaccessible sibling `Locked` and an accessible
/// `Vendor\TestAppHelper` branch.
pub(crate) fn test_app_registry() -> SnapshotRegistry {
    let settings = SnapshotKey::new()
        .with_value("Theme", RegValue::String("dark".into()))
        .with_value("Retries", RegValue::DWord(3));
    let test_app = SnapshotKey::new()
        .with_value("Name", RegValue::String("Widget".into()))
        .with_key("Settings", settings);
    let locked = SnapshotKey::new()
        .with_key("TestAppSecret", SnapshotKey::new())
        .deny();
    let vendor = SnapshotKey::new().with_key(
        "TestAppHelper",
        SnapshotKey::new().with_value("Owner", RegValue::String("TestApp team".into())),
    );
    let software = SnapshotKey::new()
        .with_key("TestApp", test_app)
        .with_key("Locked", locked)
        .with_key("Vendor", vendor);

    SnapshotRegistry::new().with_hive(
        Hive::CurrentUser,
        SnapshotKey::new().with_key("Software", software),
    )
}

/// A chain `Level1\Level2\…\Level{depth}` under `HKEY_LOCAL_MACHINE\Deep`, every
/// key carrying a `Marker` value.
pub(crate) fn deep_registry(depth: usize) -> SnapshotRegistry {
    let mut node = SnapshotKey::new().with_value("Marker", RegValue::String("deepest".into()));
    for level in (1..=depth).rev() {
        node = SnapshotKey::new()
            .with_value("Marker", RegValue::String(format!("level {}", level - 1)))
            .with_key(format!("Level{}", level), node);
    }
    SnapshotRegistry::new().with_hive(
        Hive::LocalMachine,
        SnapshotKey::new().with_key("Deep", node),
    )
}

/// `HKEY_CURRENT_USER\Wide` with `count` children `Match000…`, each holding a
/// `Match` value and `count` grandchildren of its own.
pub(crate) fn wide_registry(count: usize) -> SnapshotRegistry {
    let mut wide = SnapshotKey::new();
    for i in 0..count {
        let mut child = SnapshotKey::new().with_value("Match", RegValue::DWord(i as u32));
        for j in 0..count {
            child = child.with_key(format!("Match{:03}", j), SnapshotKey::new());
        }
        wide = wide.with_key(format!("Match{:03}", i), child);
    }
    SnapshotRegistry::new().with_hive(Hive::CurrentUser, SnapshotKey::new().with_key("Wide", wide))
}

/// Wraps a registry so every key lists a subkey and a value named `Ghost` that
/// have disappeared by the time they are opened or read.
pub(crate) struct VanishingRegistry(pub SnapshotRegistry);

impl RegistryAccess for VanishingRegistry {
    fn open_key(&self, hive: Hive, sub_key: &str) -> RegResult<Option<Box<dyn RegistryKey + '_>>> {
        Ok(self
            .0
            .open_key(hive, sub_key)?
            .map(|inner| Box::new(VanishingKey(inner)) as Box<dyn RegistryKey + '_>))
    }

    fn backend_name(&self) -> &str {
        "vanishing"
    }
}

struct VanishingKey<'a>(Box<dyn RegistryKey + 'a>);

impl RegistryKey for VanishingKey<'_> {
    fn subkey_names(&self) -> RegResult<Vec<String>> {
        let mut names = self.0.subkey_names()?;
        names.push("Ghost".into());
        Ok(names)
    }

    fn value_names(&self) -> RegResult<Vec<String>> {
        let mut names = self.0.value_names()?;
        names.push("Ghost".into());
        Ok(names)
    }

    fn read_value(&self, name: &str) -> RegResult<Option<RegValue>> {
        self.0.read_value(name)
    }
}
