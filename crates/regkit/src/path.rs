//! Registry path resolution.
//!
//! A registry path is written as `<hive>\<segment>\<segment>…`, where the hive is
//! given either by its long name (`HKEY_LOCAL_MACHINE`) or its short alias
//! (`HKLM`), in any letter case. Resolution splits off the hive and keeps the
//! rest as a relative subkey path that backends open under the hive's root key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between registry path segments.
pub const SEPARATOR: char = '\\';

/// One of the predefined registry root keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hive {
    ClassesRoot,
    CurrentUser,
    LocalMachine,
    Users,
    CurrentConfig,
}

impl Hive {
    pub const ALL: [Hive; 5] = [
        Hive::ClassesRoot,
        Hive::CurrentUser,
        Hive::LocalMachine,
        Hive::Users,
        Hive::CurrentConfig,
    ];

    /// Look up a hive by long name or short alias, ignoring case.
    pub fn from_name(name: &str) -> Option<Hive> {
        match name.to_ascii_uppercase().as_str() {
            "HKEY_CLASSES_ROOT" | "HKCR" => Some(Hive::ClassesRoot),
            "HKEY_CURRENT_USER" | "HKCU" => Some(Hive::CurrentUser),
            "HKEY_LOCAL_MACHINE" | "HKLM" => Some(Hive::LocalMachine),
            "HKEY_USERS" | "HKU" => Some(Hive::Users),
            "HKEY_CURRENT_CONFIG" | "HKCC" => Some(Hive::CurrentConfig),
            _ => None,
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Hive::ClassesRoot => "HKEY_CLASSES_ROOT",
            Hive::CurrentUser => "HKEY_CURRENT_USER",
            Hive::LocalMachine => "HKEY_LOCAL_MACHINE",
            Hive::Users => "HKEY_USERS",
            Hive::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Hive::ClassesRoot => "HKCR",
            Hive::CurrentUser => "HKCU",
            Hive::LocalMachine => "HKLM",
            Hive::Users => "HKU",
            Hive::CurrentConfig => "HKCC",
        }
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

impl FromStr for Hive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hive::from_name(s).ok_or_else(|| format!("unknown registry hive '{}'", s))
    }
}

/// A resolved registry path: root hive plus subkey path relative to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryPath {
    pub hive: Hive,
    /// Remaining segments joined with [`SEPARATOR`]; empty for the hive root.
    pub sub_key: String,
}

impl RegistryPath {
    pub fn new(hive: Hive, sub_key: impl Into<String>) -> Self {
        RegistryPath {
            hive,
            sub_key: sub_key.into(),
        }
    }

    /// Resolve `full_path` into hive and subkey path.
    ///
    /// Returns `None` for empty or whitespace-only input and for an unrecognized
    /// first segment.
    pub fn parse(full_path: &str) -> Option<RegistryPath> {
        if full_path.trim().is_empty() {
            return None;
        }

        let (root, rest) = match full_path.split_once(SEPARATOR) {
            Some((root, rest)) => (root, rest),
            None => (full_path, ""),
        };

        let hive = Hive::from_name(root)?;
        Some(RegistryPath::new(hive, rest))
    }

    /// `<long hive name>\<sub_key>`, or the bare hive name for the hive root.
    pub fn full_path(&self) -> String {
        if self.sub_key.is_empty() {
            self.hive.long_name().to_string()
        } else {
            format!("{}{}{}", self.hive.long_name(), SEPARATOR, self.sub_key)
        }
    }

    /// Path of the direct child `name`.
    pub fn child(&self, name: &str) -> RegistryPath {
        RegistryPath::new(self.hive, join_sub_key(&self.sub_key, name))
    }
}

impl fmt::Display for RegistryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// Extend a relative subkey path by one segment.
pub fn join_sub_key(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}{}{}", parent, SEPARATOR, child)
    }
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
