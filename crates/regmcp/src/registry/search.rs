//! Depth-bounded, result-capped search over a registry subtree.
//!
//! The walk is pre-order from the search root (depth 0) and visits a node only
//! while its depth is within the clamped maximum. Failures below the root never
//! abort the call: the affected branch is logged and skipped. Once more than
//! [`MAX_RESULTS`] matches are held the walk unwinds, so a call returns at most
//! `MAX_RESULTS + 1` entries.

use regkit::{contains_ignore_case, RegResult, RegistryAccess, RegistryKey, RegistryPath, SEPARATOR};
use tracing::{debug, warn};

use super::ops::{open_path, ValueMap};

pub const MAX_RESULTS: usize = 100;
pub const DEFAULT_SEARCH_DEPTH: i64 = 2;
pub const KEY_SEARCH_MAX_DEPTH: u32 = 5;
pub const VALUE_SEARCH_MAX_DEPTH: u32 = 3;

/// Clamp a requested search depth into `[1, upper]`.
pub fn clamp_depth(requested: i64, upper: u32) -> u32 {
    requested.clamp(1, i64::from(upper)) as u32
}

/// Full paths of keys under `root_path` (the root included) whose full path
/// contains `pattern`, case-insensitively.
pub fn find_keys(
    registry: &dyn RegistryAccess,
    root_path: &str,
    pattern: &str,
    max_depth: i64,
) -> RegResult<Vec<String>> {
    let mut matches = KeyMatches(Vec::new());
    TreeSearch::new(registry, pattern, clamp_depth(max_depth, KEY_SEARCH_MAX_DEPTH))
        .run(root_path, &mut matches)?;
    Ok(matches.0)
}

/// Values under `root_path` whose name or rendered data contains `pattern`,
/// keyed by `<full key path>\<value name>`.
pub fn find_values(
    registry: &dyn RegistryAccess,
    root_path: &str,
    pattern: &str,
    max_depth: i64,
) -> RegResult<ValueMap> {
    let mut matches = ValueMatches(ValueMap::new());
    TreeSearch::new(registry, pattern, clamp_depth(max_depth, VALUE_SEARCH_MAX_DEPTH))
        .run(root_path, &mut matches)?;
    Ok(matches.0)
}

/// Accumulates the matches of one search mode.
trait Collector {
    fn len(&self) -> usize;

    /// Record the matches found at a single key.
    fn collect(&mut self, key: &dyn RegistryKey, path: &RegistryPath, pattern: &str) -> RegResult<()>;
}

struct KeyMatches(Vec<String>);

impl Collector for KeyMatches {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn collect(&mut self, _key: &dyn RegistryKey, path: &RegistryPath, pattern: &str) -> RegResult<()> {
        let full_path = path.full_path();
        if contains_ignore_case(&full_path, pattern) {
            self.0.push(full_path);
        }
        Ok(())
    }
}

struct ValueMatches(ValueMap);

impl Collector for ValueMatches {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn collect(&mut self, key: &dyn RegistryKey, path: &RegistryPath, pattern: &str) -> RegResult<()> {
        let key_path = path.full_path();
        for name in key.value_names()? {
            // Skips the unnamed value only when the pattern is empty.
            if name.is_empty() && contains_ignore_case(&name, pattern) {
                continue;
            }

            let data = key
                .read_value(&name)?
                .map(|value| value.render_text())
                .unwrap_or_default();

            if contains_ignore_case(&name, pattern) || contains_ignore_case(&data, pattern) {
                self.0.insert(format!("{}{}{}", key_path, SEPARATOR, name), data);
                if self.0.len() > MAX_RESULTS {
                    break;
                }
            }
        }
        Ok(())
    }
}

struct TreeSearch<'r> {
    registry: &'r dyn RegistryAccess,
    pattern: &'r str,
    max_depth: u32,
}

impl<'r> TreeSearch<'r> {
    fn new(registry: &'r dyn RegistryAccess, pattern: &'r str, max_depth: u32) -> Self {
        TreeSearch {
            registry,
            pattern,
            max_depth,
        }
    }

    /// Open the search root and walk it. Only root resolution failures are returned.
    fn run<C: Collector>(&self, root_path: &str, out: &mut C) -> RegResult<()> {
        let (path, root) = open_path(self.registry, root_path)?;
        debug!(
            "search: root={} pattern='{}' max_depth={} backend={}",
            path,
            self.pattern,
            self.max_depth,
            self.registry.backend_name()
        );
        self.walk(root.as_ref(), &path, 0, out);
        Ok(())
    }

    fn walk<C: Collector>(&self, key: &dyn RegistryKey, path: &RegistryPath, depth: u32, out: &mut C) {
        if let Err(e) = self.try_walk(key, path, depth, out) {
            warn!("Error accessing registry path {}: {}", path, e);
        }
    }

    fn try_walk<C: Collector>(
        &self,
        key: &dyn RegistryKey,
        path: &RegistryPath,
        depth: u32,
        out: &mut C,
    ) -> RegResult<()> {
        if out.len() > MAX_RESULTS {
            return Ok(());
        }

        out.collect(key, path, self.pattern)?;
        if out.len() > MAX_RESULTS || depth >= self.max_depth {
            return Ok(());
        }

        for name in key.subkey_names()? {
            let child_path = path.child(&name);
            if let Some(child) = self.open_child(&child_path) {
                self.walk(child.as_ref(), &child_path, depth + 1, out);
            }
            if out.len() > MAX_RESULTS {
                break;
            }
        }
        Ok(())
    }

    fn open_child(&self, path: &RegistryPath) -> Option<Box<dyn RegistryKey + 'r>> {
        match self.registry.open_key(path.hive, &path.sub_key) {
            Ok(Some(key)) => Some(key),
            Ok(None) => {
                debug!("Registry key vanished during search: {}", path);
                None
            }
            Err(e) => {
                warn!("Error accessing registry path {}: {}", path, e);
                None
            }
        }
    }
}
