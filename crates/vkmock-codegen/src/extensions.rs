//! Extension tables advertised by the generated backend.

use crate::ir::{Command, Extension, ExtensionScope, Feature};
use serde::Serialize;
use std::collections::BTreeSet;

/// Extensions a mock backend must never claim to implement.
pub const DEFAULT_DENY_LIST: &[&str] = &["VK_EXT_validation_cache"];

/// One advertised extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionEntry {
    pub name: String,
    pub version: u32,
}

/// Instance and device name→version tables, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionTables {
    pub instance: Vec<ExtensionEntry>,
    pub device: Vec<ExtensionEntry>,
    /// Extensions removed by the filter; their guards are dropped too.
    #[serde(skip)]
    excluded: BTreeSet<String>,
}

/// Decides which declared extensions the backend advertises.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    deny: BTreeSet<String>,
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_LIST.iter().copied())
    }
}

impl ExtensionFilter {
    pub fn new<I, S>(deny: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deny: deny.into_iter().map(Into::into).collect(),
        }
    }

    /// Add names to the deny-list.
    pub fn deny<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_denied(&self, name: &str) -> bool {
        self.deny.contains(name)
    }

    /// Partition implemented, allowed extensions by scope.
    pub fn build_tables(&self, extensions: &[Extension]) -> ExtensionTables {
        let mut tables = ExtensionTables::default();
        let mut seen = BTreeSet::new();

        for ext in extensions {
            if !ext.is_implemented() {
                tracing::debug!(extension = %ext.name, "skipping unimplemented extension");
                tables.excluded.insert(ext.name.clone());
                continue;
            }
            if self.is_denied(&ext.name) {
                tracing::debug!(extension = %ext.name, "skipping denied extension");
                tables.excluded.insert(ext.name.clone());
                continue;
            }
            if !seen.insert(ext.name.as_str()) {
                tracing::warn!(extension = %ext.name, "extension declared twice; keeping first");
                continue;
            }

            let entry = ExtensionEntry {
                name: ext.name.clone(),
                version: ext.version,
            };
            match ext.effective_scope() {
                ExtensionScope::Instance => tables.instance.push(entry),
                ExtensionScope::Device => tables.device.push(entry),
            }
        }

        tables
    }
}

impl ExtensionTables {
    pub fn contains(&self, name: &str) -> bool {
        self.instance.iter().chain(&self.device).any(|e| e.name == name)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    /// Guard a command is emitted under.
    ///
    /// Commands introduced by an excluded extension carry no guard.
    pub fn effective_guard<'a>(&self, command: &'a Command) -> Option<&'a str> {
        self.guard_for(command.feature.as_deref(), command.guard.as_deref())
    }

    /// Guard wrapped around a whole feature block.
    pub fn feature_guard<'a>(&self, feature: &'a Feature) -> Option<&'a str> {
        self.guard_for(Some(&feature.name), feature.guard.as_deref())
    }

    fn guard_for<'a>(&self, owner: Option<&str>, guard: Option<&'a str>) -> Option<&'a str> {
        match owner {
            Some(owner) if self.is_excluded(owner) => None,
            _ => guard,
        }
    }
}
