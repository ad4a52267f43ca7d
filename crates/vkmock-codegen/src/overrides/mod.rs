//! Curated replacements for synthesized command bodies.
//!
//! Some commands cannot be inferred from their signature: property and
//! feature queries, loader negotiation, proc-address resolution, memory
//! mapping. Their bodies are hand-written data in [`builtin`], keyed by the
//! exact command name. Lookups happen before classification, so an entry
//! always wins over synthesis.

mod builtin;

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Replacement for a command body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideEntry {
    /// Literal body text, emitted between the braces of the definition.
    Body(Cow<'static, str>),
    /// No body yet; only a declaration placeholder is emitted.
    DeclareOnly,
}

/// Command name → override, exact-match only.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: BTreeMap<String, OverrideEntry>,
}

/// Overrides whose bodies read the generated extension tables.
pub const EXTENSION_TABLE_READERS: &[&str] = &[
    "vkEnumerateInstanceExtensionProperties",
    "vkEnumerateDeviceExtensionProperties",
];

impl OverrideTable {
    /// An empty table: every command is synthesized.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table shipped with the generator.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (name, body) in builtin::BODIES {
            table.set_body(*name, *body);
        }
        for name in builtin::DECLARE_ONLY {
            table.declare_only(*name);
        }
        table
    }

    pub fn lookup(&self, command: &str) -> Option<&OverrideEntry> {
        self.entries.get(command)
    }

    pub fn set_body(&mut self, command: impl Into<String>, body: impl Into<Cow<'static, str>>) {
        self.entries
            .insert(command.into(), OverrideEntry::Body(body.into()));
    }

    pub fn declare_only(&mut self, command: impl Into<String>) {
        self.entries.insert(command.into(), OverrideEntry::DeclareOnly);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Whether an override body depends on the extension tables.
pub fn reads_extension_tables(command: &str) -> bool {
    EXTENSION_TABLE_READERS.contains(&command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_hand_written_queries() {
        let table = OverrideTable::builtin();
        for name in [
            "vkCreateInstance",
            "vkGetInstanceProcAddr",
            "vkGetPhysicalDeviceProperties",
            "vkMapMemory",
            "vkUnmapMemory",
            "vkGetImageSubresourceLayout",
            "vkEnumerateInstanceExtensionProperties",
            "vkEnumerateDeviceExtensionProperties",
        ] {
            assert!(
                matches!(table.lookup(name), Some(OverrideEntry::Body(_))),
                "missing body for {name}"
            );
        }
    }

    #[test]
    fn lookup_is_exact() {
        let table = OverrideTable::builtin();
        assert!(table.lookup("vkcreateinstance").is_none());
        assert!(table.lookup("CreateInstance").is_none());
    }

    #[test]
    fn bodies_are_indented_and_terminated() {
        let table = OverrideTable::builtin();
        for name in table.names() {
            if let Some(OverrideEntry::Body(body)) = table.lookup(name) {
                assert!(body.ends_with('\n'), "{name} body must end with a newline");
                assert!(body.starts_with("    "), "{name} body must be indented");
            }
        }
    }

    #[test]
    fn later_entries_replace_earlier() {
        let mut table = OverrideTable::builtin();
        table.declare_only("vkCreateInstance");
        assert_eq!(
            table.lookup("vkCreateInstance"),
            Some(&OverrideEntry::DeclareOnly)
        );
    }

    #[test]
    fn enumeration_overrides_read_tables() {
        let table = OverrideTable::builtin();
        for name in EXTENSION_TABLE_READERS {
            assert!(reads_extension_tables(name));
            match table.lookup(name) {
                Some(OverrideEntry::Body(body)) => assert!(body.contains("_extension_map")),
                other => panic!("unexpected entry for {name}: {other:?}"),
            }
        }
        assert!(!reads_extension_tables("vkCreateInstance"));
    }
}
